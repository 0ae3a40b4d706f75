//! Utility modules for buildsmith
//!
//! Currently just structured logging setup. Anything generic enough to
//! be shared across modules without belonging to one of them ends up
//! here.

pub mod logging;

// Re-export commonly used items
pub use logging::{init_default, init_from_env, init_logging, LoggingConfig};
