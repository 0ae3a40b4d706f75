//! Executable discovery
//!
//! Locates helper binaries such as the validation tool without requiring
//! the caller to configure absolute paths.

pub mod resolver;

pub use resolver::{ResolveError, ToolResolver};
