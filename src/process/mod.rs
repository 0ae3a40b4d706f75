//! Subprocess execution
//!
//! One runner for everything buildsmith spawns: the build tool and the
//! validation tool. Callers hand it a [`crate::xcode::BuildInvocation`]
//! and get back a complete, post-mortem view of what the process did.

pub mod runner;

pub use runner::{ProcessOutcome, ProcessRunner, RunnerError, SystemProcessRunner};
