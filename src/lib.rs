//! buildsmith - build orchestration and validation reporting for Xcode projects
//!
//! This library drives `xcodebuild` and an architectural validation tool
//! against a project directory, turning raw subprocess output into typed
//! reports suitable for both humans and machines.
//!
//! # Core Concepts
//!
//! - **Detection**: A single-level scan of a directory that classifies it
//!   as an Xcode workspace, Xcode project, Swift package, or unknown
//! - **Invocation**: A fully assembled command line (executable, argument
//!   vector, working directory, timeout) built deterministically from a
//!   classified project and a set of build options
//! - **Aggregation**: Parsing the validation tool's JSON stdout into a
//!   typed report, falling back to raw text when the output is not usable
//!
//! # Example Usage
//!
//! ```ignore
//! use buildsmith::config::BuildsmithConfig;
//! use buildsmith::orchestrator::{Orchestrator, TargetSelection};
//! use buildsmith::xcode::BuildOptions;
//!
//! async fn rebuild_current_dir() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::new(BuildsmithConfig::default());
//!     let report = orchestrator
//!         .rebuild(&TargetSelection::default(), BuildOptions::default())
//!         .await?;
//!
//!     println!("succeeded: {}", report.outcome.succeeded);
//!     Ok(())
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`project`]: Directory classification
//! - [`xcode`]: Build command construction
//! - [`process`]: Subprocess execution with timeouts and output capture
//! - [`validation`]: Validation tool requests and report aggregation
//! - [`tools`]: Executable discovery on and off `PATH`
//! - [`orchestrator`]: Ties the above together into complete operations

// Public modules
pub mod cli;
pub mod config;
pub mod orchestrator;
pub mod process;
pub mod project;
pub mod tools;
pub mod util;
pub mod validation;
pub mod xcode;

// Re-export key types for convenient access
pub use config::{BuildsmithConfig, ConfigError};
pub use orchestrator::{
    BuildReport, DiagnosisReport, Orchestrator, OrchestratorError, TargetSelection,
    ValidationOutcome,
};
pub use process::{ProcessOutcome, ProcessRunner, RunnerError, SystemProcessRunner};
pub use project::{detect, ProjectDescriptor, ProjectKind};
pub use tools::{ResolveError, ToolResolver};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use validation::{ReportFormat, ValidationLevel, ValidationReport, ValidationRequest};
pub use xcode::{BuildInvocation, BuildOperation, BuildOptions, BuildVerb, CommandBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
