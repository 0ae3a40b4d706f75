//! Build-tool invocation construction
//!
//! Translates a classified project plus a set of build options into the
//! exact `xcodebuild` argument vector, deterministically.

pub mod command;

pub use command::{
    BuildInvocation, BuildOperation, BuildOptions, BuildVerb, CommandBuilder, CommandError,
    BUILD_TOOL,
};
