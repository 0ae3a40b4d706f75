//! Deterministic `xcodebuild` command construction.
//!
//! Argument order is fixed regardless of how options were supplied:
//! container selection, then scheme, then the action verbs, then
//! performance flags. Two calls with equal inputs always produce equal
//! argument vectors, which keeps build commands diffable across runs
//! and makes the tests here simple equality checks.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::ProjectDescriptor;

/// Name of the build tool; resolved through `PATH` at spawn time.
pub const BUILD_TOOL: &str = "xcodebuild";

pub const DEFAULT_CONFIGURATION: &str = "Debug";
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

const SCHEME_FLAG: &str = "-scheme";
const PARALLEL_FLAG: &str = "-parallelizeTargets";
const INDEX_STORE_SETTING: &str = "COMPILER_INDEX_STORE_ENABLE=NO";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no Xcode workspace, project, or package manifest at {path}")]
    MissingProject { path: PathBuf },
}

/// A single `xcodebuild` action verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVerb {
    Clean,
    Build,
    Test,
    Archive,
}

impl BuildVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildVerb::Clean => "clean",
            BuildVerb::Build => "build",
            BuildVerb::Test => "test",
            BuildVerb::Archive => "archive",
        }
    }
}

impl fmt::Display for BuildVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the build run should do. `Rebuild` is not a verb of its own:
/// it always expands to `clean build` in one tool invocation, so the
/// build can never run against a stale product of a failed clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOperation {
    Single(BuildVerb),
    Rebuild,
}

impl BuildOperation {
    /// Verbs in the order they are handed to the build tool.
    pub fn verbs(&self) -> Vec<BuildVerb> {
        match self {
            BuildOperation::Single(verb) => vec![*verb],
            BuildOperation::Rebuild => vec![BuildVerb::Clean, BuildVerb::Build],
        }
    }
}

impl fmt::Display for BuildOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOperation::Single(verb) => write!(f, "{verb}"),
            BuildOperation::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// Caller-facing knobs for one build run.
///
/// `configuration` is carried for reporting; the generated argument
/// vector never includes it, so scheme-level configuration selection
/// stays in charge.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub scheme: Option<String>,
    pub configuration: String,
    pub operation: BuildOperation,
    pub parallel: bool,
    pub aggressive: bool,
    pub timeout_secs: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            scheme: None,
            configuration: DEFAULT_CONFIGURATION.to_string(),
            operation: BuildOperation::Single(BuildVerb::Build),
            parallel: false,
            aggressive: false,
            timeout_secs: DEFAULT_BUILD_TIMEOUT_SECS,
        }
    }
}

/// A fully specified subprocess invocation, ready for the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInvocation {
    pub executable: String,
    pub arguments: Vec<String>,
    pub working_directory: PathBuf,
    pub timeout_secs: u64,
}

impl BuildInvocation {
    pub fn new(
        executable: impl Into<String>,
        arguments: Vec<String>,
        working_directory: PathBuf,
        timeout_secs: u64,
    ) -> Self {
        BuildInvocation {
            executable: executable.into(),
            arguments,
            working_directory,
            timeout_secs,
        }
    }

    /// Shell-style rendering for logs and human output. Arguments are
    /// joined verbatim, without quoting.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.arguments.len() + 1);
        parts.push(self.executable.as_str());
        parts.extend(self.arguments.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl fmt::Display for BuildInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Builds `xcodebuild` invocations from descriptors and options.
pub struct CommandBuilder;

impl CommandBuilder {
    /// Assembles the invocation for one build run.
    ///
    /// Workspaces and projects get their container flag and path first;
    /// packages get neither and build from the working directory. An
    /// `Unknown` descriptor cannot be built and is rejected here rather
    /// than surfacing as a confusing tool error later.
    pub fn invocation(
        descriptor: &ProjectDescriptor,
        options: &BuildOptions,
    ) -> Result<BuildInvocation, CommandError> {
        if descriptor.kind.is_unknown() {
            return Err(CommandError::MissingProject {
                path: descriptor.root_path.clone(),
            });
        }

        let mut arguments = Vec::new();
        if let (Some(flag), Some(container)) =
            (descriptor.kind.container_flag(), descriptor.container_path())
        {
            arguments.push(flag.to_string());
            arguments.push(container.display().to_string());
        }
        if let Some(scheme) = &options.scheme {
            arguments.push(SCHEME_FLAG.to_string());
            arguments.push(scheme.clone());
        }
        for verb in options.operation.verbs() {
            arguments.push(verb.as_str().to_string());
        }
        if options.parallel {
            arguments.push(PARALLEL_FLAG.to_string());
        }
        if options.aggressive {
            arguments.push(INDEX_STORE_SETTING.to_string());
        }

        Ok(BuildInvocation::new(
            BUILD_TOOL,
            arguments,
            descriptor.root_path.clone(),
            options.timeout_secs,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectKind;
    use std::path::Path;

    fn workspace_descriptor() -> ProjectDescriptor {
        ProjectDescriptor {
            kind: ProjectKind::XcodeWorkspace("App".to_string()),
            root_path: PathBuf::from("/repo"),
        }
    }

    fn package_descriptor() -> ProjectDescriptor {
        ProjectDescriptor {
            kind: ProjectKind::Package,
            root_path: PathBuf::from("/repo"),
        }
    }

    #[test]
    fn test_workspace_rebuild_with_all_flags() {
        let options = BuildOptions {
            scheme: Some("App".to_string()),
            operation: BuildOperation::Rebuild,
            parallel: true,
            aggressive: true,
            ..BuildOptions::default()
        };
        let invocation = CommandBuilder::invocation(&workspace_descriptor(), &options).unwrap();
        assert_eq!(invocation.executable, "xcodebuild");
        assert_eq!(
            invocation.arguments,
            vec![
                "-workspace",
                "/repo/App.xcworkspace",
                "-scheme",
                "App",
                "clean",
                "build",
                "-parallelizeTargets",
                "COMPILER_INDEX_STORE_ENABLE=NO",
            ]
        );
        assert_eq!(invocation.working_directory, Path::new("/repo"));
    }

    #[test]
    fn test_project_build_minimal() {
        let descriptor = ProjectDescriptor {
            kind: ProjectKind::XcodeProject("Tool".to_string()),
            root_path: PathBuf::from("/repo"),
        };
        let invocation =
            CommandBuilder::invocation(&descriptor, &BuildOptions::default()).unwrap();
        assert_eq!(
            invocation.arguments,
            vec!["-project", "/repo/Tool.xcodeproj", "build"]
        );
    }

    #[test]
    fn test_package_build_has_no_container_flag() {
        let options = BuildOptions {
            operation: BuildOperation::Single(BuildVerb::Test),
            ..BuildOptions::default()
        };
        let invocation = CommandBuilder::invocation(&package_descriptor(), &options).unwrap();
        assert_eq!(invocation.arguments, vec!["test"]);
        assert_eq!(invocation.working_directory, Path::new("/repo"));
    }

    #[test]
    fn test_rebuild_is_clean_then_build() {
        assert_eq!(
            BuildOperation::Rebuild.verbs(),
            vec![BuildVerb::Clean, BuildVerb::Build]
        );
    }

    #[test]
    fn test_configuration_never_reaches_arguments() {
        let options = BuildOptions {
            configuration: "Release".to_string(),
            ..BuildOptions::default()
        };
        let invocation = CommandBuilder::invocation(&workspace_descriptor(), &options).unwrap();
        assert!(!invocation
            .arguments
            .iter()
            .any(|argument| argument.contains("Release")));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let descriptor = ProjectDescriptor {
            kind: ProjectKind::Unknown,
            root_path: PathBuf::from("/repo"),
        };
        let error = CommandBuilder::invocation(&descriptor, &BuildOptions::default()).unwrap_err();
        assert!(matches!(error, CommandError::MissingProject { .. }));
        assert!(error.to_string().contains("/repo"));
    }

    #[test]
    fn test_equal_inputs_produce_equal_invocations() {
        let options = BuildOptions {
            scheme: Some("App".to_string()),
            parallel: true,
            ..BuildOptions::default()
        };
        let first = CommandBuilder::invocation(&workspace_descriptor(), &options).unwrap();
        let second = CommandBuilder::invocation(&workspace_descriptor(), &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_command_line_rendering() {
        let invocation = BuildInvocation::new(
            "xcodebuild",
            vec!["-scheme".to_string(), "App".to_string(), "build".to_string()],
            PathBuf::from("/repo"),
            300,
        );
        assert_eq!(invocation.command_line(), "xcodebuild -scheme App build");
        assert_eq!(invocation.to_string(), "xcodebuild -scheme App build");
    }
}
