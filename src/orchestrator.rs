//! Operation sequencing.
//!
//! The orchestrator wires the other modules into whole operations:
//! detect the project, build the command, run it, aggregate the result.
//! Each public method is one operation with no state carried between
//! calls. Terminal conditions (bad path, nothing to build, missing
//! validator) surface as typed errors before anything is spawned;
//! failures of the spawned tool itself are reported inside the result,
//! not as errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BuildsmithConfig;
use crate::process::{ProcessOutcome, ProcessRunner, RunnerError, SystemProcessRunner};
use crate::project::{detect, ProjectDescriptor};
use crate::tools::ToolResolver;
use crate::validation::{ReportError, ValidationReport, ValidationRequest};
use crate::xcode::{
    BuildInvocation, BuildOperation, BuildOptions, BuildVerb, CommandBuilder, CommandError,
    BUILD_TOOL,
};

/// Budget for the `xcodebuild -version` availability probe.
const PROBE_TIMEOUT_SECS: u64 = 30;

/// Longest stderr excerpt carried into a failure message.
const STDERR_PREVIEW_BYTES: usize = 512;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("specified path does not exist: {0}")]
    InvalidPath(PathBuf),

    #[error("no Xcode workspace, project, or package manifest found at {0}")]
    ProjectNotFound(PathBuf),

    #[error("validation tool '{name}' not found on PATH or in any known install location")]
    ToolNotFound { name: String },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}

/// Which project a build operation should target.
///
/// Explicit overrides win over detection: a workspace path beats a
/// project path beats scanning `search_root` (the current directory
/// when unset).
#[derive(Debug, Clone, Default)]
pub struct TargetSelection {
    pub workspace: Option<PathBuf>,
    pub project: Option<PathBuf>,
    pub search_root: Option<PathBuf>,
}

/// Result of one build-style operation.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub descriptor: ProjectDescriptor,
    pub invocation: BuildInvocation,
    pub outcome: ProcessOutcome,
    /// Present exactly when the run failed; derived from the timeout
    /// state or the leading stderr bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl BuildReport {
    pub fn new(
        descriptor: ProjectDescriptor,
        invocation: BuildInvocation,
        outcome: ProcessOutcome,
    ) -> Self {
        let failure = failure_message(&invocation, &outcome);
        BuildReport {
            descriptor,
            invocation,
            outcome,
            failure,
        }
    }
}

fn failure_message(invocation: &BuildInvocation, outcome: &ProcessOutcome) -> Option<String> {
    if outcome.succeeded {
        return None;
    }
    if outcome.timed_out {
        return Some(format!("timed out after {}s", invocation.timeout_secs));
    }
    let preview_len = outcome.stderr.len().min(STDERR_PREVIEW_BYTES);
    let preview = String::from_utf8_lossy(&outcome.stderr[..preview_len]);
    let preview = preview.trim();
    if preview.is_empty() {
        Some(format!("exited with code {}", outcome.exit_code))
    } else {
        Some(format!(
            "exited with code {}: {}",
            outcome.exit_code, preview
        ))
    }
}

/// Result of one validation run.
///
/// `degraded` is true whenever readers are looking at less than a
/// clean, fully parsed report: the tool exited non-zero, or its stdout
/// did not parse. The raw stdout is always carried so nothing the tool
/// said is lost.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub tool_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    pub degraded: bool,
    pub raw_stdout: String,
    pub diagnostics: String,
    pub tool_succeeded: bool,
    pub duration_millis: u64,
    pub completed_at: DateTime<Utc>,
}

/// Availability of one external tool, as observed by a probe.
#[derive(Debug, Clone, Serialize)]
pub struct ToolProbe {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Environment health snapshot for a project directory.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub descriptor: ProjectDescriptor,
    pub build_tool: ToolProbe,
    pub validator: ToolProbe,
}

pub struct Orchestrator {
    config: BuildsmithConfig,
    resolver: ToolResolver,
    runner: Arc<dyn ProcessRunner>,
}

impl Orchestrator {
    /// Orchestrator over the live environment: real `PATH`, real child
    /// processes.
    pub fn new(config: BuildsmithConfig) -> Self {
        Self::with_parts(config, ToolResolver::from_env(), Arc::new(SystemProcessRunner))
    }

    /// Fully injected constructor, used by tests to script subprocess
    /// outcomes and control the resolution environment.
    pub fn with_parts(
        config: BuildsmithConfig,
        resolver: ToolResolver,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Orchestrator {
            config,
            resolver,
            runner,
        }
    }

    /// Clean-then-build in a single tool invocation.
    pub async fn rebuild(
        &self,
        selection: &TargetSelection,
        options: BuildOptions,
    ) -> Result<BuildReport, OrchestratorError> {
        let options = BuildOptions {
            operation: BuildOperation::Rebuild,
            ..options
        };
        self.execute_build(selection, options).await
    }

    /// Clean only.
    pub async fn clean(
        &self,
        selection: &TargetSelection,
        options: BuildOptions,
    ) -> Result<BuildReport, OrchestratorError> {
        let options = BuildOptions {
            operation: BuildOperation::Single(BuildVerb::Clean),
            ..options
        };
        self.execute_build(selection, options).await
    }

    /// Runs a single verb (build, test, or archive) and reports how it
    /// went.
    pub async fn monitor(
        &self,
        selection: &TargetSelection,
        verb: BuildVerb,
        options: BuildOptions,
    ) -> Result<BuildReport, OrchestratorError> {
        let options = BuildOptions {
            operation: BuildOperation::Single(verb),
            ..options
        };
        self.execute_build(selection, options).await
    }

    async fn execute_build(
        &self,
        selection: &TargetSelection,
        options: BuildOptions,
    ) -> Result<BuildReport, OrchestratorError> {
        let started = Instant::now();
        let descriptor = self.resolve_target(selection)?;
        info!(
            project = %descriptor.kind,
            root = %descriptor.root_path.display(),
            operation = %options.operation,
            "starting build operation"
        );

        let invocation = CommandBuilder::invocation(&descriptor, &options)?;
        debug!(command = %invocation.command_line(), "build command assembled");

        let outcome = self.runner.run(&invocation).await?;
        let report = BuildReport::new(descriptor, invocation, outcome);

        if let Some(failure) = &report.failure {
            warn!(
                failure = %failure,
                duration_millis = started.elapsed().as_millis() as u64,
                "build operation failed"
            );
        } else {
            info!(
                duration_millis = started.elapsed().as_millis() as u64,
                "build operation succeeded"
            );
        }
        Ok(report)
    }

    /// Runs the validation tool against `project_path` and aggregates
    /// whatever comes back.
    ///
    /// The tool is resolved strictly before anything is spawned: a
    /// missing validator is a [`OrchestratorError::ToolNotFound`], not
    /// a cryptic spawn failure. After the run, stdout is parsed as a
    /// report regardless of exit code, so a failing run that still
    /// printed a usable report yields that report with `degraded` set.
    pub async fn validate(
        &self,
        project_path: &Path,
        request: &ValidationRequest,
    ) -> Result<ValidationOutcome, OrchestratorError> {
        let tool_path = self
            .resolver
            .resolve_existing(&self.config.validator_bin)
            .map_err(|_| OrchestratorError::ToolNotFound {
                name: self.config.validator_bin.clone(),
            })?;

        info!(
            tool = %tool_path.display(),
            project = %project_path.display(),
            level = %request.level,
            "starting validation"
        );

        let invocation = BuildInvocation::new(
            tool_path.display().to_string(),
            request.arguments(project_path),
            current_dir_or_dot(),
            request.timeout_secs,
        );
        let outcome = self.runner.run(&invocation).await?;

        let (report, degraded) = match ValidationReport::from_json(&outcome.stdout) {
            Ok(report) => {
                if !outcome.succeeded {
                    debug!(
                        exit_code = outcome.exit_code,
                        "validator exited non-zero but produced a parseable report"
                    );
                }
                (Some(report), !outcome.succeeded)
            }
            Err(ReportError::Malformed { reason }) => {
                debug!(reason = %reason, "validator output not parseable, keeping raw text");
                (None, true)
            }
        };

        Ok(ValidationOutcome {
            tool_path,
            report,
            degraded,
            raw_stdout: outcome.stdout_text().into_owned(),
            diagnostics: outcome.stderr_text().into_owned(),
            tool_succeeded: outcome.succeeded,
            duration_millis: outcome.duration_millis,
            completed_at: Utc::now(),
        })
    }

    /// Probes the environment around `path`: what kind of project is
    /// there, whether the build tool answers `-version`, and whether
    /// the validation tool is installed. Probe failures are findings,
    /// never errors.
    pub async fn diagnose(&self, path: &Path) -> DiagnosisReport {
        let descriptor = detect(path);

        let probe_invocation = BuildInvocation::new(
            BUILD_TOOL,
            vec!["-version".to_string()],
            current_dir_or_dot(),
            PROBE_TIMEOUT_SECS,
        );
        let build_tool = match self.runner.run(&probe_invocation).await {
            Ok(outcome) if outcome.succeeded => ToolProbe {
                name: BUILD_TOOL.to_string(),
                available: true,
                detail: outcome
                    .stdout_text()
                    .lines()
                    .next()
                    .map(|line| line.trim().to_string()),
            },
            Ok(outcome) => {
                debug!(exit_code = outcome.exit_code, "build tool probe failed");
                ToolProbe {
                    name: BUILD_TOOL.to_string(),
                    available: false,
                    detail: None,
                }
            }
            Err(error) => {
                debug!(error = %error, "build tool probe could not run");
                ToolProbe {
                    name: BUILD_TOOL.to_string(),
                    available: false,
                    detail: None,
                }
            }
        };

        let validator = match self.resolver.resolve_existing(&self.config.validator_bin) {
            Ok(path) => ToolProbe {
                name: self.config.validator_bin.clone(),
                available: true,
                detail: Some(path.display().to_string()),
            },
            Err(_) => ToolProbe {
                name: self.config.validator_bin.clone(),
                available: false,
                detail: None,
            },
        };

        DiagnosisReport {
            descriptor,
            build_tool,
            validator,
        }
    }

    fn resolve_target(
        &self,
        selection: &TargetSelection,
    ) -> Result<ProjectDescriptor, OrchestratorError> {
        if let Some(workspace) = &selection.workspace {
            if !workspace.exists() {
                return Err(OrchestratorError::InvalidPath(workspace.clone()));
            }
            return Ok(ProjectDescriptor::from_container(workspace));
        }
        if let Some(project) = &selection.project {
            if !project.exists() {
                return Err(OrchestratorError::InvalidPath(project.clone()));
            }
            return Ok(ProjectDescriptor::from_container(project));
        }
        let root = selection
            .search_root
            .clone()
            .unwrap_or_else(current_dir_or_dot);
        let descriptor = detect(&root);
        if descriptor.kind.is_unknown() {
            return Err(OrchestratorError::ProjectNotFound(root));
        }
        Ok(descriptor)
    }
}

fn current_dir_or_dot() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
