use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::validation::{ReportFormat, ValidationLevel};
use crate::xcode::BuildVerb;

/// Build orchestration and validation-report aggregation for Xcode and Swift package projects
#[derive(Parser, Debug)]
#[command(
    name = "buildsmith",
    about = "Build orchestration and validation-report aggregation for Xcode and Swift package projects",
    version,
    author,
    long_about = "buildsmith detects what kind of project lives in a directory, drives \
                  xcodebuild with deterministic, reproducible argument vectors, and runs \
                  the architectural validation tool, turning its JSON reports into \
                  readable summaries."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Verbose output (debug logging)")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Identify the project kind in a directory",
        long_about = "Scans the immediate children of a directory for an Xcode workspace, \
                      an Xcode project, or a Package.swift manifest, in that precedence \
                      order.\n\n\
                      Examples:\n  \
                      buildsmith detect\n  \
                      buildsmith detect /path/to/repo\n  \
                      buildsmith detect --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Clean and build the project",
        long_about = "Runs a full rebuild: clean followed by build in a single xcodebuild \
                      invocation.\n\n\
                      Examples:\n  \
                      buildsmith rebuild\n  \
                      buildsmith rebuild --scheme App --parallel\n  \
                      buildsmith rebuild --workspace App.xcworkspace --timeout 900"
    )]
    Rebuild(RebuildArgs),

    #[command(
        about = "Clean build artifacts",
        long_about = "Runs xcodebuild clean against the detected or specified project.\n\n\
                      Examples:\n  \
                      buildsmith clean\n  \
                      buildsmith clean --project Tool.xcodeproj"
    )]
    Clean(CleanArgs),

    #[command(
        about = "Run a build action and report how it went",
        long_about = "Runs a single xcodebuild action (build, test, or archive) with full \
                      output capture and a generous timeout, then reports the outcome.\n\n\
                      Examples:\n  \
                      buildsmith monitor\n  \
                      buildsmith monitor test --scheme App\n  \
                      buildsmith monitor archive --format json"
    )]
    Monitor(MonitorArgs),

    #[command(
        about = "Check the build environment",
        long_about = "Reports the detected project kind and whether the build tool and the \
                      validation tool are available.\n\n\
                      Examples:\n  \
                      buildsmith diagnose\n  \
                      buildsmith diagnose /path/to/repo --format yaml"
    )]
    Diagnose(DiagnoseArgs),

    #[command(
        about = "Run the architecture validation tool",
        long_about = "Invokes the validation tool against a project and aggregates its \
                      report: severity histogram, actionable insights, and prioritized \
                      recommendations.\n\n\
                      Examples:\n  \
                      buildsmith validate\n  \
                      buildsmith validate /path/to/repo --level comprehensive --deep\n  \
                      buildsmith validate --report-format json"
    )]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Directory to inspect (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct RebuildArgs {
    #[arg(
        short = 'w',
        long,
        value_name = "PATH",
        conflicts_with = "project",
        help = "Workspace to build (overrides detection)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_name = "PATH",
        help = "Project to build (overrides detection)"
    )]
    pub project: Option<PathBuf>,

    #[arg(short = 's', long, value_name = "NAME", help = "Scheme to build")]
    pub scheme: Option<String>,

    #[arg(
        short = 'c',
        long,
        value_name = "NAME",
        default_value = "Debug",
        help = "Build configuration (reported, not passed to the build tool)"
    )]
    pub configuration: String,

    #[arg(long, help = "Parallelize target builds")]
    pub parallel: bool,

    #[arg(long, help = "Disable the compiler index store for faster builds")]
    pub aggressive: bool,

    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help = "Time budget for the build (defaults to BUILDSMITH_BUILD_TIMEOUT or 300)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct CleanArgs {
    #[arg(
        short = 'w',
        long,
        value_name = "PATH",
        conflicts_with = "project",
        help = "Workspace to clean (overrides detection)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_name = "PATH",
        help = "Project to clean (overrides detection)"
    )]
    pub project: Option<PathBuf>,

    #[arg(short = 's', long, value_name = "NAME", help = "Scheme to clean")]
    pub scheme: Option<String>,

    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help = "Time budget for the clean (defaults to BUILDSMITH_BUILD_TIMEOUT or 300)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct MonitorArgs {
    #[arg(
        value_enum,
        default_value = "build",
        help = "Build action to run and watch"
    )]
    pub action: BuildVerbArg,

    #[arg(
        short = 'w',
        long,
        value_name = "PATH",
        conflicts_with = "project",
        help = "Workspace to build (overrides detection)"
    )]
    pub workspace: Option<PathBuf>,

    #[arg(
        short = 'p',
        long,
        value_name = "PATH",
        help = "Project to build (overrides detection)"
    )]
    pub project: Option<PathBuf>,

    #[arg(short = 's', long, value_name = "NAME", help = "Scheme to build")]
    pub scheme: Option<String>,

    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help = "Time budget for the run (defaults to BUILDSMITH_MONITOR_TIMEOUT or 600)"
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct DiagnoseArgs {
    #[arg(
        value_name = "PATH",
        help = "Directory to diagnose (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(
        value_name = "PATH",
        help = "Project to validate (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'l',
        long,
        value_enum,
        default_value = "critical",
        help = "Validation strictness level"
    )]
    pub level: ValidationLevelArg,

    #[arg(
        long = "report-format",
        value_enum,
        default_value = "summary",
        help = "Format requested from the validation tool"
    )]
    pub report_format: ReportFormatArg,

    #[arg(long, help = "Enable deep analysis")]
    pub deep: bool,

    #[arg(long, value_name = "PATH", help = "Validation tool configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 't',
        long,
        value_name = "SECONDS",
        help = "Time budget for the validation (defaults to BUILDSMITH_VALIDATOR_TIMEOUT or 120)"
    )]
    pub timeout: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildVerbArg {
    Build,
    Test,
    Archive,
}

impl From<BuildVerbArg> for BuildVerb {
    fn from(arg: BuildVerbArg) -> Self {
        match arg {
            BuildVerbArg::Build => BuildVerb::Build,
            BuildVerbArg::Test => BuildVerb::Test,
            BuildVerbArg::Archive => BuildVerb::Archive,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevelArg {
    Critical,
    Standard,
    Comprehensive,
}

impl From<ValidationLevelArg> for ValidationLevel {
    fn from(arg: ValidationLevelArg) -> Self {
        match arg {
            ValidationLevelArg::Critical => ValidationLevel::Critical,
            ValidationLevelArg::Standard => ValidationLevel::Standard,
            ValidationLevelArg::Comprehensive => ValidationLevel::Comprehensive,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormatArg {
    Json,
    Summary,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => ReportFormat::Json,
            ReportFormatArg::Summary => ReportFormat::Summary,
        }
    }
}
