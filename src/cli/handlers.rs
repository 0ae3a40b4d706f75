//! Subcommand handlers.
//!
//! Each handler turns parsed arguments into one orchestrator operation
//! and renders the result. Exit codes are three-valued: 0 when the
//! operation ran and succeeded, 1 when it ran but the result is a
//! failure (build failed or timed out, validation tool reported
//! problems), 2 when the operation could not run at all.

use std::path::PathBuf;

use tracing::{debug, error, info};

use crate::cli::commands::{
    CleanArgs, DetectArgs, DiagnoseArgs, MonitorArgs, OutputFormatArg, RebuildArgs,
    ReportFormatArg, ValidateArgs,
};
use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::config::BuildsmithConfig;
use crate::orchestrator::{BuildReport, Orchestrator, TargetSelection};
use crate::project::detect;
use crate::validation::ValidationRequest;
use crate::xcode::BuildOptions;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_OPERATION_FAILED: i32 = 1;
pub const EXIT_TERMINAL: i32 = 2;

pub async fn handle_detect(args: &DetectArgs) -> i32 {
    let path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    debug!(path = %path.display(), "detecting project kind");

    let descriptor = detect(&path);
    info!(kind = %descriptor.kind, "detection complete");

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_descriptor(&descriptor) {
        Ok(output) => {
            println!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            EXIT_TERMINAL
        }
    }
}

pub async fn handle_rebuild(args: &RebuildArgs) -> i32 {
    let config = match effective_config() {
        Some(config) => config,
        None => return EXIT_TERMINAL,
    };

    let selection = TargetSelection {
        workspace: args.workspace.clone(),
        project: args.project.clone(),
        search_root: None,
    };
    let options = BuildOptions {
        scheme: args.scheme.clone(),
        configuration: args.configuration.clone(),
        parallel: args.parallel,
        aggressive: args.aggressive,
        timeout_secs: args.timeout.unwrap_or(config.build_timeout_secs),
        ..BuildOptions::default()
    };

    let orchestrator = Orchestrator::new(config);
    let report = match orchestrator.rebuild(&selection, options).await {
        Ok(report) => report,
        Err(e) => {
            error!("Rebuild could not run: {}", e);
            return EXIT_TERMINAL;
        }
    };

    render_build_report(&report, args.format)
}

pub async fn handle_clean(args: &CleanArgs) -> i32 {
    let config = match effective_config() {
        Some(config) => config,
        None => return EXIT_TERMINAL,
    };

    let selection = TargetSelection {
        workspace: args.workspace.clone(),
        project: args.project.clone(),
        search_root: None,
    };
    let options = BuildOptions {
        scheme: args.scheme.clone(),
        timeout_secs: args.timeout.unwrap_or(config.build_timeout_secs),
        ..BuildOptions::default()
    };

    let orchestrator = Orchestrator::new(config);
    let report = match orchestrator.clean(&selection, options).await {
        Ok(report) => report,
        Err(e) => {
            error!("Clean could not run: {}", e);
            return EXIT_TERMINAL;
        }
    };

    render_build_report(&report, args.format)
}

pub async fn handle_monitor(args: &MonitorArgs) -> i32 {
    let config = match effective_config() {
        Some(config) => config,
        None => return EXIT_TERMINAL,
    };

    let selection = TargetSelection {
        workspace: args.workspace.clone(),
        project: args.project.clone(),
        search_root: None,
    };
    let options = BuildOptions {
        scheme: args.scheme.clone(),
        timeout_secs: args.timeout.unwrap_or(config.monitor_timeout_secs),
        ..BuildOptions::default()
    };

    let orchestrator = Orchestrator::new(config);
    let report = match orchestrator
        .monitor(&selection, args.action.into(), options)
        .await
    {
        Ok(report) => report,
        Err(e) => {
            error!("Monitored build could not run: {}", e);
            return EXIT_TERMINAL;
        }
    };

    render_build_report(&report, args.format)
}

pub async fn handle_diagnose(args: &DiagnoseArgs) -> i32 {
    let config = match effective_config() {
        Some(config) => config,
        None => return EXIT_TERMINAL,
    };

    let path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let orchestrator = Orchestrator::new(config);
    let report = orchestrator.diagnose(&path).await;

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_diagnosis(&report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format output: {}", e);
            return EXIT_TERMINAL;
        }
    }

    if report.build_tool.available && report.validator.available {
        EXIT_SUCCESS
    } else {
        EXIT_OPERATION_FAILED
    }
}

pub async fn handle_validate(args: &ValidateArgs) -> i32 {
    let config = match effective_config() {
        Some(config) => config,
        None => return EXIT_TERMINAL,
    };

    let path = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    let request = ValidationRequest {
        level: args.level.into(),
        format: args.report_format.into(),
        deep: args.deep,
        config_path: args.config.clone(),
        timeout_secs: args.timeout.unwrap_or(config.validator_timeout_secs),
    };

    let orchestrator = Orchestrator::new(config);
    let outcome = match orchestrator.validate(&path, &request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Validation could not run: {}", e);
            return EXIT_TERMINAL;
        }
    };

    if args.report_format == ReportFormatArg::Json {
        // The tool was asked for JSON; pass its output through verbatim
        // so downstream consumers see exactly what it produced.
        print!("{}", outcome.raw_stdout);
        if !outcome.raw_stdout.ends_with('\n') {
            println!();
        }
    } else {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        match formatter.format_validation(&outcome) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                error!("Failed to format output: {}", e);
                return EXIT_TERMINAL;
            }
        }
    }

    if outcome.tool_succeeded {
        EXIT_SUCCESS
    } else {
        EXIT_OPERATION_FAILED
    }
}

fn effective_config() -> Option<BuildsmithConfig> {
    let config = BuildsmithConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your BUILDSMITH_* environment variables.");
        return None;
    }
    Some(config)
}

fn render_build_report(report: &BuildReport, format: OutputFormatArg) -> i32 {
    let formatter = OutputFormatter::new(format.into());
    match formatter.format_build_report(report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format output: {}", e);
            return EXIT_TERMINAL;
        }
    }

    if report.outcome.succeeded {
        EXIT_SUCCESS
    } else {
        EXIT_OPERATION_FAILED
    }
}
