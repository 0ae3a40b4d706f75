use buildsmith::cli::commands::{CliArgs, Commands};
use buildsmith::cli::handlers::{
    handle_clean, handle_detect, handle_diagnose, handle_monitor, handle_rebuild, handle_validate,
};
use buildsmith::util::logging::{init_logging, parse_level, LoggingConfig};
use buildsmith::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("buildsmith v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args).await,
        Commands::Rebuild(rebuild_args) => handle_rebuild(rebuild_args).await,
        Commands::Clean(clean_args) => handle_clean(clean_args).await,
        Commands::Monitor(monitor_args) => handle_monitor(monitor_args).await,
        Commands::Diagnose(diagnose_args) => handle_diagnose(diagnose_args).await,
        Commands::Validate(validate_args) => handle_validate(validate_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("BUILDSMITH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let use_json = env::var("BUILDSMITH_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        ..LoggingConfig::default()
    });
}
