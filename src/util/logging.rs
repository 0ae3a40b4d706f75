//! Structured logging setup for buildsmith
//!
//! Initialization and configuration of the `tracing` subscriber. All
//! log output goes to stderr: stdout belongs to command results, which
//! scripts pipe into other tools, and a stray log line there would
//! corrupt JSON and YAML payloads.
//!
//! # Example
//!
//! ```no_run
//! use buildsmith::util::logging;
//!
//! // Initialize from BUILDSMITH_LOG_LEVEL / RUST_LOG
//! logging::init_from_env();
//!
//! use tracing::{debug, info};
//!
//! info!("starting rebuild");
//! debug!(scheme = "App", "selected scheme");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format (for structured logging in CI)
    pub use_json: bool,

    /// Include the module target (e.g., buildsmith::process) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Creates a logging configuration with the specified level
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }
}

/// Parses a log level from a string, case-insensitively.
///
/// Unknown strings fall back to `Level::INFO` with a warning on stderr
/// rather than failing startup over a typo.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Initializes the logging system with the provided configuration.
///
/// Can only take effect once per process; later calls are ignored, so
/// whichever entry point runs first decides the configuration.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::from_default_env()
            .add_directive(format!("buildsmith={}", config.level).parse().unwrap());

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Initializes logging with default configuration: INFO level, pretty
/// console output on stderr, `RUST_LOG` respected.
pub fn init_default() {
    init_logging(LoggingConfig::default());
}

/// Initializes logging from environment variables.
///
/// Reads `BUILDSMITH_LOG_LEVEL` for the level and `BUILDSMITH_LOG_JSON`
/// for the output format; `RUST_LOG` still applies for per-module
/// filtering.
pub fn init_from_env() {
    let level_str = env::var("BUILDSMITH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let level = parse_level(&level_str);

    let use_json = env::var("BUILDSMITH_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    let config = LoggingConfig {
        level,
        use_json,
        ..Default::default()
    };

    init_logging(config);
}
