//! Configuration management for buildsmith
//!
//! Settings load from environment variables with working defaults, so a
//! bare `buildsmith` invocation needs no configuration at all. Command
//! line flags override whatever the environment provided.
//!
//! # Environment Variables
//!
//! - `BUILDSMITH_BUILD_TIMEOUT`: rebuild/clean budget in seconds - default: "300"
//! - `BUILDSMITH_MONITOR_TIMEOUT`: monitored build budget in seconds - default: "600"
//! - `BUILDSMITH_VALIDATOR_TIMEOUT`: validation budget in seconds - default: "120"
//! - `BUILDSMITH_VALIDATOR_BIN`: validation tool executable name - default: "archsift"
//! - `BUILDSMITH_LOG_LEVEL`: logging level - default: "info"

use std::env;
use std::fmt;

use thiserror::Error;

const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MONITOR_TIMEOUT_SECS: u64 = 600;
const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 120;
const DEFAULT_VALIDATOR_BIN: &str = "archsift";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Timeouts above this are almost certainly a unit mistake (seconds vs
/// milliseconds), so validation refuses them.
const MAX_TIMEOUT_SECS: u64 = 14_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime configuration for buildsmith.
///
/// `Default::default()` reads the `BUILDSMITH_*` environment variables
/// and falls back to the documented defaults for anything unset or
/// unparseable.
#[derive(Debug, Clone)]
pub struct BuildsmithConfig {
    /// Time budget for rebuild and clean runs, in seconds
    pub build_timeout_secs: u64,

    /// Time budget for monitored build/test/archive runs, in seconds
    pub monitor_timeout_secs: u64,

    /// Time budget for validation runs, in seconds
    pub validator_timeout_secs: u64,

    /// Executable name of the validation tool
    pub validator_bin: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for BuildsmithConfig {
    fn default() -> Self {
        let build_timeout_secs = env::var("BUILDSMITH_BUILD_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_BUILD_TIMEOUT_SECS);

        let monitor_timeout_secs = env::var("BUILDSMITH_MONITOR_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MONITOR_TIMEOUT_SECS);

        let validator_timeout_secs = env::var("BUILDSMITH_VALIDATOR_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_VALIDATOR_TIMEOUT_SECS);

        let validator_bin = env::var("BUILDSMITH_VALIDATOR_BIN")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VALIDATOR_BIN.to_string());

        let log_level = env::var("BUILDSMITH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            build_timeout_secs,
            monitor_timeout_secs,
            validator_timeout_secs,
            validator_bin,
            log_level,
        }
    }
}

impl BuildsmithConfig {
    /// Checks that timeouts are in range and the log level is one we
    /// know. The validator binary is resolved lazily, so its existence
    /// is deliberately not checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("Build timeout", self.build_timeout_secs),
            ("Monitor timeout", self.monitor_timeout_secs),
            ("Validator timeout", self.validator_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{name} must be at least 1 second"
                )));
            }
            if value > MAX_TIMEOUT_SECS {
                return Err(ConfigError::ValidationFailed(format!(
                    "{name} cannot exceed {MAX_TIMEOUT_SECS} seconds"
                )));
            }
        }

        if self.validator_bin.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Validator executable name cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Converts configuration to a display map for output formatting
    pub fn to_display_map(&self) -> std::collections::HashMap<String, String> {
        let mut map = std::collections::HashMap::new();

        map.insert(
            "build_timeout_secs".to_string(),
            self.build_timeout_secs.to_string(),
        );
        map.insert(
            "monitor_timeout_secs".to_string(),
            self.monitor_timeout_secs.to_string(),
        );
        map.insert(
            "validator_timeout_secs".to_string(),
            self.validator_timeout_secs.to_string(),
        );
        map.insert("validator_bin".to_string(), self.validator_bin.clone());
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for BuildsmithConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Buildsmith Configuration:")?;
        writeln!(f, "  Build Timeout: {}s", self.build_timeout_secs)?;
        writeln!(f, "  Monitor Timeout: {}s", self.monitor_timeout_secs)?;
        writeln!(f, "  Validator Timeout: {}s", self.validator_timeout_secs)?;
        writeln!(f, "  Validator: {}", self.validator_bin)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::unset("BUILDSMITH_BUILD_TIMEOUT"),
            EnvGuard::unset("BUILDSMITH_MONITOR_TIMEOUT"),
            EnvGuard::unset("BUILDSMITH_VALIDATOR_TIMEOUT"),
            EnvGuard::unset("BUILDSMITH_VALIDATOR_BIN"),
            EnvGuard::unset("BUILDSMITH_LOG_LEVEL"),
        ];

        let config = BuildsmithConfig::default();

        assert_eq!(config.build_timeout_secs, DEFAULT_BUILD_TIMEOUT_SECS);
        assert_eq!(config.monitor_timeout_secs, DEFAULT_MONITOR_TIMEOUT_SECS);
        assert_eq!(config.validator_timeout_secs, DEFAULT_VALIDATOR_TIMEOUT_SECS);
        assert_eq!(config.validator_bin, DEFAULT_VALIDATOR_BIN);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("BUILDSMITH_BUILD_TIMEOUT", "90"),
            EnvGuard::set("BUILDSMITH_MONITOR_TIMEOUT", "1200"),
            EnvGuard::set("BUILDSMITH_VALIDATOR_TIMEOUT", "45"),
            EnvGuard::set("BUILDSMITH_VALIDATOR_BIN", "archsift-nightly"),
            EnvGuard::set("BUILDSMITH_LOG_LEVEL", "DEBUG"),
        ];

        let config = BuildsmithConfig::default();

        assert_eq!(config.build_timeout_secs, 90);
        assert_eq!(config.monitor_timeout_secs, 1200);
        assert_eq!(config.validator_timeout_secs, 45);
        assert_eq!(config.validator_bin, "archsift-nightly");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    #[serial]
    fn test_unparseable_timeout_falls_back_to_default() {
        let _guards = vec![EnvGuard::set("BUILDSMITH_BUILD_TIMEOUT", "five minutes")];
        let config = BuildsmithConfig::default();
        assert_eq!(config.build_timeout_secs, DEFAULT_BUILD_TIMEOUT_SECS);
    }

    #[test]
    fn test_configuration_validation_valid() {
        let config = BuildsmithConfig {
            build_timeout_secs: 300,
            monitor_timeout_secs: 600,
            validator_timeout_secs: 120,
            validator_bin: "archsift".to_string(),
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configuration_validation_zero_timeout() {
        let config = BuildsmithConfig {
            build_timeout_secs: 0,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_excessive_timeout() {
        let config = BuildsmithConfig {
            monitor_timeout_secs: MAX_TIMEOUT_SECS + 1,
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_invalid_log_level() {
        let config = BuildsmithConfig {
            log_level: "verbose".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_configuration_validation_empty_validator() {
        let config = BuildsmithConfig {
            validator_bin: "  ".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_display() {
        let config = valid_config();
        let display = format!("{}", config);
        assert!(display.contains("Buildsmith Configuration:"));
        assert!(display.contains("Validator: archsift"));
    }

    #[test]
    fn test_to_display_map_covers_every_field() {
        let map = valid_config().to_display_map();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("validator_bin"), Some(&"archsift".to_string()));
    }

    fn valid_config() -> BuildsmithConfig {
        BuildsmithConfig {
            build_timeout_secs: 300,
            monitor_timeout_secs: 600,
            validator_timeout_secs: 120,
            validator_bin: "archsift".to_string(),
            log_level: "info".to_string(),
        }
    }
}
