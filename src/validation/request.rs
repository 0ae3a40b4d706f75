//! Validator invocation parameters.
//!
//! The argument layout is part of the contract with the validation
//! tool: project path first, then `--level=` and `--format=` always,
//! then the optional `--deep` and `--config=` in that order.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub const DEFAULT_VALIDATOR_TIMEOUT_SECS: u64 = 120;

/// How much of the rule set the validator applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    #[default]
    Critical,
    Standard,
    Comprehensive,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationLevel::Critical => "critical",
            ValidationLevel::Standard => "standard",
            ValidationLevel::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format requested from the validator. `Json` is what the
/// aggregation path expects; `Summary` asks the tool for prose, which
/// then flows through the raw-text fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    #[default]
    Summary,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Summary => "summary",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation run's parameters.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub level: ValidationLevel,
    pub format: ReportFormat,
    pub deep: bool,
    pub config_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for ValidationRequest {
    fn default() -> Self {
        ValidationRequest {
            level: ValidationLevel::default(),
            format: ReportFormat::default(),
            deep: false,
            config_path: None,
            timeout_secs: DEFAULT_VALIDATOR_TIMEOUT_SECS,
        }
    }
}

impl ValidationRequest {
    /// Argument vector for the validator, project path first.
    pub fn arguments(&self, project_path: &Path) -> Vec<String> {
        let mut arguments = vec![
            project_path.display().to_string(),
            format!("--level={}", self.level),
            format!("--format={}", self.format),
        ];
        if self.deep {
            arguments.push("--deep".to_string());
        }
        if let Some(config) = &self.config_path {
            arguments.push(format!("--config={}", config.display()));
        }
        arguments
    }
}
