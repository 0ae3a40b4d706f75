//! Output formatting for multiple formats
//!
//! Formatters for JSON, YAML, and human-readable text. The machine
//! formats are straight serializations of the result types; the human
//! format condenses the same data into sections a developer can scan.
//!
//! # Example
//!
//! ```ignore
//! use buildsmith::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Human);
//! let output = formatter.format_descriptor(&descriptor)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};

use crate::orchestrator::{BuildReport, DiagnosisReport, ValidationOutcome};
use crate::project::ProjectDescriptor;
use crate::validation::{percent, Severity, ValidationReport};

/// Caps applied to the human-readable validation summary; the full
/// lists are always present in the JSON and YAML forms.
const MAX_INSIGHTS_SHOWN: usize = 3;
const MAX_RECOMMENDATIONS_SHOWN: usize = 2;

const RULE_WIDTH: usize = 42;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for command results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a new output formatter with the specified format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a project detection result
    pub fn format_descriptor(&self, descriptor: &ProjectDescriptor) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(descriptor)
                .context("Failed to serialize project descriptor to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(descriptor)
                .context("Failed to serialize project descriptor to YAML"),
            OutputFormat::Human => Ok(self.descriptor_human(descriptor)),
        }
    }

    /// Formats the result of a build-style operation
    pub fn format_build_report(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize build report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize build report to YAML"),
            OutputFormat::Human => Ok(self.build_report_human(report)),
        }
    }

    /// Formats an environment diagnosis
    pub fn format_diagnosis(&self, report: &DiagnosisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize diagnosis to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize diagnosis to YAML")
            }
            OutputFormat::Human => Ok(self.diagnosis_human(report)),
        }
    }

    /// Formats a validation outcome, parsed or degraded
    pub fn format_validation(&self, outcome: &ValidationOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(outcome)
                .context("Failed to serialize validation outcome to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(outcome)
                .context("Failed to serialize validation outcome to YAML"),
            OutputFormat::Human => Ok(self.validation_human(outcome)),
        }
    }

    // Human-readable formatting methods

    fn descriptor_human(&self, descriptor: &ProjectDescriptor) -> String {
        let mut output = String::new();

        output.push_str("Project Detection\n");
        output.push_str(&rule());

        output.push_str(&format!("Kind: {}\n", descriptor.kind));
        output.push_str(&format!("Root: {}\n", descriptor.root_path.display()));
        if let Some(container) = descriptor.container_path() {
            output.push_str(&format!("Container: {}\n", container.display()));
        }

        output
    }

    fn build_report_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();

        if report.outcome.succeeded {
            output.push_str("\u{2713} Build Operation Succeeded\n");
        } else {
            output.push_str("\u{26A0} Build Operation Failed\n");
        }
        output.push_str(&rule());

        output.push_str(&format!("Project:   {}\n", report.descriptor.kind));
        output.push_str(&format!("Command:   {}\n", report.invocation.command_line()));
        output.push_str(&format!(
            "Duration:  {:.1}s\n",
            report.outcome.duration_millis as f64 / 1000.0
        ));
        output.push_str(&format!("Exit Code: {}\n", report.outcome.exit_code));
        if report.outcome.timed_out {
            output.push_str(&format!(
                "Timed Out: yes (budget {}s)\n",
                report.invocation.timeout_secs
            ));
        }
        if let Some(failure) = &report.failure {
            output.push_str(&format!("\nFailure: {}\n", failure));
        }

        output
    }

    fn diagnosis_human(&self, report: &DiagnosisReport) -> String {
        let mut output = String::new();

        output.push_str("Environment Diagnosis\n");
        output.push_str(&rule());

        output.push_str(&format!(
            "Project: {} at {}\n\n",
            report.descriptor.kind,
            report.descriptor.root_path.display()
        ));

        output.push_str("Tools:\n");
        for (probe, connector) in [
            (&report.build_tool, "\u{251C}\u{2500}"),
            (&report.validator, "\u{2514}\u{2500}"),
        ] {
            let status = if probe.available {
                match &probe.detail {
                    Some(detail) => format!("available ({})", detail),
                    None => "available".to_string(),
                }
            } else {
                "missing".to_string()
            };
            output.push_str(&format!("{} {}: {}\n", connector, probe.name, status));
        }

        output
    }

    fn validation_human(&self, outcome: &ValidationOutcome) -> String {
        match &outcome.report {
            Some(report) => self.validation_report_human(outcome, report),
            None => self.validation_raw_human(outcome),
        }
    }

    fn validation_report_human(
        &self,
        outcome: &ValidationOutcome,
        report: &ValidationReport,
    ) -> String {
        let mut output = String::new();

        if outcome.degraded {
            output.push_str("\u{26A0} Validation Report (Degraded)\n");
        } else {
            output.push_str("\u{2713} Validation Report\n");
        }
        output.push_str(&rule());

        output.push_str(&format!("Project:      {}\n", report.project_path));
        output.push_str(&format!(
            "Health Score: {}/100\n",
            report.summary.health_score
        ));
        output.push_str(&format!("Files:        {}\n", report.summary.total_files));
        output.push_str(&format!(
            "Violations:   {}\n\n",
            report.summary.violations_count
        ));

        let histogram = report.severity_histogram();
        output.push_str("Severity Breakdown:\n");
        for (index, severity) in Severity::ALL.iter().enumerate() {
            let connector = if index == Severity::ALL.len() - 1 {
                "\u{2514}\u{2500}"
            } else {
                "\u{251C}\u{2500}"
            };
            output.push_str(&format!(
                "{} {:9} {}\n",
                connector,
                format!("{}:", severity),
                histogram.count(*severity)
            ));
        }
        output.push('\n');

        output.push_str("Automation:\n");
        output.push_str(&format!(
            "\u{251C}\u{2500} Automatable Fixes:  {}\n",
            report.summary.automation.automatable_fixes
        ));
        output.push_str(&format!(
            "\u{2514}\u{2500} Average Confidence: {:.1}%\n\n",
            percent(report.summary.automation.average_confidence)
        ));

        output.push_str(&format!(
            "Efficiency: {:.1}%\n",
            percent(report.efficiency.overall_score)
        ));

        let actionable = report.actionable();
        if !actionable.is_empty() {
            output.push_str("\nActionable Insights:\n");
            for insight in actionable.iter().take(MAX_INSIGHTS_SHOWN) {
                output.push_str(&format!(
                    "  - {} ({} min)\n",
                    insight.title, insight.estimated_effort
                ));
                output.push_str(&format!("    {}\n", insight.description));
            }
            if actionable.len() > MAX_INSIGHTS_SHOWN {
                output.push_str(&format!(
                    "  ... and {} more\n",
                    actionable.len() - MAX_INSIGHTS_SHOWN
                ));
            }
        }

        let recommendations = report.prioritized_recommendations();
        if !recommendations.is_empty() {
            output.push_str("\nPriority Actions:\n");
            for (index, recommendation) in
                recommendations.iter().take(MAX_RECOMMENDATIONS_SHOWN).enumerate()
            {
                output.push_str(&format!("{}. {}\n", index + 1, recommendation.title));
                output.push_str(&format!("   {}\n", recommendation.description));
                for (step_index, step) in recommendation.implementation_steps.iter().enumerate() {
                    output.push_str(&format!("   {}. {}\n", step_index + 1, step));
                }
            }
        }

        if outcome.degraded {
            output.push_str(
                "\nNote: the validation tool exited with a failure; this report may be partial.\n",
            );
        }

        output.push_str(&format!("\nCompleted in {}ms\n", outcome.duration_millis));
        output
    }

    fn validation_raw_human(&self, outcome: &ValidationOutcome) -> String {
        let mut output = String::new();

        output.push_str("\u{26A0} Validation Output (Unparsed)\n");
        output.push_str(&rule());

        output.push_str(&format!("Tool:      {}\n", outcome.tool_path.display()));
        output.push_str(&format!(
            "Tool Exit: {}\n",
            if outcome.tool_succeeded {
                "success"
            } else {
                "failure"
            }
        ));

        if !outcome.raw_stdout.is_empty() {
            output.push_str("\nOutput:\n");
            output.push_str(&outcome.raw_stdout);
            if !outcome.raw_stdout.ends_with('\n') {
                output.push('\n');
            }
        }
        if !outcome.diagnostics.is_empty() {
            output.push_str("\nDiagnostics:\n");
            output.push_str(&outcome.diagnostics);
            if !outcome.diagnostics.ends_with('\n') {
                output.push('\n');
            }
        }

        output
    }
}

fn rule() -> String {
    let mut line = "\u{2501}".repeat(RULE_WIDTH);
    line.push_str("\n\n");
    line
}
