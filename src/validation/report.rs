//! Typed model of the validator's JSON report.
//!
//! Field names follow the tool's camelCase wire format exactly; unknown
//! fields are ignored so the tool can grow its report without breaking
//! older readers. Scores keep their wire units internally: health is
//! 0 to 100, confidence and efficiency are 0 to 1 fractions. Conversion
//! to display percentages happens only at the presentation edge, via
//! [`percent`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("validator output is not a well-formed report: {reason}")]
    Malformed { reason: String },
}

impl ReportError {
    fn malformed(reason: impl Into<String>) -> Self {
        ReportError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Finding severity, closed set. A report carrying any other value
/// fails to parse rather than being misbinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One violation found by the validator. Only the severity matters for
/// aggregation; everything else in the wire object is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_files: u32,
    pub violations_count: u32,
    /// Project health, 0 to 100.
    pub health_score: u8,
    pub automation: AutomationSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationSummary {
    pub automatable_fixes: u32,
    /// Mean fix confidence as a 0 to 1 fraction.
    pub average_confidence: f64,
}

/// A concrete improvement the validator suggests, with a flag for
/// whether it can be acted on mechanically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionableInsight {
    pub title: String,
    pub description: String,
    pub actionable: bool,
    /// Effort in minutes.
    pub estimated_effort: u32,
}

/// Higher-level guidance. The step list arrives already ordered and is
/// kept in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub implementation_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EfficiencyMetrics {
    /// Overall efficiency as a 0 to 1 fraction.
    pub overall_score: f64,
}

/// The validator's full report.
///
/// `projectPath`, `summary`, and `efficiency` are required; the list
/// sections parse as empty when absent, which is how a partial report
/// from a failing run still comes through typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    pub project_path: String,
    pub summary: ReportSummary,
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub actionable_insights: Vec<ActionableInsight>,
    #[serde(default)]
    pub ai_recommendations: Vec<Recommendation>,
    pub efficiency: EfficiencyMetrics,
}

impl ValidationReport {
    /// Parses raw validator stdout. Syntactically broken JSON, missing
    /// required fields, unknown severities, and out-of-range scores are
    /// all the same failure: the payload is not a report we can trust.
    pub fn from_json(payload: &[u8]) -> Result<Self, ReportError> {
        let report: ValidationReport = serde_json::from_slice(payload)
            .map_err(|error| ReportError::malformed(error.to_string()))?;
        report.check_ranges()?;
        Ok(report)
    }

    fn check_ranges(&self) -> Result<(), ReportError> {
        if self.summary.health_score > 100 {
            return Err(ReportError::malformed(format!(
                "healthScore {} outside 0..=100",
                self.summary.health_score
            )));
        }
        if !(0.0..=1.0).contains(&self.summary.automation.average_confidence) {
            return Err(ReportError::malformed(format!(
                "averageConfidence {} outside 0..=1",
                self.summary.automation.average_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.efficiency.overall_score) {
            return Err(ReportError::malformed(format!(
                "efficiency overallScore {} outside 0..=1",
                self.efficiency.overall_score
            )));
        }
        Ok(())
    }

    /// Severity counts, recomputed from the findings on every call so
    /// the histogram can never drift from the list it summarizes.
    pub fn severity_histogram(&self) -> SeverityHistogram {
        let mut histogram = SeverityHistogram::default();
        for finding in &self.findings {
            histogram.add(finding.severity);
        }
        histogram
    }

    /// Insights flagged as mechanically actionable, in report order.
    pub fn actionable(&self) -> Vec<&ActionableInsight> {
        self.actionable_insights
            .iter()
            .filter(|insight| insight.actionable)
            .collect()
    }

    /// Recommendations exactly as the validator ranked them.
    pub fn prioritized_recommendations(&self) -> &[Recommendation] {
        &self.ai_recommendations
    }
}

/// Findings bucketed by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityHistogram {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityHistogram {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Converts a stored 0 to 1 fraction into a display percentage.
pub fn percent(fraction: f64) -> f64 {
    fraction * 100.0
}
