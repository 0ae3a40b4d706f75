//! Validation tool integration
//!
//! The architectural validation tool is a separate executable that
//! analyzes a project and prints a JSON report on stdout. This module
//! owns both directions of that contract: building the tool's argument
//! vector from a request, and turning its stdout back into a typed
//! report with derived summaries.

pub mod report;
pub mod request;

pub use report::{
    percent, ActionableInsight, AutomationSummary, EfficiencyMetrics, Finding, Recommendation,
    ReportError, ReportSummary, Severity, SeverityHistogram, ValidationReport,
};
pub use request::{ReportFormat, ValidationLevel, ValidationRequest};
