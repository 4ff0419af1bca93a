//! Report, chart and console output
//!
//! The text report is the primary artifact; the chart is derived from the
//! same averages and written next to it with the `.svg` extension.

pub mod chart;
pub mod report;
pub mod summary;

pub use chart::ChartRenderer;
pub use report::{
    chart_path_for, default_report_name, format_report, ReportArtifacts, ReportGenerator,
};
pub use summary::{PerformanceLevel, SummaryFormatter};

use chrono::Local;
use std::path::PathBuf;

/// Report path for this run: the explicit one, or a timestamped name in the working directory
pub fn resolve_report_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(default_report_name(Local::now())))
}
