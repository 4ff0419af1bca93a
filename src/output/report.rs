//! Text report writer
//!
//! Layout of one report:
//!
//! ```text
//! ========================= SMB Operations Report =========================
//!
//! [Run 1]
//! Exists Call Time Taken: 120ms
//! IsDirectory Call Time Taken: 80ms
//! Length Call Time Taken: 95ms
//!
//!
//! <<Average times>>
//! Exists Call Avg Time: 120ms
//! IsDirectory Call Avg Time: 80ms
//! Length Call Avg Time: 95ms
//!
//! ========================= End of SMB Operations Report ======================
//! ```

use super::chart::ChartRenderer;
use crate::{
    defaults,
    error::{AppError, Result},
    models::MeasurementList,
    stats::{AverageAccumulator, Averages},
    types::ProbeOperation,
};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const REPORT_HEADER: &str = "========================= SMB Operations Report =========================";
pub const REPORT_FOOTER: &str = "========================= End of SMB Operations Report ======================";
pub const AVERAGES_MARKER: &str = "<<Average times>>";

/// Files produced by one report run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifacts {
    pub report_path: PathBuf,
    pub chart_path: PathBuf,
    pub averages: Averages,
}

/// Default report name, `SMBSTATS_<dd_MM_yy_HH_mm_ss_SSS>.out`
pub fn default_report_name(now: DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        defaults::REPORT_FILE_PREFIX,
        now.format(defaults::REPORT_TIMESTAMP_FORMAT),
        defaults::REPORT_FILE_EXTENSION
    )
}

/// Chart path belonging to a report path
pub fn chart_path_for(report_path: &Path) -> PathBuf {
    report_path.with_extension(defaults::CHART_FILE_EXTENSION)
}

/// Render the full report text and the averages it contains.
///
/// Sums are accumulated in the same pass that writes the run blocks.
pub fn format_report(measurements: &MeasurementList) -> Result<(String, Averages)> {
    let mut text = String::new();
    let mut accumulator = AverageAccumulator::default();

    let _ = write!(text, "{}\n\n", REPORT_HEADER);
    for (index, measurement) in measurements.iter().enumerate() {
        let _ = writeln!(text, "[Run {}]", index + 1);
        for operation in ProbeOperation::ALL {
            let _ = writeln!(
                text,
                "{} Call Time Taken: {}ms",
                operation.label(),
                measurement.latency_ms(operation)
            );
        }
        text.push('\n');
        accumulator.add(measurement);
    }

    let averages = accumulator
        .finish()
        .ok_or_else(|| AppError::report("No measurements to report"))?;

    let _ = writeln!(text, "\n{}", AVERAGES_MARKER);
    for (operation, avg) in averages.entries() {
        let _ = writeln!(text, "{} Call Avg Time: {}ms", operation.label(), avg);
    }
    let _ = write!(text, "\n{}\n\n", REPORT_FOOTER);

    Ok((text, averages))
}

/// Writes the text report and its chart
#[derive(Debug, Clone, Default)]
pub struct ReportGenerator {
    chart: ChartRenderer,
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chart(chart: ChartRenderer) -> Self {
        Self { chart }
    }

    /// Append the report to `path`, then render the chart next to it.
    ///
    /// An empty list is an error and leaves no file behind.
    pub fn generate(&self, measurements: &MeasurementList, path: &Path) -> Result<ReportArtifacts> {
        let (text, averages) = format_report(measurements)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| AppError::report(format!("Failed to open report {}: {}", path.display(), e)))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| AppError::report(format!("Failed to write report {}: {}", path.display(), e)))?;

        let chart_path = chart_path_for(path);
        self.chart.render(&averages, &chart_path)?;

        Ok(ReportArtifacts {
            report_path: path.to_path_buf(),
            chart_path,
            averages,
        })
    }
}
