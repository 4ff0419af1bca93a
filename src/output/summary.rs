//! Console summary printed after a successful run

use super::report::ReportArtifacts;
use crate::stats::LatencySummary;
use colored::*;
use std::fmt::Write as _;

/// Latency band used to color a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceLevel {
    Excellent, // < 50ms
    Good,      // 50-200ms
    Fair,      // 200-1000ms
    Poor,      // >= 1000ms
}

impl PerformanceLevel {
    pub fn from_latency_ms(ms: u64) -> Self {
        match ms {
            0..=49 => Self::Excellent,
            50..=199 => Self::Good,
            200..=999 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Red,
        }
    }
}

/// Formats the min/avg/max table
pub struct SummaryFormatter {
    enable_color: bool,
}

impl SummaryFormatter {
    pub fn new(enable_color: bool) -> Self {
        Self { enable_color }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn latency(&self, ms: u64) -> String {
        let text = format!("{}ms", ms);
        if self.enable_color {
            // Pad before coloring so escape codes do not skew the columns
            format!("{:>10}", text)
                .color(PerformanceLevel::from_latency_ms(ms).color())
                .to_string()
        } else {
            format!("{:>10}", text)
        }
    }

    pub fn format(&self, summary: &LatencySummary, artifacts: &ReportArtifacts) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{}",
            self.bold(&format!("SMB operation latency over {} iteration(s)", summary.iterations))
        );
        let _ = writeln!(out, "{:<14}{:>10}{:>10}{:>10}", "Operation", "Min", "Avg", "Max");
        let _ = writeln!(out, "{}", "-".repeat(44));
        for stats in &summary.operations {
            let _ = writeln!(
                out,
                "{:<14}{}{}{}",
                stats.operation.label(),
                self.latency(stats.min_ms),
                self.latency(stats.avg_ms),
                self.latency(stats.max_ms)
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Report: {}", artifacts.report_path.display());
        let _ = writeln!(out, "Chart:  {}", artifacts.chart_path.display());

        out
    }
}
