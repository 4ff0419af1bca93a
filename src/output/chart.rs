//! Bar chart of the average latency per operation

use crate::{
    defaults,
    error::{AppError, Result},
    stats::Averages,
    types::ProbeOperation,
};
use plotters::prelude::*;
use std::path::Path;

pub const CHART_TITLE: &str = "Average SMB Operation Times";
pub const X_AXIS_LABEL: &str = "Operation Type";
pub const Y_AXIS_LABEL: &str = "Average Time (ms)";
pub const SERIES_LABEL: &str = "Average Time";

/// Renders the averages as an SVG bar chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: defaults::CHART_WIDTH,
            height: defaults::CHART_HEIGHT,
        }
    }
}

fn chart_error<E: std::fmt::Display>(path: &Path, e: E) -> AppError {
    AppError::report(format!("Failed to render chart {}: {}", path.display(), e))
}

/// Upper bound of the value axis, leaving headroom above the tallest bar
fn value_axis_max(averages: &Averages) -> u64 {
    let max = averages.max();
    max.saturating_add(max / 10).saturating_add(1)
}

fn category_label(value: &SegmentValue<u32>) -> String {
    match value {
        SegmentValue::CenterOf(index) => ProbeOperation::ALL
            .get(*index as usize)
            .map(|op| op.label().to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

impl ChartRenderer {
    pub fn render(&self, averages: &Averages, path: &Path) -> Result<()> {
        let root = SVGBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_error(path, e))?;

        let categories = ProbeOperation::ALL.len() as u32;
        let mut chart = ChartBuilder::on(&root)
            .caption(CHART_TITLE, ("sans-serif", 20))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..categories).into_segmented(), 0u64..value_axis_max(averages))
            .map_err(|e| chart_error(path, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_label_formatter(&category_label)
            .draw()
            .map_err(|e| chart_error(path, e))?;

        let style = BLUE.mix(0.7).filled();
        chart
            .draw_series(averages.entries().iter().enumerate().map(|(index, (_, avg))| {
                let index = index as u32;
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(index), 0), (SegmentValue::Exact(index + 1), *avg)],
                    style,
                );
                bar.set_margin(0, 0, 20, 20);
                bar
            }))
            .map_err(|e| chart_error(path, e))?
            .label(SERIES_LABEL)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(|e| chart_error(path, e))?;

        root.present().map_err(|e| chart_error(path, e))?;
        Ok(())
    }
}
