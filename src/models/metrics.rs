//! Timing measurements for probe operations

use crate::error::{AppError, Result};
use crate::stats::Averages;
use crate::types::ProbeOperation;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of one timed probe call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timed<T> {
    /// What the remote check returned
    pub value: T,
    /// Wall-clock time from start of connect until the result was obtained
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn new(value: T, elapsed: Duration) -> Self {
        Self { value, elapsed }
    }

    /// Elapsed time in whole milliseconds (sub-millisecond calls report 0)
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Latencies of one iteration, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub exists_ms: u64,
    pub is_directory_ms: u64,
    pub length_ms: u64,
}

impl Measurement {
    pub fn new(exists_ms: u64, is_directory_ms: u64, length_ms: u64) -> Self {
        Self {
            exists_ms,
            is_directory_ms,
            length_ms,
        }
    }

    /// Latency recorded for a given operation
    pub fn latency_ms(&self, operation: ProbeOperation) -> u64 {
        match operation {
            ProbeOperation::Exists => self.exists_ms,
            ProbeOperation::IsDirectory => self.is_directory_ms,
            ProbeOperation::Length => self.length_ms,
        }
    }

    /// Sum of the three latencies
    pub fn total_ms(&self) -> u64 {
        self.exists_ms
            .saturating_add(self.is_directory_ms)
            .saturating_add(self.length_ms)
    }
}

/// Fills a [`Measurement`] one operation at a time.
///
/// `build` refuses to produce a measurement with an unset field.
#[derive(Debug, Clone, Default)]
pub struct MeasurementBuilder {
    exists_ms: Option<u64>,
    is_directory_ms: Option<u64>,
    length_ms: Option<u64>,
}

impl MeasurementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latency of an operation
    pub fn record(&mut self, operation: ProbeOperation, latency_ms: u64) -> &mut Self {
        let slot = match operation {
            ProbeOperation::Exists => &mut self.exists_ms,
            ProbeOperation::IsDirectory => &mut self.is_directory_ms,
            ProbeOperation::Length => &mut self.length_ms,
        };
        *slot = Some(latency_ms);
        self
    }

    /// Operations that have not been recorded yet
    pub fn missing(&self) -> Vec<ProbeOperation> {
        ProbeOperation::ALL
            .iter()
            .copied()
            .filter(|op| match op {
                ProbeOperation::Exists => self.exists_ms.is_none(),
                ProbeOperation::IsDirectory => self.is_directory_ms.is_none(),
                ProbeOperation::Length => self.length_ms.is_none(),
            })
            .collect()
    }

    pub fn build(&self) -> Result<Measurement> {
        match (self.exists_ms, self.is_directory_ms, self.length_ms) {
            (Some(exists_ms), Some(is_directory_ms), Some(length_ms)) => {
                Ok(Measurement::new(exists_ms, is_directory_ms, length_ms))
            }
            _ => {
                let missing: Vec<&str> = self.missing().iter().map(|op| op.label()).collect();
                Err(AppError::internal(format!(
                    "Measurement is missing latencies for: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Measurements of a run, in iteration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementList {
    measurements: Vec<Measurement>,
}

impl MeasurementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            measurements: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, measurement: Measurement) {
        self.measurements.push(measurement);
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    /// Truncating integer mean of each operation; `None` for an empty list
    pub fn averages(&self) -> Option<Averages> {
        Averages::from_measurements(&self.measurements)
    }
}

impl From<Vec<Measurement>> for MeasurementList {
    fn from(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }
}

impl<'a> IntoIterator for &'a MeasurementList {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
