//! Latency aggregation for profiling runs
//!
//! Report averages use truncating integer division, so `[10, 10, 11]`
//! averages to `10`, not `10.33`.

use crate::{
    models::metrics::{Measurement, MeasurementList},
    types::ProbeOperation,
};
use serde::{Deserialize, Serialize};

/// Truncating integer mean of each operation across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Averages {
    pub exists_ms: u64,
    pub is_directory_ms: u64,
    pub length_ms: u64,
}

impl Averages {
    /// Accumulate all three columns in a single pass.
    ///
    /// Returns `None` when there is nothing to average.
    pub fn from_measurements(measurements: &[Measurement]) -> Option<Self> {
        let mut accumulator = AverageAccumulator::default();
        for measurement in measurements {
            accumulator.add(measurement);
        }
        accumulator.finish()
    }

    pub fn get(&self, operation: ProbeOperation) -> u64 {
        match operation {
            ProbeOperation::Exists => self.exists_ms,
            ProbeOperation::IsDirectory => self.is_directory_ms,
            ProbeOperation::Length => self.length_ms,
        }
    }

    /// `(label, average)` pairs in report order
    pub fn entries(&self) -> [(ProbeOperation, u64); 3] {
        [
            (ProbeOperation::Exists, self.exists_ms),
            (ProbeOperation::IsDirectory, self.is_directory_ms),
            (ProbeOperation::Length, self.length_ms),
        ]
    }

    /// Largest of the three averages
    pub fn max(&self) -> u64 {
        self.exists_ms.max(self.is_directory_ms).max(self.length_ms)
    }
}

/// Running sums used while a report streams its per-run lines
#[derive(Debug, Clone, Default)]
pub struct AverageAccumulator {
    exists_sum: u128,
    is_directory_sum: u128,
    length_sum: u128,
    count: u128,
}

impl AverageAccumulator {
    pub fn add(&mut self, measurement: &Measurement) {
        self.exists_sum += u128::from(measurement.exists_ms);
        self.is_directory_sum += u128::from(measurement.is_directory_ms);
        self.length_sum += u128::from(measurement.length_ms);
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        usize::try_from(self.count).unwrap_or(usize::MAX)
    }

    pub fn finish(&self) -> Option<Averages> {
        if self.count == 0 {
            return None;
        }
        // A mean never exceeds the largest input, so it always fits back in u64
        let mean = |sum: u128| u64::try_from(sum / self.count).unwrap_or(u64::MAX);
        Some(Averages {
            exists_ms: mean(self.exists_sum),
            is_directory_ms: mean(self.is_directory_sum),
            length_ms: mean(self.length_sum),
        })
    }
}

/// Min / average / max of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationStats {
    pub operation: ProbeOperation,
    pub min_ms: u64,
    pub avg_ms: u64,
    pub max_ms: u64,
}

/// Per-operation spread of a run, shown in the console summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub iterations: usize,
    pub operations: Vec<OperationStats>,
}

impl LatencySummary {
    pub fn from_list(list: &MeasurementList) -> Option<Self> {
        let averages = list.averages()?;

        let operations = ProbeOperation::ALL
            .iter()
            .map(|&operation| {
                let values = list.iter().map(|m| m.latency_ms(operation));
                let (min_ms, max_ms) = values.fold((u64::MAX, 0u64), |(lo, hi), v| (lo.min(v), hi.max(v)));
                OperationStats {
                    operation,
                    min_ms,
                    avg_ms: averages.get(operation),
                    max_ms,
                }
            })
            .collect();

        Some(Self {
            iterations: list.len(),
            operations,
        })
    }

    pub fn get(&self, operation: ProbeOperation) -> Option<&OperationStats> {
        self.operations.iter().find(|stats| stats.operation == operation)
    }
}
