//! Phase timing for a single probe call

use crate::logging::ProbeLogger;
use crate::models::Timed;
use crate::types::ProbeOperation;
use std::time::{Duration, Instant};

/// Splits one probe call into named phases.
///
/// The reported latency runs from [`PhaseTimer::start`] to the last
/// [`PhaseTimer::mark`]; anything after that (teardown) is not counted.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    operation: ProbeOperation,
    started: Instant,
    last_mark: Instant,
    phases: Vec<(&'static str, Duration)>,
}

impl PhaseTimer {
    pub fn start(operation: ProbeOperation) -> Self {
        let now = Instant::now();
        Self {
            operation,
            started: now,
            last_mark: now,
            phases: Vec::new(),
        }
    }

    /// Close the current phase under `name`
    pub fn mark(&mut self, name: &'static str) {
        let now = Instant::now();
        self.phases.push((name, now.duration_since(self.last_mark)));
        self.last_mark = now;
    }

    /// Time from start to the last mark
    pub fn elapsed(&self) -> Duration {
        self.last_mark.duration_since(self.started)
    }

    pub fn phases(&self) -> &[(&'static str, Duration)] {
        &self.phases
    }

    pub fn operation(&self) -> ProbeOperation {
        self.operation
    }

    /// Wrap a result with the time measured up to the last mark
    pub fn finish<T>(&self, value: T) -> Timed<T> {
        Timed::new(value, self.elapsed())
    }

    /// Emit one debug entry per phase
    pub async fn log_phases(&self, logger: &ProbeLogger) {
        for (name, duration) in &self.phases {
            logger.log_phase(self.operation, name, *duration).await;
        }
    }
}
