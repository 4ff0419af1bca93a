//! Profiling run orchestration
//!
//! Drives the three probe calls of every iteration in a fixed order with
//! fixed pauses between them, and collects one [`Measurement`] per iteration.

use crate::{
    defaults,
    error::Result,
    logging::Logger,
    models::{Config, Measurement, MeasurementBuilder, MeasurementList},
    probe::ProbeRegistry,
    types::ProbeOperation,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pauses inserted between probe calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After `exists`, before `is_directory`
    pub exists_to_is_directory: Duration,
    /// After `is_directory`, before `length`
    pub is_directory_to_length: Duration,
    /// After every iteration, including the last
    pub between_iterations: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            exists_to_is_directory: defaults::EXISTS_TO_IS_DIRECTORY_DELAY,
            is_directory_to_length: defaults::IS_DIRECTORY_TO_LENGTH_DELAY,
            between_iterations: defaults::BETWEEN_ITERATIONS_DELAY,
        }
    }
}

impl Pacing {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            exists_to_is_directory: Duration::ZERO,
            is_directory_to_length: Duration::ZERO,
            between_iterations: Duration::ZERO,
        }
    }

    /// Total pause time of one iteration
    pub fn per_iteration(&self) -> Duration {
        self.exists_to_is_directory + self.is_directory_to_length + self.between_iterations
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

/// Runs the configured number of iterations against one protocol family
pub struct ProfileExecutor {
    config: Arc<Config>,
    probes: ProbeRegistry,
    pacing: Pacing,
    logger: Logger,
}

impl ProfileExecutor {
    pub fn new(config: Arc<Config>, probes: ProbeRegistry, logger: Logger) -> Self {
        Self {
            config,
            probes,
            pacing: Pacing::default(),
            logger,
        }
    }

    /// Replace the default pauses
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Run every iteration in order.
    ///
    /// The first probe failure ends the run; measurements gathered so far
    /// are discarded with it.
    pub async fn run(&self) -> Result<MeasurementList> {
        let iterations = self.config.iteration_count;
        let started = Instant::now();
        let mut measurements = MeasurementList::with_capacity(iterations as usize);

        self.logger.info(&self.config.startup_banner()).log().await;
        self.logger
            .info(&format!("Starting {} iteration(s)", iterations))
            .field("protocol", self.config.protocol_version.as_str())
            .field("family", self.config.protocol_version.family_name())
            .log()
            .await;

        for iteration in 1..=iterations {
            let measurement = self.run_iteration(iteration).await?;
            measurements.push(measurement);
            pause(self.pacing.between_iterations).await;
        }

        self.logger
            .info(&format!("Completed {} iteration(s)", measurements.len()))
            .field("total_ms", started.elapsed().as_millis() as u64)
            .log()
            .await;

        Ok(measurements)
    }

    async fn run_iteration(&self, iteration: u32) -> Result<Measurement> {
        let config = self.config.as_ref();
        let correlation = format!("iteration-{}", iteration);
        let probe = self.probes.probe_for(config.protocol_version);
        let mut builder = MeasurementBuilder::new();

        self.logger
            .info(&format!("Iteration {} started", iteration))
            .correlation_id(&correlation)
            .log()
            .await;

        let exists = probe.exists(config).await?;
        if !exists.value {
            crate::log_warn!(self.logger, "{} does not exist on {}", config.file_name, config.share_unc());
        }
        builder.record(ProbeOperation::Exists, exists.elapsed_ms());
        pause(self.pacing.exists_to_is_directory).await;

        let is_directory = probe.is_directory(config).await?;
        if !is_directory.value {
            crate::log_warn!(self.logger, "{} is not a directory on {}", config.dir_name, config.share_unc());
        }
        builder.record(ProbeOperation::IsDirectory, is_directory.elapsed_ms());
        pause(self.pacing.is_directory_to_length).await;

        let length = probe.length(config).await?;
        crate::log_debug!(self.logger, "{} is {} bytes", config.file_name, length.value);
        builder.record(ProbeOperation::Length, length.elapsed_ms());

        let measurement = builder.build()?;
        self.logger
            .info(&format!("Iteration {} finished", iteration))
            .correlation_id(&correlation)
            .timing(&measurement)
            .log()
            .await;

        Ok(measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Timed;
    use crate::probe::RemoteProbe;
    use crate::types::ProtocolVersion;
    use async_trait::async_trait;
    use std::sync::Mutex;

    type CallLog = Arc<Mutex<Vec<(ProtocolVersion, ProbeOperation)>>>;

    struct CountingProbe {
        family: ProtocolVersion,
        calls: CallLog,
        fail_length_on_call: Option<usize>,
    }

    impl CountingProbe {
        fn record(&self, operation: ProbeOperation) -> usize {
            let mut calls = self.calls.lock().unwrap();
            calls.push((self.family, operation));
            calls.iter().filter(|(_, op)| *op == operation).count()
        }
    }

    #[async_trait]
    impl RemoteProbe for CountingProbe {
        fn family(&self) -> ProtocolVersion {
            self.family
        }

        async fn exists(&self, _config: &Config) -> Result<Timed<bool>> {
            self.record(ProbeOperation::Exists);
            Ok(Timed::new(false, Duration::from_millis(11)))
        }

        async fn is_directory(&self, _config: &Config) -> Result<Timed<bool>> {
            self.record(ProbeOperation::IsDirectory);
            Ok(Timed::new(true, Duration::from_millis(22)))
        }

        async fn length(&self, _config: &Config) -> Result<Timed<u64>> {
            let n = self.record(ProbeOperation::Length);
            if Some(n) == self.fail_length_on_call {
                return Err(AppError::probe(self.family, ProbeOperation::Length, "access denied"));
            }
            Ok(Timed::new(1200, Duration::from_millis(33)))
        }
    }

    fn executor(version: ProtocolVersion, iterations: u32, fail_length_on_call: Option<usize>) -> (ProfileExecutor, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ProbeRegistry::new(
            Box::new(CountingProbe { family: ProtocolVersion::V2_3, calls: Arc::clone(&calls), fail_length_on_call }),
            Box::new(CountingProbe { family: ProtocolVersion::V1, calls: Arc::clone(&calls), fail_length_on_call }),
        );
        let config = Config {
            protocol_version: version,
            iteration_count: iterations,
            file_name: "report.docx".to_string(),
            dir_name: "Shared".to_string(),
            ..Default::default()
        };
        let executor = ProfileExecutor::new(Arc::new(config), registry, Logger::new("TEST".to_string()))
            .with_pacing(Pacing::none());
        (executor, calls)
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.exists_to_is_directory, Duration::from_millis(2000));
        assert_eq!(pacing.is_directory_to_length, Duration::from_millis(1000));
        assert_eq!(pacing.between_iterations, Duration::from_millis(1000));
        assert_eq!(pacing.per_iteration(), Duration::from_secs(4));
        assert_eq!(Pacing::none().per_iteration(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_calls_run_in_order_and_false_does_not_stop() {
        let (executor, calls) = executor(ProtocolVersion::V2_3, 2, None);
        let list = executor.run().await.unwrap();

        assert_eq!(list.len(), 2);
        for measurement in &list {
            assert_eq!(*measurement, Measurement::new(11, 22, 33));
        }

        let ops: Vec<ProbeOperation> = calls.lock().unwrap().iter().map(|(_, op)| *op).collect();
        assert_eq!(
            ops,
            vec![
                ProbeOperation::Exists,
                ProbeOperation::IsDirectory,
                ProbeOperation::Length,
                ProbeOperation::Exists,
                ProbeOperation::IsDirectory,
                ProbeOperation::Length,
            ]
        );
    }

    #[tokio::test]
    async fn test_legacy_selector_routes_every_call() {
        let (executor, calls) = executor(ProtocolVersion::V1, 3, None);
        executor.run().await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 9);
        assert!(calls.iter().all(|(family, _)| *family == ProtocolVersion::V1));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_iterations() {
        let (executor, calls) = executor(ProtocolVersion::V2_3, 5, Some(2));
        let error = executor.run().await.unwrap_err();

        assert_eq!(error.exit_code(), 2);
        // Second iteration stops at length; nothing of iterations 3..5 runs
        assert_eq!(calls.lock().unwrap().len(), 6);
    }
}
