//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager, ValidationLevel},
    error::{AppError, ErrorReporter, Result},
    executor::{Pacing, ProfileExecutor},
    logging::LoggerFactory,
    models::RunOptions,
    output::{resolve_report_path, ReportArtifacts, ReportGenerator, SummaryFormatter},
    probe::ProbeRegistry,
    stats::LatencySummary,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    options: RunOptions,
    loggers: LoggerFactory,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        let options = cli.run_options();
        Self {
            cli,
            loggers: LoggerFactory::new(options.clone()),
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run against the real SMB clients with the standard pauses
    pub async fn run(&self) -> Result<ReportArtifacts> {
        let probes = ProbeRegistry::smb(Arc::new(self.loggers.create_probe_logger().await));
        self.run_with(probes, Pacing::default()).await
    }

    /// Run with the given probes and pacing.
    ///
    /// Nothing is written unless every iteration succeeds.
    pub async fn run_with(&self, probes: ProbeRegistry, pacing: Pacing) -> Result<ReportArtifacts> {
        let logger = self.loggers.create_logger("APP").await;
        crate::log_debug!(logger, "{}", crate::build_info());
        for warning in EnvManager::validate_current_env() {
            crate::log_warn!(logger, "{}", warning);
        }

        if self.options.verbose {
            println!("{}", self.cli.get_config_summary());
        }

        let config = load_config(&self.cli)?;
        let warnings = validate_config(&config)?;
        for warning in &warnings {
            let entry = match warning.level {
                ValidationLevel::Info => logger.info(&warning.message),
                _ => logger.warn(&warning.message),
            };
            entry.field("check", "config").log().await;
        }
        if self.options.debug {
            println!("Configuration Summary:\n{}\n", display_config_summary(&config));
        }

        let run_logger = self.loggers.create_logger("RUN").await;
        run_logger
            .add_context_field("protocol", config.protocol_version.as_str())
            .await;
        let executor = ProfileExecutor::new(Arc::new(config), probes, run_logger).with_pacing(pacing);
        let measurements = executor.run().await?;

        let report_path = resolve_report_path(self.options.output.clone());
        let artifacts = ReportGenerator::new().generate(&measurements, &report_path)?;
        logger
            .info("Report written")
            .field("report", artifacts.report_path.display().to_string())
            .field("chart", artifacts.chart_path.display().to_string())
            .log()
            .await;

        let summary = LatencySummary::from_list(&measurements)
            .ok_or_else(|| AppError::internal("Report written without measurements"))?;
        println!("{}", SummaryFormatter::new(self.options.enable_color).format(&summary, &artifacts));

        Ok(artifacts)
    }

    /// Log a terminal error and tell the user about it
    pub async fn report_failure(&self, error: &AppError) {
        let error_logger = self.loggers.create_error_logger().await;
        error_logger.log_error(error, Some("Run aborted")).await;
        ErrorReporter::new(self.options.enable_color, self.options.verbose).report_error(error);
    }
}
