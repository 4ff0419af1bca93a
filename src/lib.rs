//! SMB Latency Profiler
//!
//! Measures how long existence, directory and size checks take against a
//! remote SMB share, for either the legacy (SMB1) or the current (SMB2/3)
//! protocol family, and writes a text report plus a bar chart of the
//! average latencies.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod probe;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, Measurement, MeasurementBuilder, MeasurementList, RunOptions, Timed};
pub use types::{ProbeOperation, ProtocolVersion};
pub use probe::{ProbeRegistry, RemoteProbe};
pub use executor::{Pacing, ProfileExecutor};
pub use output::{ReportArtifacts, ReportGenerator};
pub use stats::{Averages, LatencySummary};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// One-line build description for debug output
pub fn build_info() -> String {
    format!(
        "{} v{} ({}, commit {}, built {}, families: {})",
        PKG_NAME,
        VERSION,
        env!("TARGET_TRIPLE"),
        option_env!("GIT_COMMIT").unwrap_or("unknown"),
        env!("BUILD_TIME"),
        env!("PROTOCOL_FAMILIES")
    )
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_ITERATIONS: u32 = 1;
    pub const DEFAULT_PROTOCOL_VERSION: &str = "V2_3";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Environment variables carrying the run parameters
    pub const ITERATIONS_ENV: &str = "SMBP_ITERATIONS";
    pub const PROTOCOL_VERSION_ENV: &str = "SMBP_VERSION";

    /// Client-side think time between the existence and directory checks
    pub const EXISTS_TO_IS_DIRECTORY_DELAY: Duration = Duration::from_millis(2000);
    /// Client-side think time between the directory and length checks
    pub const IS_DIRECTORY_TO_LENGTH_DELAY: Duration = Duration::from_millis(1000);
    /// Pause after every iteration, including the last one
    pub const BETWEEN_ITERATIONS_DELAY: Duration = Duration::from_millis(1000);

    /// Report file naming
    pub const REPORT_FILE_PREFIX: &str = "SMBSTATS_";
    pub const REPORT_FILE_EXTENSION: &str = "out";
    pub const REPORT_TIMESTAMP_FORMAT: &str = "%d_%m_%y_%H_%M_%S_%3f";
    pub const CHART_FILE_EXTENSION: &str = "svg";

    /// Chart canvas size in pixels
    pub const CHART_WIDTH: u32 = 600;
    pub const CHART_HEIGHT: u32 = 400;
}
