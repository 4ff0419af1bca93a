//! Command-line interface module with topic help

pub mod help;

pub use help::{HelpSystem, HelpTopic};

use crate::logging::LogFormat;
use crate::models::RunOptions;
use crate::types::ProtocolVersion;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

/// SMB Latency Profiler - measures exists, isDirectory and length call latency against an SMB share
#[derive(Parser, Debug, Clone)]
#[command(name = "smbp")]
#[command(version, about, long_about = None, after_help = help::TOPICS_FOOTER)]
pub struct Cli {
    /// Properties file with the smb.* connection keys
    #[arg(value_name = "CONFIG_FILE", required_unless_present = "help_topic")]
    pub config_file: Option<PathBuf>,

    /// Number of profiling iterations
    #[arg(long, env = crate::defaults::ITERATIONS_ENV, default_value_t = crate::defaults::DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Protocol family selector; "v1" (any case) selects SMB1, anything else SMB2/3
    #[arg(long, value_name = "VER", env = crate::defaults::PROTOCOL_VERSION_ENV, default_value = crate::defaults::DEFAULT_PROTOCOL_VERSION)]
    pub protocol_version: String,

    /// Report file path (default: SMBSTATS_<timestamp>.out in the working directory)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output with per-phase probe timings
    #[arg(long)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Show help for a specific topic
    #[arg(long, value_enum, value_name = "TOPIC")]
    pub help_topic: Option<HelpTopic>,
}

impl Cli {
    /// Protocol family selected for the run
    pub fn protocol(&self) -> ProtocolVersion {
        ProtocolVersion::from_selector(&self.protocol_version)
    }

    /// Check if help should be displayed for a specific topic
    pub fn should_show_topic_help(&self) -> bool {
        self.help_topic.is_some()
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    /// Log format: explicit choice wins, otherwise JSON under --debug
    pub fn effective_log_format(&self) -> LogFormat {
        match self.log_format {
            Some(format) => format,
            None if self.debug => LogFormat::Json,
            None => LogFormat::Console,
        }
    }

    /// Output and diagnostics settings for the run
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            output: self.output.clone(),
            verbose: self.verbose,
            debug: self.debug,
            enable_color: self.use_colors(),
            log_format: self.effective_log_format(),
        }
    }

    /// Help for the requested topic, or the full option list without one
    pub fn display_help(&self) -> String {
        match self.help_topic {
            Some(topic) => HelpSystem::new().display_topic_help(topic, self.use_colors()),
            None => Self::command().render_long_help().to_string(),
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Run Summary:\n");
        if let Some(ref path) = self.config_file {
            summary.push_str(&format!("  Config file: {}\n", path.display()));
        }
        summary.push_str(&format!("  Iterations: {}\n", self.iterations));
        summary.push_str(&format!(
            "  Protocol: {} ({})\n",
            self.protocol_version,
            self.protocol().family_name()
        ));
        if let Some(ref path) = self.output {
            summary.push_str(&format!("  Report: {}\n", path.display()));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
