//! Configuration data model

use crate::logging::LogFormat;
use crate::types::ProtocolVersion;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Everything a profiling run needs to reach the share.
///
/// Built once at startup and never mutated afterwards; the executor and the
/// probes only ever see it behind a shared reference.
#[derive(Clone, PartialEq, Serialize)]
pub struct Config {
    pub server_address: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub domain: String,
    pub share_name: String,
    /// Target of the existence and length checks
    pub file_name: String,
    /// Target of the directory check
    pub dir_name: String,
    pub protocol_version: ProtocolVersion,
    /// Selector as given on the command line or in the environment
    pub protocol_selector: String,
    pub iteration_count: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            username: String::new(),
            password: String::new(),
            domain: String::new(),
            share_name: String::new(),
            file_name: String::new(),
            dir_name: String::new(),
            protocol_version: ProtocolVersion::default(),
            protocol_selector: crate::defaults::DEFAULT_PROTOCOL_VERSION.to_string(),
            iteration_count: crate::defaults::DEFAULT_ITERATIONS,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_address", &self.server_address)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .field("share_name", &self.share_name)
            .field("file_name", &self.file_name)
            .field("dir_name", &self.dir_name)
            .field("protocol_version", &self.protocol_version)
            .field("protocol_selector", &self.protocol_selector)
            .field("iteration_count", &self.iteration_count)
            .finish()
    }
}

impl Config {
    /// UNC path of the configured share, `\\server\share`
    pub fn share_unc(&self) -> String {
        format!(r"\\{}\{}", self.server_address, self.share_name)
    }

    /// First line logged by a run, `Starting SMBProfiler <SELECTOR>`
    pub fn startup_banner(&self) -> String {
        format!("Starting SMBProfiler {}", self.protocol_selector.to_uppercase())
    }

    /// Authentication principal, `DOMAIN\user`
    pub fn principal(&self) -> String {
        format!(r"{}\{}", self.domain, self.username)
    }
}

/// Output and diagnostics settings that do not affect what is measured
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Explicit report path; a timestamped name is generated otherwise
    pub output: Option<PathBuf>,
    pub verbose: bool,
    pub debug: bool,
    pub enable_color: bool,
    pub log_format: LogFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output: None,
            verbose: false,
            debug: false,
            enable_color: crate::defaults::DEFAULT_ENABLE_COLOR,
            log_format: LogFormat::Console,
        }
    }
}
