//! Error handling for the SMB latency profiler
//!
//! Every error here is terminal: the run is aborted, the error is logged
//! with its category, and the process exits with [`AppError::exit_code`].

use crate::types::{ProbeOperation, ProtocolVersion};
use colored::{Color, Colorize};
use thiserror::Error;

/// Exit status used for command-line usage errors
pub const USAGE_EXIT_CODE: i32 = -1;

/// Message printed on stderr whenever a run aborts
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Sorry, an unexpected error occurred. Please contact support.";

#[derive(Error, Debug)]
pub enum AppError {
    /// Properties file missing, unreadable or incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connect, authenticate, mount or check failed against the share
    #[error("Probe error: [{} {}] {message}", .family.family_name(), .operation.call_name())]
    Probe {
        family: ProtocolVersion,
        operation: ProbeOperation,
        message: String,
    },

    /// Text report or chart could not be written
    #[error("Report error: {0}")]
    Report(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Failure of `operation` against the share, tagged with the protocol family
    pub fn probe<S: Into<String>>(family: ProtocolVersion, operation: ProbeOperation, message: S) -> Self {
        Self::Probe {
            family,
            operation,
            message: message.into(),
        }
    }

    pub fn report<S: Into<String>>(message: S) -> Self {
        Self::Report(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Category name used in logs and console output
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Probe { .. } => "PROBE",
            Self::Report(_) => "REPORT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Process exit status: 1 for bad input, 2 for the share, 5 for local files, 99 for bugs
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Probe { .. } => 2,
            Self::Report(_) | Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Protocol family of a probe failure
    pub fn family(&self) -> Option<ProtocolVersion> {
        match self {
            Self::Probe { family, .. } => Some(*family),
            _ => None,
        }
    }

    fn suggestion(&self) -> &'static str {
        match self {
            Self::Config(_) => "Check the properties file passed on the command line (see --help-topic config).",
            Self::Probe { family: ProtocolVersion::V1, .. } => {
                "Check the server address, credentials and share name, and that the server still offers SMB1."
            }
            Self::Probe { .. } => {
                "Check the server address, credentials and share name, or select the legacy family with SMBP_VERSION=V1."
            }
            Self::Report(_) | Self::Io(_) => "Check write permissions and free space in the output directory.",
            Self::Validation(_) | Self::Parse(_) => "Check the smb.* properties and the SMBP_* run parameters.",
            Self::Internal(_) => "This is a bug; please report it together with the debug log (--debug).",
        }
    }

    /// Error text followed by a hint on what to check
    pub fn user_friendly_message(&self) -> String {
        format!("{}\n\nSuggestion: {}", self, self.suggestion())
    }

    fn color(&self) -> Color {
        match self.exit_code() {
            1 => Color::Red,
            2 => Color::Yellow,
            5 => Color::Cyan,
            _ => Color::BrightRed,
        }
    }

    /// `[CATEGORY] message`, colored by category when asked
    pub fn format_for_console(&self, use_color: bool) -> String {
        if use_color {
            let color = self.color();
            format!(
                "[{}] {}",
                self.category().color(color).bold(),
                self.to_string().color(color)
            )
        } else {
            format!("[{}] {}", self.category(), self)
        }
    }

    /// Same error with `context` prepended to its message
    pub fn with_prefix(self, context: &str) -> Self {
        let prefix = |message: String| format!("{}: {}", context, message);
        match self {
            Self::Config(m) => Self::Config(prefix(m)),
            Self::Probe {
                family,
                operation,
                message,
            } => Self::Probe {
                family,
                operation,
                message: prefix(message),
            },
            Self::Report(m) => Self::Report(prefix(m)),
            Self::Validation(m) => Self::Validation(prefix(m)),
            Self::Io(m) => Self::Io(prefix(m)),
            Self::Parse(m) => Self::Parse(prefix(m)),
            Self::Internal(m) => Self::Internal(prefix(m)),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("not a whole number ({})", error))
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", error))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Attach context to a foreign error while converting it; the category is kept
pub trait ErrorContext<T> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_prefix(&f()))
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.map_err(|e| e.into().with_prefix(message))
    }
}

/// Prints terminal errors on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Generic apology, then the categorized error; the suggestion only when verbose
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", UNEXPECTED_ERROR_MESSAGE);
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
