//! Structured logging for the SMB latency profiler
//!
//! Entries carry a component name, optional correlation id and a set of
//! JSON fields. Every logger created by one [`LoggerFactory`] stamps the
//! same session id on its entries.

use crate::error::AppError;
use crate::models::{Measurement, RunOptions};
use crate::types::{ProbeOperation, ProtocolVersion};
use chrono::{DateTime, Utc};
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Per-phase probe timings
    Debug,
    /// Iteration progress
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            LogLevel::Debug => Color::Cyan,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    /// Lowest level shown for a run: debug with `--debug`, info with `--verbose`, warnings otherwise
    pub fn threshold_for(options: &RunOptions) -> Self {
        if options.debug {
            LogLevel::Debug
        } else if options.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LogLocation>,
}

/// Call site recorded by the `log_*!` macros
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

/// Fields stamped on every entry of a logger
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    fields: BTreeMap<String, Value>,
}

/// Component logger; build entries with [`Logger::info`] and friends, then `.log().await`
pub struct Logger {
    component: String,
    threshold: LogLevel,
    format: LogFormat,
    use_color: bool,
    show_location: bool,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Console logger at info level
    pub fn new(component: String) -> Self {
        Self::with_options(
            component,
            &RunOptions {
                verbose: true,
                ..RunOptions::default()
            },
        )
    }

    pub fn with_options(component: String, options: &RunOptions) -> Self {
        Self {
            component,
            threshold: LogLevel::threshold_for(options),
            format: options.log_format,
            use_color: options.enable_color,
            show_location: options.debug,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn name(&self) -> &str {
        &self.component
    }

    pub async fn set_session_id(&self, session_id: String) {
        self.context.write().await.session_id = Some(session_id);
    }

    /// Attach a field to every later entry of this logger
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(value) = serde_json::to_value(value) {
            self.context.write().await.fields.insert(key.to_string(), value);
        }
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    async fn emit(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let context = self.context.read().await;
            if let Some(session_id) = &context.session_id {
                entry.fields.insert("session_id".to_string(), Value::String(session_id.clone()));
            }
            for (key, value) in &context.fields {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let line = match self.format {
            LogFormat::Console => self.render_console(&entry),
            LogFormat::Json => render_json(&entry),
            LogFormat::Compact => render_compact(&entry),
        };

        // Warnings and errors share stderr with the error reporter
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", line);
        } else {
            let _ = writeln!(io::stdout(), "{}", line);
        }
    }

    fn render_console(&self, entry: &LogEntry) -> String {
        let level = format!("{:<5}", entry.level.as_str());
        let level = if self.use_color {
            level.color(entry.level.color()).bold().to_string()
        } else {
            level
        };

        let mut line = format!(
            "{} {} {}: {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            level,
            entry.component,
            entry.message
        );

        if let Some(id) = &entry.correlation_id {
            line.push_str(&format!(" ({})", id));
        }

        let fields: Vec<String> = entry
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != "session_id")
            .map(|(key, value)| match value {
                Value::String(text) => format!("{}={}", key, text),
                other => format!("{}={}", key, other),
            })
            .collect();
        if !fields.is_empty() {
            line.push_str(&format!(" [{}]", fields.join(" ")));
        }

        if self.show_location {
            if let Some(location) = &entry.location {
                line.push_str(&format!(" at {}:{}", location.file, location.line));
            }
        }

        line
    }
}

fn render_json(entry: &LogEntry) -> String {
    serde_json::to_string(entry).unwrap_or_else(|e| {
        format!("{{\"level\":\"ERROR\",\"message\":\"unserializable log entry: {}\"}}", e)
    })
}

fn render_compact(entry: &LogEntry) -> String {
    let level = entry.level.as_str();
    format!("{}|{}|{}", &level[..1], entry.component, entry.message)
}

/// Accumulates one entry; nothing is written until [`LogEntryBuilder::log`]
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: &str) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                component: logger.component.clone(),
                message: message.to_string(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(str::to_string),
        });
        self
    }

    /// The three latencies of one iteration
    pub fn timing(self, measurement: &Measurement) -> Self {
        self.field("exists_ms", measurement.exists_ms)
            .field("is_directory_ms", measurement.is_directory_ms)
            .field("length_ms", measurement.length_ms)
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("exit_code", error.exit_code())
    }

    pub async fn log(self) {
        self.logger.emit(self.entry).await;
    }
}

/// Debug-level trace of each probe call and its phases
pub struct ProbeLogger {
    logger: Logger,
}

impl ProbeLogger {
    pub fn new(options: &RunOptions) -> Self {
        Self {
            logger: Logger::with_options("PROBE".to_string(), options),
        }
    }

    /// Wrap an already configured logger
    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Entry into a probe operation
    pub async fn log_operation_start(&self, family: ProtocolVersion, operation: ProbeOperation, target: &str) {
        self.logger
            .debug(&format!("In {}", operation.call_name()))
            .field("family", family.family_name())
            .field("operation", operation.label())
            .field("target", target)
            .log()
            .await;
    }

    /// Duration of a single phase inside a probe operation
    pub async fn log_phase(&self, operation: ProbeOperation, phase: &str, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis();
        self.logger
            .debug(&format!("Time taken for {}: {} milliseconds", phase, elapsed_ms))
            .field("operation", operation.label())
            .field("phase", phase)
            .field("elapsed_ms", elapsed_ms as u64)
            .log()
            .await;
    }

    /// Completed probe operation with its measured latency
    pub async fn log_operation_end(&self, operation: ProbeOperation, elapsed_ms: u64, outcome: &str) {
        self.logger
            .debug(&format!("Time taken for {}: {} milliseconds", operation.call_name(), elapsed_ms))
            .field("operation", operation.label())
            .field("elapsed_ms", elapsed_ms)
            .field("outcome", outcome)
            .log()
            .await;
    }

    /// A teardown step failed; never masks the probe result
    pub async fn log_teardown_failure(&self, operation: ProbeOperation, resource: &str, error: &str) {
        self.logger
            .warn(&format!("Failed to close {} after {}: {}", resource, operation.call_name(), error))
            .field("operation", operation.label())
            .field("resource", resource)
            .log()
            .await;
    }
}

/// Records terminal errors before they are shown to the user
pub struct ErrorEventLogger {
    logger: Logger,
}

impl ErrorEventLogger {
    pub fn new(options: &RunOptions) -> Self {
        Self {
            logger: Logger::with_options("ERR".to_string(), options),
        }
    }

    pub fn from_logger(logger: Logger) -> Self {
        Self { logger }
    }

    pub async fn log_error(&self, error: &AppError, context: Option<&str>) {
        let message = match context {
            Some(ctx) => format!("{}: {}", ctx, error),
            None => error.to_string(),
        };

        let mut builder = self.logger.error(&message).error_info(error);
        if let Some(ctx) = context {
            builder = builder.field("context", ctx);
        }
        builder.log().await;
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    options: RunOptions,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_options(name.to_string(), &self.options);
        logger.set_session_id(self.session_id.clone()).await;
        logger
    }

    pub async fn create_probe_logger(&self) -> ProbeLogger {
        ProbeLogger::from_logger(self.create_logger("PROBE").await)
    }

    pub async fn create_error_logger(&self) -> ErrorEventLogger {
        ErrorEventLogger::from_logger(self.create_logger("ERR").await)
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// `log_*!(logger, fmt, args..)` logs with the call site attached; must be awaited in context
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
            .await
    };
}
