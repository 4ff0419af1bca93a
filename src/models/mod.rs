//! Data models and structures for the SMB latency profiler

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{Config, RunOptions};
pub use metrics::{Measurement, MeasurementBuilder, MeasurementList, Timed};
