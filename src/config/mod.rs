//! Configuration management module

pub mod parser;
pub mod validation;
pub mod env;

// Re-export main functionality
pub use parser::{ConfigParser, Properties, load_config, display_config_summary, PROPERTY_KEYS};
pub use validation::{ConfigValidator, ValidationLevel, ValidationWarning, validate_config};
pub use env::EnvManager;

// Re-export from models for convenience
pub use crate::models::Config;
