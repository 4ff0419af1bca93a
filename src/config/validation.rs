//! Configuration validation rules
//!
//! Runs before any probe so that an incomplete configuration file fails fast
//! with the names of the offending keys instead of a low-level protocol error.

use crate::{
    config::parser::{
        DIR_NAME_KEY, DOMAIN_KEY, FILE_NAME_KEY, PASSWORD_KEY, SERVER_ADDRESS_KEY, SHARE_NAME_KEY,
        USERNAME_KEY,
    },
    defaults::DEFAULT_PROTOCOL_VERSION,
    error::{AppError, Result},
    models::Config,
};
use colored::*;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration, returning non-fatal findings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        Self::validate_required(config)?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_targets(config));
        warnings.extend(Self::validate_server(config));
        warnings.extend(Self::validate_protocol(config));

        Ok(warnings)
    }

    /// Every configuration key must carry a value and at least one iteration must run.
    ///
    /// Whitespace-only values count as missing, except for the password.
    pub fn validate_required(config: &Config) -> Result<()> {
        let fields = [
            (SERVER_ADDRESS_KEY, &config.server_address),
            (USERNAME_KEY, &config.username),
            (PASSWORD_KEY, &config.password),
            (DOMAIN_KEY, &config.domain),
            (SHARE_NAME_KEY, &config.share_name),
            (FILE_NAME_KEY, &config.file_name),
            (DIR_NAME_KEY, &config.dir_name),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(key, value)| match *key {
                PASSWORD_KEY => value.is_empty(),
                _ => value.trim().is_empty(),
            })
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(AppError::config(format!(
                "Missing or empty configuration keys: {}",
                missing.join(", ")
            )));
        }

        if config.iteration_count == 0 {
            return Err(AppError::config("Iteration count must be at least 1"));
        }

        Ok(())
    }

    /// Target paths are resolved relative to the share root
    fn validate_targets(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (key, value) in [(FILE_NAME_KEY, &config.file_name), (DIR_NAME_KEY, &config.dir_name)] {
            if value.starts_with('\\') || value.starts_with('/') {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("{} '{}' starts with a path separator; it is resolved relative to the share", key, value),
                ));
            }
        }

        if config.file_name == config.dir_name {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} and {} name the same path", FILE_NAME_KEY, DIR_NAME_KEY),
            ));
        }

        warnings
    }

    fn validate_server(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.server_address.starts_with(r"\\") || config.server_address.contains("://") {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} '{}' looks like a path or URL; a host name or IP address is expected",
                    SERVER_ADDRESS_KEY, config.server_address
                ),
            ));
        }

        if config.share_name.contains(['\\', '/']) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("{} '{}' contains a path separator", SHARE_NAME_KEY, config.share_name),
            ));
        }

        warnings
    }

    fn validate_protocol(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        let selector = &config.protocol_selector;
        if !config.protocol_version.is_legacy() && !selector.eq_ignore_ascii_case(DEFAULT_PROTOCOL_VERSION) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("protocol selector '{}' is not V1; using the SMB2/3 family", selector),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProtocolVersion;

    fn complete() -> Config {
        Config {
            server_address: "fs01".to_string(),
            username: "svc".to_string(),
            password: "pw".to_string(),
            domain: "CORP".to_string(),
            share_name: "exchange".to_string(),
            file_name: "report.docx".to_string(),
            dir_name: "Shared".to_string(),
            protocol_version: ProtocolVersion::V2_3,
            protocol_selector: "V2_3".to_string(),
            iteration_count: 2,
        }
    }

    #[test]
    fn test_complete_config_passes_without_warnings() {
        let warnings = validate_config(&complete()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_missing_keys_are_listed() {
        let mut config = complete();
        config.password.clear();
        config.dir_name = "   ".to_string();

        let error = validate_config(&config).unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        let message = error.to_string();
        assert!(message.contains("smb.password"));
        assert!(message.contains("smb.dir_name"));
        assert!(!message.contains("smb.username"));
    }

    #[test]
    fn test_whitespace_password_is_accepted() {
        let mut config = complete();
        config.password = "   ".to_string();
        assert!(validate_config(&config).is_ok());

        config.username = " \t".to_string();
        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("smb.username"));
        assert!(!message.contains("smb.password"));
    }

    #[test]
    fn test_all_keys_missing() {
        let config = Config::default();
        let message = validate_config(&config).unwrap_err().to_string();
        for key in crate::config::PROPERTY_KEYS {
            assert!(message.contains(key), "{} not reported", key);
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut config = complete();
        config.iteration_count = 0;

        let error = validate_config(&config).unwrap_err();
        assert!(error.to_string().contains("at least 1"));
    }

    #[test]
    fn test_leading_separator_warns() {
        let mut config = complete();
        config.file_name = r"\inbound\report.docx".to_string();
        config.dir_name = "/Shared".to_string();

        let warnings = validate_config(&config).unwrap();
        assert_eq!(
            warnings.iter().filter(|w| w.level == ValidationLevel::Warning).count(),
            2
        );
    }

    #[test]
    fn test_server_and_share_shape_warnings() {
        let mut config = complete();
        config.server_address = r"\\fs01".to_string();
        config.share_name = "exchange/inbound".to_string();

        let warnings = validate_config(&config).unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_legacy_family_with_domain_has_no_findings() {
        let mut config = complete();
        config.protocol_version = ProtocolVersion::V1;
        config.protocol_selector = "v1".to_string();

        assert!(validate_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_selector_note() {
        let mut config = complete();
        config.protocol_selector = "v1 ".to_string();

        let warnings = validate_config(&config).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Info);
        assert_eq!(
            warnings[0].format(false),
            "[INFO] protocol selector 'v1 ' is not V1; using the SMB2/3 family"
        );

        config.protocol_selector = "v2_3".to_string();
        assert!(validate_config(&config).unwrap().is_empty());
    }
}
