//! Run parameters from the process environment and an optional `.env` file

use crate::defaults::{ITERATIONS_ENV, PROTOCOL_VERSION_ENV};
use crate::error::{AppError, ErrorContext, Result};
use std::path::Path;

/// Loads and checks the `SMBP_*` run parameters
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if present.
    ///
    /// Must run before the command line is parsed so that the run parameters
    /// it defines are visible to the argument defaults. Variables already set
    /// in the process environment are not overwritten.
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if !path.exists() {
            if debug {
                println!("No {} file found, using environment and CLI arguments", path.display());
            }
            return Ok(());
        }

        dotenv::from_path(path).with_context(|| format!("Failed to load {}", path.display()))?;
        if debug {
            println!("Loaded run parameters from {}", path.display());
        }
        Ok(())
    }

    /// Commented template shown by `--help-topic env`
    pub fn create_example_env_content() -> String {
        format!(
            r#"# SMB Latency Profiler run parameters
#
# Connection settings (server, share, credentials, targets) belong in the
# properties file passed on the command line, not here.

# Number of profiling iterations (positive integer)
# {iterations}=5

# Protocol family: V1 selects legacy SMB1, anything else selects SMB2/3
# {version}=V2_3
"#,
            iterations = ITERATIONS_ENV,
            version = PROTOCOL_VERSION_ENV,
        )
    }

    /// Check one run parameter. Unknown keys pass.
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            ITERATIONS_ENV => {
                let count: u32 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {} value '{}'", ITERATIONS_ENV, value))?;
                if count == 0 {
                    return Err(AppError::validation(format!("{} must be at least 1", ITERATIONS_ENV)));
                }
            }
            // Any non-blank selector is accepted; only V1 has a special meaning
            PROTOCOL_VERSION_ENV if value.trim().is_empty() => {
                return Err(AppError::validation(format!("{} is set but empty", PROTOCOL_VERSION_ENV)));
            }
            _ => {}
        }
        Ok(())
    }

    /// Name, description and sample value of each run parameter
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (ITERATIONS_ENV, "Number of profiling iterations (at least 1)", "5"),
            (PROTOCOL_VERSION_ENV, "Protocol family selector: V1 for SMB1, anything else for SMB2/3", "V2_3"),
        ]
    }

    /// Problems with the run parameters currently set, one message each
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err()
            })
            .map(|e| e.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_example_content_mentions_both_variables() {
        let content = EnvManager::create_example_env_content();

        assert!(content.contains("# SMBP_ITERATIONS=5"));
        assert!(content.contains("# SMBP_VERSION=V2_3"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("SMBP_ITERATIONS", "5").is_ok());
        assert!(EnvManager::validate_env_var("SMBP_ITERATIONS", " 12 ").is_ok());
        assert!(EnvManager::validate_env_var("SMBP_VERSION", "v1").is_ok());
        assert!(EnvManager::validate_env_var("SMBP_VERSION", "SMB3").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "").is_ok());

        assert!(EnvManager::validate_env_var("SMBP_ITERATIONS", "-2").is_err());
        assert!(EnvManager::validate_env_var("SMBP_VERSION", "  ").is_err());

        let not_a_number = EnvManager::validate_env_var("SMBP_ITERATIONS", "many").unwrap_err();
        assert_eq!(not_a_number.category(), "PARSE");
        assert!(not_a_number.to_string().contains("Invalid SMBP_ITERATIONS value 'many'"));
        let zero = EnvManager::validate_env_var("SMBP_ITERATIONS", "0").unwrap_err();
        assert_eq!(zero.category(), "VALIDATION");
    }

    #[test]
    fn test_get_supported_env_vars() {
        let names: Vec<&str> = EnvManager::get_supported_env_vars().iter().map(|(name, _, _)| *name).collect();
        assert_eq!(names, vec!["SMBP_ITERATIONS", "SMBP_VERSION"]);
    }

    #[test]
    fn test_load_env_file_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SMBP_TEST_ONLY_MARKER=loaded").unwrap();

        EnvManager::load_env_file_from(file.path(), false).unwrap();
        assert_eq!(std::env::var("SMBP_TEST_ONLY_MARKER").unwrap(), "loaded");

        assert!(EnvManager::load_env_file_from(Path::new("/no/such/.env"), false).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this line has no separator").unwrap();

        let error = EnvManager::load_env_file_from(file.path(), false).unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        assert!(error.to_string().contains("Failed to load"));
    }
}
