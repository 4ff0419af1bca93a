//! Configuration parsing from the properties file and run parameters
//!
//! The configuration file uses the Java properties layout: one `key=value`
//! pair per logical line, `#` and `!` comments, and backslash continuations.

use crate::{
    cli::Cli,
    error::{AppError, Result},
    models::Config,
    types::ProtocolVersion,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SERVER_ADDRESS_KEY: &str = "smb.server_address";
pub const USERNAME_KEY: &str = "smb.username";
pub const PASSWORD_KEY: &str = "smb.password";
pub const DOMAIN_KEY: &str = "smb.domain";
pub const SHARE_NAME_KEY: &str = "smb.share_name";
pub const FILE_NAME_KEY: &str = "smb.file_name";
pub const DIR_NAME_KEY: &str = "smb.dir_name";

/// Every key the profiler reads from the configuration file
pub const PROPERTY_KEYS: [&str; 7] = [
    SERVER_ADDRESS_KEY,
    USERNAME_KEY,
    PASSWORD_KEY,
    DOMAIN_KEY,
    SHARE_NAME_KEY,
    FILE_NAME_KEY,
    DIR_NAME_KEY,
];

/// Key/value pairs read from a properties file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parse properties text. Later duplicates replace earlier ones.
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        let mut lines = content.lines();

        while let Some(line) = lines.next() {
            let trimmed = line.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_key_value(&logical);
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    /// Read and parse a properties file.
    ///
    /// Files that are not valid UTF-8 are decoded as ISO-8859-1.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::config(format!(
                "Failed to load configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => e.into_bytes().iter().map(|&b| b as char).collect(),
        };

        Ok(Self::parse(&content))
    }

    /// Value for `key`, or the empty string when absent
    pub fn get(&self, key: &str) -> &str {
        self.entries.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a [`Config`] from the recognized keys plus the run parameters
    pub fn to_config(&self, protocol_version: ProtocolVersion, iteration_count: u32) -> Config {
        Config {
            server_address: self.get(SERVER_ADDRESS_KEY).to_string(),
            username: self.get(USERNAME_KEY).to_string(),
            password: self.get(PASSWORD_KEY).to_string(),
            domain: self.get(DOMAIN_KEY).to_string(),
            share_name: self.get(SHARE_NAME_KEY).to_string(),
            file_name: self.get(FILE_NAME_KEY).to_string(),
            dir_name: self.get(DIR_NAME_KEY).to_string(),
            protocol_version,
            protocol_selector: protocol_version.as_str().to_string(),
            iteration_count,
        }
    }
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\x0c'
}

/// An odd number of trailing backslashes continues the line
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split at the first unescaped `=`, `:` or blank
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut split_at = None;

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                split_at = Some(idx);
                break;
            }
            c if is_blank(c) => {
                split_at = Some(idx);
                break;
            }
            _ => {}
        }
    }

    let Some(idx) = split_at else {
        return (line, "");
    };

    let key = &line[..idx];
    let mut rest = line[idx..].trim_start_matches(is_blank);
    if rest.starts_with('=') || rest.starts_with(':') {
        rest = &rest[1..];
    }
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if hex.len() == 4 => {
                        out.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

/// Builds the run configuration from the CLI arguments and the properties file
pub struct ConfigParser {
    config_file: PathBuf,
    iteration_count: u32,
    protocol_selector: String,
    debug: bool,
}

impl ConfigParser {
    /// Create a parser from parsed CLI arguments
    pub fn new(cli: &Cli) -> Result<Self> {
        let config_file = cli
            .config_file
            .clone()
            .ok_or_else(|| AppError::config("No configuration file given"))?;

        Ok(Self {
            config_file,
            iteration_count: cli.iterations,
            protocol_selector: cli.protocol_version.clone(),
            debug: cli.debug,
        })
    }

    /// Create a parser without going through the CLI
    pub fn from_parts(config_file: PathBuf, iteration_count: u32, protocol_selector: &str) -> Self {
        Self {
            config_file,
            iteration_count,
            protocol_selector: protocol_selector.to_string(),
            debug: false,
        }
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Load the file and build the final configuration.
    ///
    /// Does not validate; missing keys come back as empty strings.
    pub fn parse(&self) -> Result<Config> {
        let properties = Properties::load(&self.config_file)?;
        let protocol_version = ProtocolVersion::from_selector(&self.protocol_selector);

        if self.debug {
            println!(
                "Loaded {} properties from {}",
                properties.len(),
                self.config_file.display()
            );
        }

        let mut config = properties.to_config(protocol_version, self.iteration_count);
        config.protocol_selector = self.protocol_selector.clone();
        Ok(config)
    }
}

/// Convenience function to load the configuration named on the command line
pub fn load_config(cli: &Cli) -> Result<Config> {
    ConfigParser::new(cli)?.parse()
}

/// Display configuration summary for debug purposes; the password is never shown
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Server: {}", config.server_address));
    summary.push(format!("Share: {}", config.share_name));
    summary.push(format!("User: {}", config.principal()));
    summary.push(format!("File: {}", config.file_name));
    summary.push(format!("Directory: {}", config.dir_name));
    summary.push(format!(
        "Protocol: {} ({})",
        config.protocol_version,
        config.protocol_version.family_name()
    ));
    summary.push(format!("Iterations: {}", config.iteration_count));

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# SMB profiler settings
smb.server_address=fs01.corp.local
smb.username = svc_b2b
smb.password:p@ss=word
smb.domain CORP
! legacy comment style
smb.share_name=exchange
smb.file_name=inbound/report.docx
smb.dir_name=Shared
";

    #[test]
    fn test_parse_separators_and_comments() {
        let props = Properties::parse(SAMPLE);

        assert_eq!(props.len(), 7);
        assert_eq!(props.get(SERVER_ADDRESS_KEY), "fs01.corp.local");
        assert_eq!(props.get(USERNAME_KEY), "svc_b2b");
        assert_eq!(props.get(PASSWORD_KEY), "p@ss=word");
        assert_eq!(props.get(DOMAIN_KEY), "CORP");
        assert_eq!(props.get(DIR_NAME_KEY), "Shared");
    }

    #[test]
    fn test_missing_keys_are_empty() {
        let props = Properties::parse("smb.server_address=host\n");
        let config = props.to_config(ProtocolVersion::V2_3, 1);

        assert_eq!(config.server_address, "host");
        assert_eq!(config.username, "");
        assert_eq!(config.dir_name, "");
        assert!(!props.contains_key(DOMAIN_KEY));
    }

    #[test]
    fn test_continuation_and_escapes() {
        let content = "smb.file_name=reports/\\\n    2024/q1.docx\nsmb.dir_name=My\\ Docs\nsmb.password=a\\\\b\\tc\\u0041\n";
        let props = Properties::parse(content);

        assert_eq!(props.get(FILE_NAME_KEY), "reports/2024/q1.docx");
        assert_eq!(props.get(DIR_NAME_KEY), "My Docs");
        assert_eq!(props.get(PASSWORD_KEY), "a\\b\tcA");
    }

    #[test]
    fn test_escaped_backslash_does_not_continue() {
        let props = Properties::parse("smb.share_name=share\\\\\nsmb.dir_name=d\n");
        assert_eq!(props.get(SHARE_NAME_KEY), "share\\");
        assert_eq!(props.get(DIR_NAME_KEY), "d");
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let props = Properties::parse("smb.username=first\nsmb.username=second\n");
        assert_eq!(props.get(USERNAME_KEY), "second");
    }

    #[test]
    fn test_key_without_value() {
        let props = Properties::parse("smb.domain\n   \nsmb.domain=\n");
        assert!(props.contains_key(DOMAIN_KEY));
        assert_eq!(props.get(DOMAIN_KEY), "");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let error = Properties::load(Path::new("/definitely/not/here.properties")).unwrap_err();
        assert_eq!(error.category(), "CONFIG");
        assert_eq!(error.exit_code(), 1);
        assert!(error.to_string().contains("here.properties"));
    }

    #[test]
    fn test_load_latin1_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"smb.username=j\xf6rg\n").unwrap();

        let props = Properties::load(file.path()).unwrap();
        assert_eq!(props.get(USERNAME_KEY), "j\u{f6}rg");
    }

    #[test]
    fn test_config_parser_with_cli() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let cli = Cli::parse_from(["smbp", "--iterations", "3", "--protocol-version", "v1", path.as_str()]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.iteration_count, 3);
        assert_eq!(config.protocol_version, ProtocolVersion::V1);
        assert_eq!(config.protocol_selector, "v1");
        assert_eq!(config.share_name, "exchange");
    }

    #[test]
    fn test_selector_is_kept_as_given() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ConfigParser::from_parts(file.path().to_path_buf(), 1, "smb3.1.1")
            .parse()
            .unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::V2_3);
        assert_eq!(config.protocol_selector, "smb3.1.1");
        assert_eq!(config.startup_banner(), "Starting SMBProfiler SMB3.1.1");
    }

    #[test]
    fn test_config_parser_from_parts() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let parser = ConfigParser::from_parts(file.path().to_path_buf(), 2, "V2_3");
        assert_eq!(parser.config_file(), file.path());

        let config = parser.parse().unwrap();
        assert_eq!(config.iteration_count, 2);
        assert_eq!(config.protocol_version, ProtocolVersion::V2_3);
        assert_eq!(config.file_name, "inbound/report.docx");
    }

    #[test]
    fn test_config_summary_hides_password() {
        let config = Properties::parse(SAMPLE).to_config(ProtocolVersion::V1, 4);
        let summary = display_config_summary(&config);

        assert!(summary.contains("Server: fs01.corp.local"));
        assert!(summary.contains("User: CORP\\svc_b2b"));
        assert!(summary.contains("Protocol: V1 (SMB1)"));
        assert!(summary.contains("Iterations: 4"));
        assert!(!summary.contains("p@ss=word"));
    }
}
