//! CLI behaviour tests
//!
//! These run the built binary. None of them reach a real SMB server, so
//! every scenario here ends before the first probe or fails on it.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const FULL_CONFIG: &str = "\
smb.server_address=fs01.invalid
smb.username=svc
smb.password=pw
smb.domain=CORP
smb.share_name=exchange
smb.file_name=report.docx
smb.dir_name=Shared
";

/// Helper function to create a test command isolated from the caller's environment
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("smbp").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("SMBP_ITERATIONS")
        .env_remove("SMBP_VERSION")
        .env("NO_COLOR", "1");
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> String {
    let path = dir.path().join("smb.properties");
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn reports_in(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("SMBSTATS_"))
        .collect()
}

#[test]
fn test_no_arguments_is_usage_error() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid usage!"))
        .stderr(predicate::str::contains("Usage: smbp"));

    assert!(reports_in(&dir).is_empty());
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .arg("--bogus")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid usage!"));
}

#[test]
fn test_extra_argument_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .arg(&config)
        .arg("second.properties")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid usage!"));

    assert!(reports_in(&dir).is_empty());
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .arg("does-not-exist.properties")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does-not-exist.properties"));

    assert!(reports_in(&dir).is_empty());
}

#[test]
fn test_incomplete_config_names_missing_keys() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, "smb.server_address=fs01\nsmb.username=svc\n");

    create_test_cmd(&dir)
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("smb.share_name"));

    assert!(reports_in(&dir).is_empty());
}

#[test]
fn test_zero_iterations_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .arg("--iterations")
        .arg("0")
        .arg(&config)
        .assert()
        .code(1);

    assert!(reports_in(&dir).is_empty());
}

#[test]
fn test_non_numeric_iterations_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .env("SMBP_ITERATIONS", "many")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid usage!"));
}

#[cfg(not(feature = "smb1"))]
#[test]
fn test_legacy_family_without_backend_fails_without_report() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .arg("--protocol-version")
        .arg("v1")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("SMB1"));

    assert!(reports_in(&dir).is_empty());
}

#[cfg(not(feature = "smb1"))]
#[test]
fn test_verbose_run_logs_startup_banner_with_selector() {
    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, FULL_CONFIG);

    create_test_cmd(&dir)
        .env("SMBP_VERSION", "v1")
        .arg("--verbose")
        .arg(&config)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Starting SMBProfiler V1"))
        .stdout(predicate::str::contains("Starting 1 iteration(s)"));
}

#[test]
fn test_help_topic_config_lists_keys() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .arg("--help-topic")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("smb.server_address"))
        .stdout(predicate::str::contains("smb.dir_name"));
}

#[test]
fn test_help_topic_env_lists_variables() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .arg("--help-topic")
        .arg("env")
        .assert()
        .success()
        .stdout(predicate::str::contains("SMBP_ITERATIONS"))
        .stdout(predicate::str::contains("SMBP_VERSION"));
}

#[test]
fn test_version_and_help() {
    let dir = TempDir::new().unwrap();

    create_test_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--protocol-version"));
}
