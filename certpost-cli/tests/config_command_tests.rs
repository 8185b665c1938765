//! Integration tests for `certpost config` command.
//!
//! Tests config validation and display functionality with real TOML files.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use certpost_cli::commands::config::build_config_report;
use certpost_core::config::CertpostConfig;

#[tokio::test]
async fn test_config_validate_valid_toml() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("certpost.toml");

    let valid_config = r#"
[general]
log_level = "info"
log_format = "json"

[scan]
max_files = 100
worker_count = 2
extensions = ["cer", "crt"]

[report]
date_format = "%Y-%m-%d"
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let config = CertpostConfig::load(&config_path)
        .await
        .expect("valid config should load successfully");

    // Then: Values are taken from the file, the rest are defaults
    assert_eq!(config.scan.max_files, 100);
    assert_eq!(config.scan.extensions, vec!["cer", "crt"]);
    assert_eq!(config.report.default_file_name, "report.xlsx");
}

#[tokio::test]
async fn test_config_validate_malformed_toml() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[scan\nmax_files = 1\n").expect("should write bad config");

    let result = CertpostConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn test_config_validate_rejects_zero_workers() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("certpost.toml");

    fs::write(&config_path, "[scan]\nworker_count = 0\n").expect("should write config");

    let err = CertpostConfig::load(&config_path)
        .await
        .expect_err("zero workers should be rejected");
    assert!(err.to_string().contains("worker_count"));
}

#[tokio::test]
async fn test_config_show_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("absent.toml");

    let config = CertpostConfig::load_or_default(&config_path)
        .await
        .expect("missing file should fall back to defaults");
    let report = build_config_report(&config, &config_path, Some("scan"))
        .ok()
        .expect("scan section should render");

    assert!(report.config_toml.contains("max_files = 5000"));
    assert!(report.source.ends_with("absent.toml"));
}

#[test]
fn test_config_show_full_contains_all_sections() {
    let report = build_config_report(&CertpostConfig::default(), Path::new("certpost.toml"), None)
        .ok()
        .expect("full config should render");

    for section in ["[general]", "[scan]", "[report]"] {
        assert!(report.config_toml.contains(section), "missing {section}");
    }
}
