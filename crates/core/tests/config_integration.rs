//! certpost.toml 통합 설정 테스트
//!
//! - certpost.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 파일 로딩 / 기본값 폴백 테스트
//! - 환경변수 우선순위 테스트

use certpost_core::config::CertpostConfig;
use certpost_core::error::{CertpostError, ConfigError};

// =============================================================================
// certpost.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../certpost.toml.example");
    let config = CertpostConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.scan.max_files, 5000);
    assert_eq!(config.scan.worker_count, 4);
    assert_eq!(config.scan.read_buffer_size, 1_048_576);
    assert_eq!(config.scan.extensions, vec!["cer"]);
    assert_eq!(config.report.date_format, "%d.%m.%Y %H:%M:%S");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../certpost.toml.example");
    let config = CertpostConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn report_section_only_keeps_scan_defaults() {
    let toml = r#"
[report]
date_format = "%Y-%m-%d %H:%M"
"#;
    let config = CertpostConfig::parse(toml).expect("should parse");
    assert_eq!(config.report.date_format, "%Y-%m-%d %H:%M");
    assert_eq!(config.report.default_file_name, "report.xlsx");
    assert_eq!(config.scan.worker_count, 4);
}

#[test]
fn unknown_fields_are_ignored() {
    let toml = r#"
[scan]
worker_count = 2
legacy_field = true
"#;
    let config = CertpostConfig::parse(toml).expect("unknown fields should be ignored");
    assert_eq!(config.scan.worker_count, 2);
}

#[test]
fn wrong_type_fails_to_parse() {
    let toml = r#"
[scan]
worker_count = "four"
"#;
    let err = CertpostConfig::parse(toml).unwrap_err();
    assert!(matches!(
        err,
        CertpostError::Config(ConfigError::ParseFailed { .. })
    ));
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
async fn load_missing_file_returns_file_not_found() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("missing.toml");

    let err = CertpostConfig::load(&path).await.unwrap_err();
    assert!(matches!(
        err,
        CertpostError::Config(ConfigError::FileNotFound { .. })
    ));
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_falls_back_when_missing() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("missing.toml");

    let config = CertpostConfig::load_or_default(&path)
        .await
        .expect("missing file should fall back to defaults");
    assert_eq!(config.scan.max_files, 5000);
}

#[tokio::test]
#[serial_test::serial]
async fn load_or_default_still_rejects_invalid_file() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("certpost.toml");
    std::fs::write(&path, "[scan]\nworker_count = 0\n").expect("should write config");

    let err = CertpostConfig::load_or_default(&path).await.unwrap_err();
    assert!(err.to_string().contains("scan.worker_count"));
}

#[tokio::test]
#[serial_test::serial]
async fn load_valid_file() {
    let temp_dir = tempfile::tempdir().expect("should create temp dir");
    let path = temp_dir.path().join("certpost.toml");
    std::fs::write(&path, "[scan]\nmax_files = 10\nworker_count = 2\n")
        .expect("should write config");

    let config = CertpostConfig::load(&path).await.expect("should load");
    assert_eq!(config.scan.max_files, 10);
    assert_eq!(config.scan.worker_count, 2);
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[scan]
worker_count = 2
"#;

    let original = std::env::var("CERTPOST_SCAN_WORKER_COUNT").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("CERTPOST_SCAN_WORKER_COUNT", "16");
    }

    let mut config = CertpostConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.scan.worker_count;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("CERTPOST_SCAN_WORKER_COUNT", val),
            None => std::env::remove_var("CERTPOST_SCAN_WORKER_COUNT"),
        }
    }

    assert_eq!(result, 16);
}

#[test]
#[serial_test::serial]
fn env_override_log_format() {
    let original = std::env::var("CERTPOST_GENERAL_LOG_FORMAT").ok();
    // SAFETY: serial 테스트로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("CERTPOST_GENERAL_LOG_FORMAT", "json");
    }

    let mut config = CertpostConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.general.log_format.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("CERTPOST_GENERAL_LOG_FORMAT", val),
            None => std::env::remove_var("CERTPOST_GENERAL_LOG_FORMAT"),
        }
    }

    assert_eq!(result, "json");
}
