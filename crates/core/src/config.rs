//! 설정 관리 - certpost.toml 파싱 및 런타임 설정
//!
//! [`CertpostConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CERTPOST_SCAN_WORKER_COUNT=8` 형식)
//! 3. 설정 파일 (`certpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), certpost_core::error::CertpostError> {
//! use certpost_core::config::CertpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CertpostConfig::load("certpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CertpostConfig::parse("[scan]\nworker_count = 8")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CertpostError, ConfigError};

/// 워커 수 상한
pub const MAX_WORKER_COUNT: usize = 256;

/// 수집 파일 수 상한
pub const MAX_FILES_LIMIT: usize = 1_000_000;

/// 읽기 버퍼 크기 상한 (64 MiB)
pub const MAX_READ_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// certpost 통합 설정
///
/// `certpost.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 스캔 설정
    #[serde(default)]
    pub scan: ScanConfig,
    /// 리포트 설정
    #[serde(default)]
    pub report: ReportConfig,
}

impl CertpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CertpostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값으로 시작하는 [`load`](Self::load)입니다.
    ///
    /// 파일이 존재하지만 파싱에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, CertpostError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(CertpostError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = %path.display(), "config file not found, using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CertpostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CertpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CertpostError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CertpostError> {
        toml::from_str(toml_str).map_err(|e| {
            CertpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CERTPOST_{SECTION}_{FIELD}`
    /// 예: `CERTPOST_SCAN_MAX_FILES=10000`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "CERTPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CERTPOST_GENERAL_LOG_FORMAT");

        // Scan
        override_usize(&mut self.scan.max_files, "CERTPOST_SCAN_MAX_FILES");
        override_usize(&mut self.scan.worker_count, "CERTPOST_SCAN_WORKER_COUNT");
        override_usize(
            &mut self.scan.read_buffer_size,
            "CERTPOST_SCAN_READ_BUFFER_SIZE",
        );
        override_csv(&mut self.scan.extensions, "CERTPOST_SCAN_EXTENSIONS");

        // Report
        override_string(&mut self.report.date_format, "CERTPOST_REPORT_DATE_FORMAT");
        override_string(
            &mut self.report.default_file_name,
            "CERTPOST_REPORT_DEFAULT_FILE_NAME",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), CertpostError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.scan.max_files == 0 || self.scan.max_files > MAX_FILES_LIMIT {
            return Err(invalid(
                "scan.max_files",
                format!("must be 1-{MAX_FILES_LIMIT}"),
            ));
        }

        if self.scan.worker_count == 0 || self.scan.worker_count > MAX_WORKER_COUNT {
            return Err(invalid(
                "scan.worker_count",
                format!("must be 1-{MAX_WORKER_COUNT}"),
            ));
        }

        if self.scan.read_buffer_size == 0 || self.scan.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(invalid(
                "scan.read_buffer_size",
                format!("must be 1-{MAX_READ_BUFFER_SIZE}"),
            ));
        }

        if self.scan.extensions.is_empty()
            || self.scan.extensions.iter().any(|ext| ext.trim().is_empty())
        {
            return Err(invalid(
                "scan.extensions",
                "at least one non-empty extension required".to_owned(),
            ));
        }

        if self.report.date_format.is_empty() {
            return Err(invalid(
                "report.date_format",
                "must not be empty".to_owned(),
            ));
        }

        if StrftimeItems::new(&self.report.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid(
                "report.date_format",
                format!("invalid strftime pattern '{}'", self.report.date_format),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> CertpostError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 스캔 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 최대 탐색 파일 수. 도달하면 탐색을 즉시 멈춥니다.
    pub max_files: usize,
    /// 동시 파싱 워커 수
    pub worker_count: usize,
    /// 파일 읽기 버퍼 크기 (바이트). I/O 효율에만 영향을 줍니다.
    pub read_buffer_size: usize,
    /// 인증서 파일 확장자 (대소문자 구분 없음, 점 없이)
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_files: 5000,
            worker_count: 4,
            read_buffer_size: 1024 * 1024, // 1 MiB
            extensions: vec!["cer".to_owned()],
        }
    }
}

/// 리포트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 날짜 열 형식 (chrono strftime)
    pub date_format: String,
    /// 저장 경로를 묻을 때 제안하는 파일 이름
    pub default_file_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            date_format: "%d.%m.%Y %H:%M:%S".to_owned(),
            default_file_name: "report.xlsx".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
