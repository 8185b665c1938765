//! 인증서 스캐너 설정
//!
//! [`ScannerConfig`]는 core의 [`ScanConfig`](certpost_core::config::ScanConfig)에서
//! 파생되며, CLI 인자로 개별 값을 덮어쓸 수 있도록 빌더를 제공합니다.
//!
//! # 사용 예시
//!
//! ```
//! use certpost_scanner::ScannerConfig;
//!
//! // 기본값으로 생성
//! let config = ScannerConfig::default();
//! config.validate().unwrap();
//!
//! // 빌더로 생성
//! use certpost_scanner::ScannerConfigBuilder;
//!
//! let config = ScannerConfigBuilder::new()
//!     .worker_count(8)
//!     .max_files(100)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};

use certpost_core::config::{MAX_FILES_LIMIT, MAX_READ_BUFFER_SIZE, MAX_WORKER_COUNT};

use crate::error::ScannerError;

/// 인증서 스캐너 설정
///
/// # 필드
///
/// - **max_files**: 탐색할 최대 파일 수 (도달 시 탐색 중단)
/// - **worker_count**: 동시 파싱 워커 수
/// - **read_buffer_size**: 파일 읽기 버퍼 크기. 의미에는 영향 없음
/// - **extensions**: 인증서 파일 확장자 (대소문자 구분 없음)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// 최대 탐색 파일 수
    pub max_files: usize,
    /// 동시 파싱 워커 수
    pub worker_count: usize,
    /// 파일 읽기 버퍼 크기 (바이트)
    pub read_buffer_size: usize,
    /// 인증서 파일 확장자 (점 없이)
    pub extensions: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_files: 5000,
            worker_count: 4,
            read_buffer_size: 1024 * 1024, // 1 MiB
            extensions: vec!["cer".to_owned()],
        }
    }
}

impl ScannerConfig {
    /// core의 `ScanConfig`에서 스캐너 설정을 생성합니다.
    pub fn from_core(core: &certpost_core::config::ScanConfig) -> Self {
        Self {
            max_files: core.max_files,
            worker_count: core.worker_count,
            read_buffer_size: core.read_buffer_size,
            extensions: core.extensions.clone(),
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `max_files`: 1-1000000
    /// - `worker_count`: 1-256
    /// - `read_buffer_size`: 1-67108864 (64 MiB)
    /// - `extensions`: 하나 이상, 빈 문자열이나 경로 구분자 불가
    pub fn validate(&self) -> Result<(), ScannerError> {
        if self.max_files == 0 || self.max_files > MAX_FILES_LIMIT {
            return Err(ScannerError::Config {
                field: "max_files".to_owned(),
                reason: format!("must be 1-{MAX_FILES_LIMIT}"),
            });
        }

        if self.worker_count == 0 || self.worker_count > MAX_WORKER_COUNT {
            return Err(ScannerError::Config {
                field: "worker_count".to_owned(),
                reason: format!("must be 1-{MAX_WORKER_COUNT}"),
            });
        }

        if self.read_buffer_size == 0 || self.read_buffer_size > MAX_READ_BUFFER_SIZE {
            return Err(ScannerError::Config {
                field: "read_buffer_size".to_owned(),
                reason: format!("must be 1-{MAX_READ_BUFFER_SIZE}"),
            });
        }

        if self.extensions.is_empty() {
            return Err(ScannerError::Config {
                field: "extensions".to_owned(),
                reason: "at least one extension required".to_owned(),
            });
        }

        for ext in &self.extensions {
            let trimmed = ext.trim().trim_start_matches('.');
            if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
                return Err(ScannerError::Config {
                    field: "extensions".to_owned(),
                    reason: format!("invalid extension '{ext}'"),
                });
            }
        }

        Ok(())
    }

    /// 비교용으로 정규화한 확장자 목록 (소문자, 선행 점 제거)
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .collect()
    }
}

/// [`ScannerConfig`] 빌더
///
/// 유연한 설정 구성 및 빌드 시 유효성 검증을 제공합니다.
#[derive(Default)]
pub struct ScannerConfigBuilder {
    config: ScannerConfig,
}

impl ScannerConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 시작하는 빌더를 생성합니다.
    pub fn from_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// 최대 탐색 파일 수를 설정합니다.
    pub fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    /// 워커 수를 설정합니다.
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    /// 읽기 버퍼 크기를 설정합니다.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// 확장자 목록을 설정합니다.
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.extensions = extensions;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ScannerError::Config` 반환
    pub fn build(self) -> Result<ScannerConfig, ScannerError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
