//! 인증서 스캐너 에러 타입
//!
//! 두 계층으로 나뉩니다.
//!
//! - [`ExtractionError`]: 파일 한 건의 추출 실패. 배치 안에서 복구되며
//!   [`ParseOutcome::Failure`](crate::dispatcher::ParseOutcome)로 남습니다.
//! - [`ScannerError`]: 배치 전체에 영향을 주는 에러. `From<ScannerError> for CertpostError`
//!   구현을 통해 `?` 연산자로 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **탐색**: `Discovery` (루트 없음 / 읽기 불가)
//! - **결과 없음**: `EmptyDiscovery`, `EmptyResult`
//! - **리포트**: `Report`
//! - **설정**: `Config`
//! - **런타임**: `Channel`

use certpost_core::error::{
    CertpostError, ConfigError, DiscoveryError, ReportError, ScanError,
};

/// 파일 단위 추출 실패
///
/// 사람이 읽을 수 있는 설명을 담으며, 진단 목록에 그대로 표시됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// 파일 읽기 실패 (권한, I/O)
    #[error("read failed: {0}")]
    Read(String),

    /// DER 디코딩 실패 (손상, 잘린 파일, 다른 인코딩)
    #[error("decode failed: {0}")]
    Decode(String),

    /// 유효기간 시각 파싱 실패
    #[error("invalid {field} timestamp '{value}': {reason}")]
    Timestamp {
        /// 필드 이름 (`not_before` / `not_after`)
        field: &'static str,
        /// 원본 값
        value: String,
        /// 실패 사유
        reason: String,
    },

    /// 추출기 실행 중 예기치 못한 중단
    #[error("extractor fault: {0}")]
    Fault(String),
}

/// 인증서 스캐너 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// 루트 디렉토리 탐색 실패
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// 조건에 맞는 파일이 하나도 없음
    #[error("no matching files found under {root}")]
    EmptyDiscovery {
        /// 탐색 루트
        root: String,
    },

    /// 파일은 있었지만 파싱에 성공한 인증서가 없음
    #[error("no certificates parsed ({failed} files failed)")]
    EmptyResult {
        /// 실패한 파일 수
        failed: usize,
    },

    /// 리포트 저장 실패
    #[error("report error: {path}: {reason}")]
    Report {
        /// 대상 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 태스크 / 채널 에러
    #[error("channel error: {0}")]
    Channel(String),
}

impl From<ScannerError> for CertpostError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::Discovery(e) => CertpostError::Discovery(e),
            ScannerError::EmptyDiscovery { root } => {
                CertpostError::Scan(ScanError::EmptyDiscovery { root })
            }
            ScannerError::EmptyResult { failed } => {
                CertpostError::Scan(ScanError::EmptyResult { failed })
            }
            ScannerError::Report { path, reason } => {
                CertpostError::Report(ReportError::WriteFailed { path, reason })
            }
            ScannerError::Config { field, reason } => {
                CertpostError::Config(ConfigError::InvalidValue { field, reason })
            }
            ScannerError::Channel(msg) => CertpostError::Io(std::io::Error::other(msg)),
        }
    }
}
