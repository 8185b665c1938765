//! 에러 타입 - 도메인별 에러 정의
//!
//! 파일 단위 추출 실패는 여기에 없습니다. 추출 실패는 배치 안에서 복구되어
//! 진단 목록으로만 남고, 최상위 에러로 전파되지 않습니다.

/// certpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CertpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 디렉토리 탐색 에러 (배치 전체에 치명적)
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// 스캔 결과 에러 (파일 없음 / 파싱 성공 없음)
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// 리포트 저장 에러
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 루트 디렉토리 탐색 에러
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// 루트 디렉토리가 존재하지 않음
    #[error("root directory not found: {path}")]
    RootNotFound { path: String },

    /// 루트 경로가 디렉토리가 아님
    #[error("root path is not a directory: {path}")]
    NotADirectory { path: String },

    /// 루트 디렉토리를 읽을 수 없음
    #[error("root directory unreadable: {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// 스캔 결과 에러
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// 조건에 맞는 파일이 하나도 없음
    #[error("no matching files found under {root}")]
    EmptyDiscovery { root: String },

    /// 파일은 있었지만 파싱에 성공한 인증서가 없음
    #[error("no certificates parsed ({failed} files failed)")]
    EmptyResult { failed: usize },
}

/// 리포트 저장 에러
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// 빈 레코드 목록으로 리포트 작성을 요청함
    #[error("refusing to write an empty report: {path}")]
    EmptyCollection { path: String },

    /// 리포트 파일 쓰기 실패
    #[error("failed to write report {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}
