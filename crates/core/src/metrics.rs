//! 메트릭 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 스캐너는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. recorder가 설치되지 않으면 호출은 no-op입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `certpost_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(certpost_core::metrics::SCANNER_FILES_DISCOVERED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 결과 레이블 값: 성공
pub const RESULT_SUCCESS: &str = "success";

/// 결과 레이블 값: 실패
pub const RESULT_FAILURE: &str = "failure";

// ─── Scanner 메트릭 ────────────────────────────────────────────────

/// Scanner: 탐색한 디렉토리 수 (counter)
pub const SCANNER_DIRECTORIES_SCANNED_TOTAL: &str = "certpost_scanner_directories_scanned_total";

/// Scanner: 발견한 인증서 파일 수 (counter)
pub const SCANNER_FILES_DISCOVERED_TOTAL: &str = "certpost_scanner_files_discovered_total";

/// Scanner: 처리한 파일 수 (counter, label: result)
pub const SCANNER_FILES_PROCESSED_TOTAL: &str = "certpost_scanner_files_processed_total";

/// Scanner: 전체 스캔 소요 시간 (histogram, 초)
pub const SCANNER_SCAN_DURATION_SECONDS: &str = "certpost_scanner_scan_duration_seconds";

// ─── Report 메트릭 ─────────────────────────────────────────────────

/// Report: 기록된 리포트 행 수 (counter)
pub const REPORT_ROWS_WRITTEN_TOTAL: &str = "certpost_report_rows_written_total";
