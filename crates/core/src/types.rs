//! 도메인 타입 - 시스템 전역에서 사용되는 공통 타입
//!
//! 인증서 레코드와 진행 이벤트처럼 스캐너, CLI, 리포트 작성기가 함께 쓰는
//! 데이터 구조를 정의합니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 인증서 한 건에서 추출한 메타데이터
///
/// 추출기가 파싱에 성공했을 때만 생성되며 이후 변경되지 않습니다.
/// 서명 검증이나 체인 검증 결과는 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// subject 이름 필드를 고정 순서로 이어 붙인 값
    pub full_name: String,
    /// 유효기간 시작 (UTC)
    pub not_before: DateTime<Utc>,
    /// 유효기간 종료 (UTC)
    pub not_after: DateTime<Utc>,
    /// 일련번호 (대문자 16진수, 고정 폭 없음)
    pub serial_number: String,
    /// 원본 파일 경로
    pub source_path: String,
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} serial={} valid={}..{} ({})",
            self.full_name,
            self.serial_number,
            self.not_before.format("%Y-%m-%d"),
            self.not_after.format("%Y-%m-%d"),
            self.source_path,
        )
    }
}

/// 진행 이벤트 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressKind {
    /// 디렉토리 탐색 중
    Scanning,
    /// 파일 파싱 중
    Processing,
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scanning => write!(f, "scanning"),
            Self::Processing => write!(f, "processing"),
        }
    }
}

/// 진행 상황 이벤트
///
/// 일회성 상태 알림이며 저장되지 않습니다. 소비자가 없거나 닫혀 있어도
/// 스캔 결과에는 영향을 주지 않습니다.
///
/// `Scanning` 이벤트의 `completed_count`는 지금까지 찾은 파일 수이고,
/// 전체 수를 아직 알 수 없으므로 `total_count`는 0입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// 이벤트 종류
    pub kind: ProgressKind,
    /// 방금 탐색한 디렉토리 또는 방금 처리한 파일 경로
    pub current_path: String,
    /// 완료된 항목 수
    pub completed_count: usize,
    /// 전체 항목 수 (모를 경우 0)
    pub total_count: usize,
}

impl ProgressEvent {
    /// 디렉토리 목록 조회 완료 이벤트를 생성합니다.
    pub fn scanning(directory: impl Into<String>, matched: usize) -> Self {
        Self {
            kind: ProgressKind::Scanning,
            current_path: directory.into(),
            completed_count: matched,
            total_count: 0,
        }
    }

    /// 파일 처리 완료 이벤트를 생성합니다.
    pub fn processing(path: impl Into<String>, completed: usize, total: usize) -> Self {
        Self {
            kind: ProgressKind::Processing,
            current_path: path.into(),
            completed_count: completed,
            total_count: total,
        }
    }

    /// 진행률(0-100)을 반환합니다. 전체 수를 모르면 `None`.
    pub fn percent(&self) -> Option<u8> {
        if self.total_count == 0 {
            return None;
        }
        let pct = self.completed_count.min(self.total_count) * 100 / self.total_count;
        u8::try_from(pct).ok()
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ProgressKind::Scanning => write!(
                f,
                "[scanning] {} ({} found)",
                self.current_path, self.completed_count
            ),
            ProgressKind::Processing => write!(
                f,
                "[processing] {}/{} {}",
                self.completed_count, self.total_count, self.current_path
            ),
        }
    }
}

/// 사용자 메시지 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// 안내
    Info,
    /// 경고
    Warning,
    /// 오류
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}
