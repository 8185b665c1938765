//! 협력자 trait - 코어가 의존하는 외부 경계 정의
//!
//! 디렉토리 선택, 진행 표시, 리포트 저장은 모두 주입되는 trait 객체입니다.
//! 코어는 구체적인 UI 툴킷이나 스프레드시트 라이브러리를 알지 못하므로
//! 테스트에서는 가짜 구현으로 대체할 수 있습니다.

use std::path::{Path, PathBuf};

use crate::error::CertpostError;
use crate::types::{CertificateRecord, MessageKind, ProgressEvent};

/// 진행 이벤트 소비자
///
/// 0번 이상 호출될 수 있으며, 스캔 결과의 정확성에 필요하지 않습니다.
/// 구현은 실패하더라도 호출자에게 에러를 돌려주지 않아야 합니다.
pub trait ProgressSink: Send + Sync {
    /// 이벤트를 받을 수 있는 상태인지 반환합니다.
    ///
    /// 닫힌 sink에 대한 `notify` 호출은 생략됩니다.
    fn is_active(&self) -> bool {
        true
    }

    /// 진행 이벤트를 전달합니다.
    fn notify(&self, event: ProgressEvent);
}

/// 리포트 작성기
///
/// 레코드 한 건당 한 행을 다음 열 순서로 기록합니다:
/// `full_name`, `not_before`, `not_after`, `serial_number`, `source_path`.
///
/// 호출자는 비어 있지 않은 레코드 목록만 전달합니다.
pub trait ReportWriter: Send + Sync {
    /// 리포트 형식 이름 (로그용)
    fn format_name(&self) -> &str;

    /// 대상 경로에 강제할 파일 확장자 (예: `"xlsx"`)
    fn file_extension(&self) -> Option<&str> {
        None
    }

    /// 레코드 목록을 대상 경로에 기록합니다.
    fn write_report(
        &self,
        records: &[CertificateRecord],
        destination: &Path,
    ) -> Result<(), CertpostError>;
}

/// 사용자 상호작용 협력자
///
/// 루트 디렉토리와 저장 경로를 공급하고 사용자에게 메시지를 표시합니다.
/// `None`은 사용자가 선택을 취소했음을 뜻합니다.
pub trait Interaction: Send + Sync {
    /// 인증서를 찾을 루트 디렉토리를 선택합니다.
    fn select_directory(&self) -> Option<PathBuf>;

    /// 리포트를 저장할 경로를 선택합니다.
    fn select_destination(&self) -> Option<PathBuf>;

    /// 사용자에게 메시지를 표시합니다.
    fn show_message(&self, kind: MessageKind, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CountingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for CountingSink {
        fn notify(&self, event: ProgressEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
        }
    }

    #[test]
    fn progress_sink_is_active_by_default() {
        let sink = CountingSink {
            events: Mutex::new(Vec::new()),
        };
        assert!(sink.is_active());
        sink.notify(ProgressEvent::scanning("/certs", 0));
        assert_eq!(sink.events.lock().unwrap().len(), 1);
    }

    #[test]
    fn traits_are_object_safe() {
        fn assert_object<T: ?Sized>() {}
        assert_object::<dyn ProgressSink>();
        assert_object::<dyn ReportWriter>();
        assert_object::<dyn Interaction>();
    }
}
