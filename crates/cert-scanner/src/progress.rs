//! 진행 이벤트 sink 구현
//!
//! - [`NullProgressSink`]: 이벤트를 모두 버립니다 (`--no-progress`, 테스트).
//! - [`ChannelProgressSink`]: tokio mpsc 채널로 이벤트를 전달합니다.
//!   채널이 가득 차면 이벤트를 버리고, 수신자가 닫히면 비활성 상태가 됩니다.
//!
//! 어느 쪽이든 스캔 흐름을 막거나 실패시키지 않습니다.

use tokio::sync::mpsc;
use tracing::trace;

use certpost_core::pipeline::ProgressSink;
use certpost_core::types::ProgressEvent;

/// 아무것도 하지 않는 sink
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn is_active(&self) -> bool {
        false
    }

    fn notify(&self, _event: ProgressEvent) {}
}

/// mpsc 채널 기반 sink
///
/// # 사용 예시
///
/// ```ignore
/// let (sink, mut rx) = ChannelProgressSink::new(256);
/// tokio::spawn(async move {
///     while let Some(event) = rx.recv().await {
///         println!("{event}");
///     }
/// });
/// scanner.scan(root, Arc::new(sink)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelProgressSink {
    /// 지정한 용량의 채널과 함께 sink를 생성합니다.
    ///
    /// 용량이 0이면 1로 보정합니다.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// 기존 송신자로 sink를 생성합니다.
    pub fn from_sender(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn is_active(&self) -> bool {
        !self.tx.is_closed()
    }

    fn notify(&self, event: ProgressEvent) {
        if let Err(e) = self.tx.try_send(event) {
            trace!(error = %e, "progress event dropped");
        }
    }
}
