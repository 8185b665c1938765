//! 병렬 추출 디스패처
//!
//! 경로 목록을 고정 크기 워커 풀에 분배하고 완료되는 순서대로 결과를 모읍니다.
//!
//! # 내부 구조
//!
//! ```text
//! paths --> job queue (mpsc<usize>) --> worker x N --> spawn_blocking(read + extract)
//!                                                            |
//!                         coordinator <-- mpsc<(usize, ParseOutcome)>
//!                              |
//!                       ProgressSink (processing 이벤트)
//! ```
//!
//! 각 워커는 큐가 빌 때까지 작업을 하나씩 꺼내 처리합니다.
//! 동시에 실행되는 추출은 워커 수를 넘지 않습니다.
//!
//! 입력 경로 하나당 정확히 하나의 [`ParseOutcome`]이 만들어집니다.
//! 추출기가 panic을 일으키거나 워커가 결과 없이 종료하더라도
//! 해당 경로는 [`ExtractionError::Fault`] 실패로 기록됩니다.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinError;
use tracing::{debug, trace, warn};

use certpost_core::metrics as m;
use certpost_core::pipeline::ProgressSink;
use certpost_core::types::{CertificateRecord, ProgressEvent};

use crate::config::ScannerConfig;
use crate::error::ExtractionError;
use crate::extractor::{CertificateExtractor, read_file};

/// 파일 한 건의 처리 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// 추출 성공
    Success(CertificateRecord),
    /// 추출 실패
    Failure(FileFailure),
}

impl ParseOutcome {
    /// 성공 여부를 반환합니다.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// 원본 파일 경로를 반환합니다.
    pub fn source_path(&self) -> &str {
        match self {
            Self::Success(record) => &record.source_path,
            Self::Failure(failure) => &failure.path,
        }
    }
}

/// 실패한 파일과 그 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// 파일 경로
    pub path: String,
    /// 실패 사유
    pub error: ExtractionError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.error)
    }
}

/// 병렬 추출 디스패처
pub struct WorkDispatcher {
    extractor: Arc<dyn CertificateExtractor>,
    worker_count: usize,
    read_buffer_size: usize,
}

impl WorkDispatcher {
    /// 디스패처를 생성합니다. 0 값은 1로 보정합니다.
    pub fn new(
        extractor: Arc<dyn CertificateExtractor>,
        worker_count: usize,
        read_buffer_size: usize,
    ) -> Self {
        Self {
            extractor,
            worker_count: worker_count.max(1),
            read_buffer_size: read_buffer_size.max(1),
        }
    }

    /// 스캐너 설정으로 디스패처를 생성합니다.
    pub fn from_config(extractor: Arc<dyn CertificateExtractor>, config: &ScannerConfig) -> Self {
        Self::new(extractor, config.worker_count, config.read_buffer_size)
    }

    /// 워커 수를 반환합니다.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 모든 경로를 처리하고 완료 순서대로 결과를 반환합니다.
    ///
    /// 결과 길이는 항상 `paths.len()`과 같습니다. 파일 단위 실패는
    /// 배치를 중단시키지 않습니다.
    ///
    /// 완료될 때마다 sink가 활성 상태이면 `Processing` 이벤트를 보냅니다.
    pub async fn dispatch(
        &self,
        paths: Vec<PathBuf>,
        sink: Arc<dyn ProgressSink>,
    ) -> Vec<ParseOutcome> {
        let total = paths.len();
        if total == 0 {
            return Vec::new();
        }

        let paths = Arc::new(paths);

        // 작업 큐: 모든 인덱스를 미리 넣고 송신자를 닫음
        let (job_tx, job_rx) = mpsc::channel::<usize>(total);
        for idx in 0..total {
            if let Err(e) = job_tx.try_send(idx) {
                warn!(index = idx, error = %e, "failed to enqueue job");
            }
        }
        drop(job_tx);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let (result_tx, mut result_rx) =
            mpsc::channel::<(usize, ParseOutcome)>(self.worker_count * 2);

        let workers = self.worker_count.min(total);
        debug!(files = total, workers, "dispatching extraction jobs");

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let paths = Arc::clone(&paths);
            let extractor = Arc::clone(&self.extractor);
            let buffer_size = self.read_buffer_size;

            handles.push(tokio::spawn(async move {
                loop {
                    let next = jobs.lock().await.recv().await;
                    let Some(idx) = next else {
                        break;
                    };

                    let outcome =
                        extract_one(Arc::clone(&extractor), paths[idx].clone(), buffer_size)
                            .await;

                    if results.send((idx, outcome)).await.is_err() {
                        warn!(worker_id, "result channel closed, worker exiting");
                        break;
                    }
                }
                trace!(worker_id, "worker finished");
            }));
        }
        drop(result_tx);

        let mut outcomes = Vec::with_capacity(total);
        let mut seen = vec![false; total];

        while let Some((idx, outcome)) = result_rx.recv().await {
            seen[idx] = true;
            record_outcome(&outcome);
            outcomes.push(outcome);
            notify_processing(sink.as_ref(), paths[idx].display().to_string(), outcomes.len(), total);
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task failed");
            }
        }

        // 결과 없이 끝난 경로는 Fault로 채움
        for (idx, done) in seen.iter().enumerate() {
            if *done {
                continue;
            }
            let path = paths[idx].display().to_string();
            let outcome = ParseOutcome::Failure(FileFailure {
                path: path.clone(),
                error: ExtractionError::Fault(
                    "worker terminated before producing an outcome".to_owned(),
                ),
            });
            record_outcome(&outcome);
            outcomes.push(outcome);
            notify_processing(sink.as_ref(), path, outcomes.len(), total);
        }

        outcomes
    }
}

/// 파일 하나를 blocking 스레드에서 읽고 추출합니다.
async fn extract_one(
    extractor: Arc<dyn CertificateExtractor>,
    path: PathBuf,
    buffer_size: usize,
) -> ParseOutcome {
    let source = path.display().to_string();
    let task_source = source.clone();

    let result = tokio::task::spawn_blocking(move || {
        let raw = read_file(&path, buffer_size)?;
        extractor.extract(&raw, &task_source)
    })
    .await;

    match result {
        Ok(Ok(record)) => ParseOutcome::Success(record),
        Ok(Err(error)) => ParseOutcome::Failure(FileFailure {
            path: source,
            error,
        }),
        Err(join_err) => ParseOutcome::Failure(FileFailure {
            path: source,
            error: ExtractionError::Fault(panic_message(join_err)),
        }),
    }
}

/// JoinError에서 사람이 읽을 수 있는 메시지를 꺼냅니다.
fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("extractor panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("extractor panicked: {msg}")
    } else {
        "extractor panicked".to_owned()
    }
}

fn record_outcome(outcome: &ParseOutcome) {
    match outcome {
        ParseOutcome::Success(_) => {
            metrics::counter!(m::SCANNER_FILES_PROCESSED_TOTAL, m::LABEL_RESULT => m::RESULT_SUCCESS)
                .increment(1);
        }
        ParseOutcome::Failure(failure) => {
            warn!(path = %failure.path, error = %failure.error, "failed to extract certificate");
            metrics::counter!(m::SCANNER_FILES_PROCESSED_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE)
                .increment(1);
        }
    }
}

fn notify_processing(sink: &dyn ProgressSink, path: String, completed: usize, total: usize) {
    if sink.is_active() {
        sink.notify(ProgressEvent::processing(path, completed, total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgressSink;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex as StdMutex;

    /// 파일 내용을 그대로 이름으로 쓰는 가짜 추출기
    struct EchoExtractor;

    impl CertificateExtractor for EchoExtractor {
        fn format_name(&self) -> &str {
            "echo"
        }

        fn extract(
            &self,
            raw: &[u8],
            source_path: &str,
        ) -> Result<CertificateRecord, ExtractionError> {
            let text = String::from_utf8_lossy(raw).to_string();
            if text == "bad" {
                return Err(ExtractionError::Decode("bad content".to_owned()));
            }
            if text == "boom" {
                panic!("boom");
            }
            Ok(CertificateRecord {
                full_name: text,
                not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                not_after: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                serial_number: "1".to_owned(),
                source_path: source_path.to_owned(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: StdMutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn notify(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn dispatcher(workers: usize) -> WorkDispatcher {
        WorkDispatcher::new(Arc::new(EchoExtractor), workers, 4096)
    }

    fn write_files(dir: &std::path::Path, contents: &[&str]) -> Vec<PathBuf> {
        contents
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let path = dir.join(format!("{i}.cer"));
                std::fs::write(&path, c).unwrap();
                path
            })
            .collect()
    }

    #[tokio::test]
    async fn empty_input_yields_no_outcomes() {
        let outcomes = dispatcher(4)
            .dispatch(Vec::new(), Arc::new(NullProgressSink))
            .await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn one_outcome_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(dir.path(), &["a", "b", "c", "d", "e"]);

        let outcomes = dispatcher(2)
            .dispatch(paths.clone(), Arc::new(NullProgressSink))
            .await;
        assert_eq!(outcomes.len(), 5);

        let mut seen: Vec<&str> = outcomes.iter().map(|o| o.source_path()).collect();
        seen.sort_unstable();
        let mut expected: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn failures_do_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(dir.path(), &["ok", "bad", "fine"]);

        let outcomes = dispatcher(4)
            .dispatch(paths, Arc::new(NullProgressSink))
            .await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes.iter().filter(|o| o.is_success()).count(), 2);
    }

    #[tokio::test]
    async fn panic_becomes_fault() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(dir.path(), &["ok", "boom"]);

        let outcomes = dispatcher(2)
            .dispatch(paths, Arc::new(NullProgressSink))
            .await;
        assert_eq!(outcomes.len(), 2);

        let fault = outcomes
            .iter()
            .find_map(|o| match o {
                ParseOutcome::Failure(f) => Some(f),
                ParseOutcome::Success(_) => None,
            })
            .unwrap();
        match &fault.error {
            ExtractionError::Fault(msg) => assert!(msg.contains("boom")),
            other => panic!("expected Fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes = dispatcher(1)
            .dispatch(
                vec![dir.path().join("gone.cer")],
                Arc::new(NullProgressSink),
            )
            .await;
        assert!(matches!(
            &outcomes[0],
            ParseOutcome::Failure(FileFailure {
                error: ExtractionError::Read(_),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn processing_events_count_up_to_total() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(dir.path(), &["a", "bad", "c", "d"]);
        let sink = Arc::new(RecordingSink::default());

        dispatcher(3).dispatch(paths, sink.clone()).await;

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 4);
        let counts: Vec<usize> = events.iter().map(|e| e.completed_count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert!(events.iter().all(|e| e.total_count == 4));
    }

    #[test]
    fn failure_display_includes_path_and_reason() {
        let failure = FileFailure {
            path: "/certs/b.cer".to_owned(),
            error: ExtractionError::Decode("truncated".to_owned()),
        };
        assert_eq!(failure.to_string(), "/certs/b.cer: decode failed: truncated");
    }

    #[test]
    fn zero_workers_are_clamped() {
        assert_eq!(dispatcher(0).worker_count(), 1);
    }

    #[test]
    fn from_config_uses_worker_count() {
        let config = ScannerConfig {
            worker_count: 7,
            ..Default::default()
        };
        let d = WorkDispatcher::from_config(Arc::new(EchoExtractor), &config);
        assert_eq!(d.worker_count(), 7);
    }
}
