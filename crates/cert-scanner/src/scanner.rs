//! 인증서 스캐너 오케스트레이터 -- 전체 스캔 흐름 관리
//!
//! # 내부 아키텍처
//!
//! ```text
//! Interaction --> root, destination
//!                   |
//!                   v
//!            FileDiscoverer --(Vec<PathBuf>)--> WorkDispatcher --(ParseOutcome)--> ResultAggregator
//!                   |                                 |                                  |
//!                   +------ ProgressSink <------------+                             ScanSummary
//!                                                                                        |
//!                                                                                  ReportWriter
//! ```
//!
//! [`CertScanner::scan`]은 탐색부터 집계까지를 수행하고, [`CertScanner::run_session`]은
//! 여기에 디렉토리/저장 경로 선택, 리포트 저장, 사용자 메시지를 더한 전체 흐름입니다.
//!
//! 리포트 저장에 실패해도 [`ScanSummary`]는 유지되므로 재탐색이나 재파싱 없이
//! [`ScanSummary::write_report`]로 다시 시도할 수 있습니다.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use certpost_core::error::{CertpostError, ReportError};
use certpost_core::metrics as m;
use certpost_core::pipeline::{Interaction, ProgressSink, ReportWriter};
use certpost_core::types::{CertificateRecord, MessageKind};

use crate::aggregator::ResultAggregator;
use crate::config::ScannerConfig;
use crate::discovery::FileDiscoverer;
use crate::dispatcher::{FileFailure, WorkDispatcher};
use crate::error::ScannerError;
use crate::extractor::{CertificateExtractor, DerCertificateExtractor};

/// 스캔 한 번의 결과
///
/// 성공 레코드와 실패 진단을 모두 보관합니다. `records`는 비어 있지 않습니다.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    /// 스캔 식별자 (UUID v4)
    pub scan_id: String,
    /// 탐색 루트
    pub root: PathBuf,
    /// 탐색된 파일 수
    pub discovered: usize,
    /// 성공한 레코드 (원본 경로 순)
    pub records: Vec<CertificateRecord>,
    /// 실패한 파일
    pub failures: Vec<FileFailure>,
    /// 탐색부터 집계까지 걸린 시간
    pub elapsed: Duration,
}

impl ScanSummary {
    /// 보관 중인 레코드로 리포트를 작성합니다.
    ///
    /// 실패 후 같은 요약으로 몇 번이든 다시 호출할 수 있습니다.
    ///
    /// # Errors
    ///
    /// - 레코드가 없으면 `ScannerError::EmptyResult`
    /// - 작성기가 실패하면 `ScannerError::Report`
    pub fn write_report(
        &self,
        writer: &dyn ReportWriter,
        destination: &Path,
    ) -> Result<(), ScannerError> {
        if self.records.is_empty() {
            return Err(ScannerError::EmptyResult {
                failed: self.failures.len(),
            });
        }

        writer
            .write_report(&self.records, destination)
            .map_err(|e| ScannerError::Report {
                path: destination.display().to_string(),
                reason: report_failure_reason(e),
            })?;

        info!(
            scan_id = %self.scan_id,
            format = writer.format_name(),
            path = %destination.display(),
            rows = self.records.len(),
            "report written"
        );
        Ok(())
    }
}

/// 작성기 에러에서 경로를 뺀 사유만 남깁니다.
fn report_failure_reason(err: CertpostError) -> String {
    match err {
        CertpostError::Report(ReportError::WriteFailed { reason, .. }) => reason,
        CertpostError::Report(ReportError::EmptyCollection { .. }) => {
            "refusing to write an empty report".to_owned()
        }
        other => other.to_string(),
    }
}

/// 대화형 세션의 최종 상태
#[derive(Debug)]
pub enum SessionOutcome {
    /// 디렉토리 또는 저장 경로 선택이 취소됨 (탐색 전)
    Cancelled,
    /// 스캔과 리포트 저장 모두 성공
    Completed {
        /// 스캔 결과
        summary: ScanSummary,
        /// 실제 저장 경로 (확장자 보정 후)
        destination: PathBuf,
    },
    /// 스캔은 성공했지만 리포트 저장 실패
    SaveFailed {
        /// 재시도에 쓸 스캔 결과
        summary: ScanSummary,
        /// 저장을 시도한 경로
        destination: PathBuf,
        /// 실패 사유
        reason: String,
    },
}

/// 인증서 스캐너
///
/// 설정과 추출기를 보관하며, 스캔마다 새 탐색과 디스패치를 수행합니다.
/// 스캔 사이에 공유되는 가변 상태는 없습니다.
pub struct CertScanner {
    config: ScannerConfig,
    extractor: Arc<dyn CertificateExtractor>,
    discoverer: FileDiscoverer,
    dispatcher: WorkDispatcher,
}

impl CertScanner {
    /// 스캐너 설정을 반환합니다.
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// 사용 중인 추출기 형식 이름을 반환합니다.
    pub fn extractor_name(&self) -> &str {
        self.extractor.format_name()
    }

    /// 루트 디렉토리를 스캔합니다.
    ///
    /// 탐색(blocking I/O) → 빈 탐색 검사 → 병렬 추출 → 집계 순서로 진행합니다.
    ///
    /// # Errors
    ///
    /// - 루트가 없거나 읽을 수 없으면 `ScannerError::Discovery`
    /// - 일치하는 파일이 없으면 `ScannerError::EmptyDiscovery`
    /// - 파싱에 성공한 인증서가 없으면 `ScannerError::EmptyResult`
    pub async fn scan(
        &self,
        root: &Path,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ScanSummary, ScannerError> {
        let started = Instant::now();
        let scan_id = uuid::Uuid::new_v4().to_string();

        info!(scan_id = %scan_id, root = %root.display(), "starting certificate scan");

        // 파일 탐색 (blocking I/O)
        let paths = {
            let discoverer = self.discoverer.clone();
            let dir = root.to_path_buf();
            let sink = Arc::clone(&sink);
            tokio::task::spawn_blocking(move || discoverer.discover(&dir, sink.as_ref()))
                .await
                .map_err(|e| ScannerError::Channel(format!("spawn_blocking failed: {e}")))?
        }?;

        if paths.is_empty() {
            warn!(root = %root.display(), "no matching files found");
            return Err(ScannerError::EmptyDiscovery {
                root: root.display().to_string(),
            });
        }

        let discovered = paths.len();
        debug!(scan_id = %scan_id, files = discovered, "discovery complete");

        let outcomes = self.dispatcher.dispatch(paths, sink).await;

        let mut aggregator = ResultAggregator::new();
        aggregator.extend(outcomes);
        let report = aggregator.finish()?;

        let elapsed = started.elapsed();
        metrics::histogram!(m::SCANNER_SCAN_DURATION_SECONDS).record(elapsed.as_secs_f64());

        info!(
            scan_id = %scan_id,
            discovered,
            parsed = report.records.len(),
            failed = report.failures.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "certificate scan completed"
        );

        Ok(ScanSummary {
            scan_id,
            root: std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf()),
            discovered,
            records: report.records,
            failures: report.failures,
            elapsed,
        })
    }

    /// 디렉토리 선택부터 리포트 저장까지 전체 흐름을 실행합니다.
    ///
    /// 두 경로 선택은 모두 탐색 전에 이루어지며, 어느 한쪽이라도 취소되면
    /// 아무 작업 없이 [`SessionOutcome::Cancelled`]를 반환합니다.
    ///
    /// 실패 조건(파일 없음, 파싱 결과 없음, 저장 실패)마다 서로 다른 메시지를
    /// `interaction`으로 표시합니다. 저장 실패는 에러가 아니라
    /// [`SessionOutcome::SaveFailed`]로 돌려주어 결과를 재사용할 수 있게 합니다.
    ///
    /// # Errors
    ///
    /// 스캔 단계의 에러(`Discovery`, `EmptyDiscovery`, `EmptyResult`, `Channel`)는
    /// 메시지를 표시한 뒤 그대로 전파합니다.
    pub async fn run_session(
        &self,
        interaction: &dyn Interaction,
        sink: Arc<dyn ProgressSink>,
        writer: &dyn ReportWriter,
    ) -> Result<SessionOutcome, ScannerError> {
        let Some(root) = interaction.select_directory() else {
            info!("directory selection cancelled");
            return Ok(SessionOutcome::Cancelled);
        };

        let Some(destination) = interaction.select_destination() else {
            info!("destination selection cancelled");
            return Ok(SessionOutcome::Cancelled);
        };

        let destination = match writer.file_extension() {
            Some(ext) => ensure_extension(&destination, ext),
            None => destination,
        };

        let summary = match self.scan(&root, sink).await {
            Ok(summary) => summary,
            Err(e) => {
                interaction.show_message(message_kind(&e), &user_message(&e));
                return Err(e);
            }
        };

        match summary.write_report(writer, &destination) {
            Ok(()) => {
                interaction.show_message(
                    MessageKind::Info,
                    &format!(
                        "Processed {} certificates, report saved to {}",
                        summary.records.len(),
                        destination.display()
                    ),
                );
                Ok(SessionOutcome::Completed {
                    summary,
                    destination,
                })
            }
            Err(e) => {
                warn!(path = %destination.display(), error = %e, "failed to save report");
                interaction.show_message(MessageKind::Error, &user_message(&e));
                Ok(SessionOutcome::SaveFailed {
                    summary,
                    destination,
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// 스캐너 빌더
///
/// 추출기를 지정하지 않으면 [`DerCertificateExtractor`]를 사용합니다.
pub struct CertScannerBuilder {
    config: ScannerConfig,
    extractor: Option<Arc<dyn CertificateExtractor>>,
}

impl CertScannerBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
            extractor: None,
        }
    }

    /// 스캐너 설정을 지정합니다.
    pub fn config(mut self, config: ScannerConfig) -> Self {
        self.config = config;
        self
    }

    /// 추출기를 교체합니다.
    pub fn extractor(mut self, extractor: Arc<dyn CertificateExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// 설정을 검증하고 스캐너를 빌드합니다.
    ///
    /// # Errors
    ///
    /// 설정 검증 실패 시 `ScannerError::Config`
    pub fn build(self) -> Result<CertScanner, ScannerError> {
        self.config.validate()?;

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(DerCertificateExtractor));

        let discoverer = FileDiscoverer::new(&self.config);
        let dispatcher = WorkDispatcher::from_config(Arc::clone(&extractor), &self.config);

        Ok(CertScanner {
            config: self.config,
            extractor,
            discoverer,
            dispatcher,
        })
    }
}

impl Default for CertScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 경로가 주어진 확장자로 끝나지 않으면 확장자를 덧붙입니다 (대소문자 무시).
///
/// 기존 확장자를 바꾸지 않고 뒤에 붙입니다: `report.csv` → `report.csv.xlsx`.
pub fn ensure_extension(path: &Path, extension: &str) -> PathBuf {
    let extension = extension.trim_start_matches('.');
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));

    if has_extension {
        return path.to_path_buf();
    }

    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

/// 에러 종류에 맞는 메시지 등급
fn message_kind(err: &ScannerError) -> MessageKind {
    match err {
        ScannerError::EmptyDiscovery { .. } | ScannerError::EmptyResult { .. } => {
            MessageKind::Warning
        }
        _ => MessageKind::Error,
    }
}

/// 사용자에게 보여줄 메시지
pub fn user_message(err: &ScannerError) -> String {
    match err {
        ScannerError::EmptyDiscovery { root } => {
            format!("No certificate files found in {root}")
        }
        ScannerError::EmptyResult { failed } => {
            format!("No certificates could be parsed ({failed} files failed)")
        }
        ScannerError::Report { path, reason } => {
            format!("Could not save report to {path}: {reason}")
        }
        other => format!("Scan failed: {other}"),
    }
}
