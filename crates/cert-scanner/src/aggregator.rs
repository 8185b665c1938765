//! 결과 집계기
//!
//! 디스패처가 내놓은 [`ParseOutcome`]을 성공 레코드와 실패 진단으로 나눕니다.
//! 실패는 결과 집합에서 제외되지만 진단 목록으로 남습니다.

use certpost_core::types::CertificateRecord;

use crate::dispatcher::{FileFailure, ParseOutcome};
use crate::error::ScannerError;

/// 집계된 스캔 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// 성공한 레코드 (원본 경로 순)
    pub records: Vec<CertificateRecord>,
    /// 실패한 파일 (원본 경로 순)
    pub failures: Vec<FileFailure>,
}

/// 결과 집계기
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Vec<CertificateRecord>,
    failures: Vec<FileFailure>,
}

impl ResultAggregator {
    /// 빈 집계기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과 하나를 추가합니다.
    pub fn push(&mut self, outcome: ParseOutcome) {
        match outcome {
            ParseOutcome::Success(record) => self.records.push(record),
            ParseOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// 여러 결과를 추가합니다.
    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = ParseOutcome>) {
        for outcome in outcomes {
            self.push(outcome);
        }
    }

    /// 지금까지 추가된 성공 수
    pub fn success_count(&self) -> usize {
        self.records.len()
    }

    /// 지금까지 추가된 실패 수
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// 집계를 마칩니다.
    ///
    /// 완료 순서는 실행마다 달라지므로 결과는 원본 경로 기준으로 정렬합니다.
    ///
    /// # Errors
    ///
    /// 성공한 레코드가 하나도 없으면 [`ScannerError::EmptyResult`]를 반환합니다.
    pub fn finish(mut self) -> Result<AggregateReport, ScannerError> {
        if self.records.is_empty() {
            return Err(ScannerError::EmptyResult {
                failed: self.failures.len(),
            });
        }

        self.records
            .sort_by(|a, b| a.source_path.cmp(&b.source_path));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(AggregateReport {
            records: self.records,
            failures: self.failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use chrono::{TimeZone, Utc};

    fn success(path: &str) -> ParseOutcome {
        ParseOutcome::Success(CertificateRecord {
            full_name: "Jane Doe".to_owned(),
            not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            serial_number: "1".to_owned(),
            source_path: path.to_owned(),
        })
    }

    fn failure(path: &str) -> ParseOutcome {
        ParseOutcome::Failure(FileFailure {
            path: path.to_owned(),
            error: ExtractionError::Decode("truncated".to_owned()),
        })
    }

    #[test]
    fn splits_successes_and_failures() {
        let mut agg = ResultAggregator::new();
        agg.extend([success("/c.cer"), failure("/b.cer"), success("/a.cer")]);
        assert_eq!(agg.success_count(), 2);
        assert_eq!(agg.failure_count(), 1);

        let report = agg.finish().unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "/b.cer");
    }

    #[test]
    fn records_are_sorted_by_path() {
        let mut agg = ResultAggregator::new();
        agg.extend([success("/z.cer"), success("/a.cer"), success("/m.cer")]);
        let report = agg.finish().unwrap();
        let paths: Vec<&str> = report
            .records
            .iter()
            .map(|r| r.source_path.as_str())
            .collect();
        assert_eq!(paths, vec!["/a.cer", "/m.cer", "/z.cer"]);
    }

    #[test]
    fn all_failures_is_empty_result() {
        let mut agg = ResultAggregator::new();
        agg.extend([failure("/a.cer"), failure("/b.cer")]);
        let err = agg.finish().unwrap_err();
        assert!(matches!(err, ScannerError::EmptyResult { failed: 2 }));
    }

    #[test]
    fn nothing_pushed_is_empty_result() {
        let err = ResultAggregator::new().finish().unwrap_err();
        assert!(matches!(err, ScannerError::EmptyResult { failed: 0 }));
    }
}
