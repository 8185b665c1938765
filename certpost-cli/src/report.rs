//! XLSX report writer
//!
//! Writes one worksheet with a bold header row followed by one row per record,
//! in the order the records are given.

use std::fmt::Write as _;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::debug;

use certpost_core::config::ReportConfig;
use certpost_core::error::{CertpostError, ConfigError, ReportError};
use certpost_core::metrics as m;
use certpost_core::pipeline::ReportWriter;
use certpost_core::types::CertificateRecord;

/// Worksheet column titles, in record field order.
pub const REPORT_HEADERS: [&str; 5] = [
    "ФИО",
    "Дата создания",
    "Дата окончания",
    "Серийный номер",
    "Путь до файла",
];

const SHEET_NAME: &str = "Certificates";
const COLUMN_WIDTHS: [f64; 5] = [40.0, 20.0, 20.0, 42.0, 60.0];

/// Report writer producing an `.xlsx` workbook.
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    date_format: String,
}

impl XlsxReportWriter {
    /// Create a writer with the given chrono strftime pattern for date columns.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the pattern cannot be parsed.
    pub fn new(date_format: impl Into<String>) -> Result<Self, CertpostError> {
        let date_format = date_format.into();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidValue {
                field: "report.date_format".to_owned(),
                reason: format!("invalid strftime pattern '{date_format}'"),
            }
            .into());
        }
        Ok(Self { date_format })
    }

    /// Create a writer from the `[report]` config section.
    pub fn from_config(config: &ReportConfig) -> Result<Self, CertpostError> {
        Self::new(config.date_format.clone())
    }

    /// Render one record as the five cell values of its row.
    pub fn format_row(&self, record: &CertificateRecord) -> [String; 5] {
        [
            record.full_name.clone(),
            self.format_date(&record.not_before),
            self.format_date(&record.not_after),
            record.serial_number.clone(),
            record.source_path.clone(),
        ]
    }

    fn format_date(&self, value: &DateTime<Utc>) -> String {
        let mut out = String::new();
        if write!(out, "{}", value.format(&self.date_format)).is_err() {
            return value.to_rfc3339();
        }
        out
    }

    fn build_workbook(&self, records: &[CertificateRecord]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, title) in (0u16..).zip(REPORT_HEADERS) {
            sheet.write_string_with_format(0, col, title, &header)?;
        }
        for (col, width) in (0u16..).zip(COLUMN_WIDTHS) {
            sheet.set_column_width(col, width)?;
        }
        sheet.set_freeze_panes(1, 0)?;

        for (row, record) in (1u32..).zip(records) {
            for (col, value) in (0u16..).zip(self.format_row(record)) {
                sheet.write_string(row, col, value)?;
            }
        }

        Ok(workbook)
    }
}

impl Default for XlsxReportWriter {
    fn default() -> Self {
        Self {
            date_format: ReportConfig::default().date_format,
        }
    }
}

impl ReportWriter for XlsxReportWriter {
    fn format_name(&self) -> &str {
        "xlsx"
    }

    fn file_extension(&self) -> Option<&str> {
        Some("xlsx")
    }

    fn write_report(
        &self,
        records: &[CertificateRecord],
        destination: &Path,
    ) -> Result<(), CertpostError> {
        let path = destination.display().to_string();
        if records.is_empty() {
            return Err(ReportError::EmptyCollection { path }.into());
        }

        let write_failed = |e: XlsxError| ReportError::WriteFailed {
            path: path.clone(),
            reason: e.to_string(),
        };

        let mut workbook = self.build_workbook(records).map_err(write_failed)?;
        workbook.save(destination).map_err(write_failed)?;

        metrics::counter!(m::REPORT_ROWS_WRITTEN_TOTAL).increment(records.len() as u64);
        debug!(path = %destination.display(), rows = records.len(), "xlsx workbook saved");
        Ok(())
    }
}
