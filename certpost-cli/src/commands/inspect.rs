//! `certpost inspect` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use certpost_core::config::CertpostConfig;
use certpost_core::types::CertificateRecord;
use certpost_scanner::extractor::read_file;
use certpost_scanner::{CertificateExtractor, DerCertificateExtractor};

use crate::cli::InspectArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};
use crate::report::{REPORT_HEADERS, XlsxReportWriter};

/// Execute the `inspect` command.
pub async fn execute(
    args: InspectArgs,
    config: &CertpostConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %args.file.display(), "inspecting certificate");

    let record = extract_single(&args.file, config.scan.read_buffer_size).await?;
    let row_writer = XlsxReportWriter::from_config(&config.report)?;

    let report = InspectReport {
        cells: row_writer.format_row(&record),
        record,
    };
    writer.render(&report)
}

/// Read and extract one certificate file.
///
/// # Errors
///
/// Returns `CliError::Command` with the extraction failure if the file cannot be read or parsed.
pub async fn extract_single(path: &Path, buffer_size: usize) -> Result<CertificateRecord, CliError> {
    let owned = path.to_path_buf();
    let raw = tokio::task::spawn_blocking(move || read_file(&owned, buffer_size))
        .await
        .map_err(|e| CliError::Command(format!("read task failed: {e}")))?
        .map_err(|e| CliError::Command(format!("{}: {e}", path.display())))?;

    let source = path.display().to_string();
    DerCertificateExtractor
        .extract(&raw, &source)
        .map_err(|e| CliError::Command(format!("{source}: {e}")))
}

/// Extracted certificate fields.
#[derive(Serialize)]
pub struct InspectReport {
    #[serde(flatten)]
    pub record: CertificateRecord,
    /// Cell values as they appear in the report (text output only)
    #[serde(skip)]
    pub cells: [String; 5],
}

impl Render for InspectReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for (title, value) in REPORT_HEADERS.iter().zip(&self.cells) {
            writeln!(w, "{:<16} {}", format!("{title}:").bold(), value)?;
        }
        Ok(())
    }
}
