//! `certpost scan` command handler

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use certpost_core::config::CertpostConfig;
use certpost_core::pipeline::{Interaction, ProgressSink};
use certpost_core::types::{CertificateRecord, MessageKind};
use certpost_scanner::scanner::{ensure_extension, user_message};
use certpost_scanner::{
    CertScannerBuilder, ChannelProgressSink, NullProgressSink, ScanSummary, ScannerConfig,
    ScannerConfigBuilder, SessionOutcome,
};

use crate::cli::{OutputFormat, ScanArgs};
use crate::error::CliError;
use crate::interaction::TerminalInteraction;
use crate::output::{OutputWriter, Render};
use crate::progress::spawn_progress_renderer;
use crate::report::XlsxReportWriter;

const PROGRESS_CHANNEL_CAPACITY: usize = 256;

/// Execute the `scan` command.
pub async fn execute(
    args: ScanArgs,
    config: &CertpostConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let scanner_config = build_scanner_config(&args, config)?;
    let scanner = CertScannerBuilder::new().config(scanner_config).build()?;
    let report_writer = XlsxReportWriter::from_config(&config.report)?;

    let allow_prompt = !args.non_interactive;
    let terminal = TerminalInteraction::new(None, None, "", allow_prompt);
    if !terminal.can_prompt() && args.path.is_none() {
        return Err(CliError::Command(
            "no directory given and prompting is not available (pass PATH)".to_owned(),
        ));
    }

    // Without a prompt the configured file name is the destination.
    let destination = match (&args.report, terminal.can_prompt()) {
        (Some(report), _) => Some(report.clone()),
        (None, false) => Some(PathBuf::from(&config.report.default_file_name)),
        (None, true) => None,
    };

    let interaction = TerminalInteraction::new(
        args.path.clone(),
        destination,
        config.report.default_file_name.clone(),
        allow_prompt,
    );

    let show_progress = !args.no_progress && writer.format() == OutputFormat::Text;
    let (sink, renderer) = progress_sink(show_progress);

    info!(
        workers = scanner.config().worker_count,
        max_files = scanner.config().max_files,
        extractor = scanner.extractor_name(),
        "starting certificate scan"
    );

    let outcome = scanner
        .run_session(&interaction, sink, &report_writer)
        .await;

    if let Some(handle) = renderer {
        if let Err(e) = handle.await {
            debug!(error = %e, "progress renderer ended abnormally");
        }
    }

    match outcome? {
        SessionOutcome::Cancelled => {
            interaction.show_message(MessageKind::Info, "Scan cancelled");
            Ok(())
        }
        SessionOutcome::Completed {
            summary,
            destination,
        } => writer.render(&ScanReport::new(&summary, Some(&destination))),
        SessionOutcome::SaveFailed {
            summary,
            destination,
            reason,
        } => retry_save(&interaction, &report_writer, &summary, writer).unwrap_or_else(|| {
            writer.render(&ScanReport::new(&summary, None))?;
            Err(CliError::SaveFailed(format!(
                "Could not save report to {}: {reason}",
                destination.display()
            )))
        }),
    }
}

fn build_scanner_config(
    args: &ScanArgs,
    config: &CertpostConfig,
) -> Result<ScannerConfig, CliError> {
    let mut builder = ScannerConfigBuilder::from_config(ScannerConfig::from_core(&config.scan));
    if let Some(max_files) = args.max_files {
        builder = builder.max_files(max_files);
    }
    if let Some(workers) = args.workers {
        builder = builder.worker_count(workers);
    }
    Ok(builder.build()?)
}

fn progress_sink(enabled: bool) -> (Arc<dyn ProgressSink>, Option<JoinHandle<()>>) {
    if !enabled {
        return (Arc::new(NullProgressSink), None);
    }
    let (sink, rx) = ChannelProgressSink::new(PROGRESS_CHANNEL_CAPACITY);
    (Arc::new(sink), Some(spawn_progress_renderer(rx)))
}

/// Ask for new destinations until a save succeeds or the user gives up.
///
/// Returns `None` when the user declines to retry.
fn retry_save(
    interaction: &TerminalInteraction,
    report_writer: &XlsxReportWriter,
    summary: &ScanSummary,
    writer: &OutputWriter,
) -> Option<Result<(), CliError>> {
    while let Some(candidate) = interaction.ask_retry_destination() {
        let destination = ensure_extension(&candidate, "xlsx");
        match summary.write_report(report_writer, &destination) {
            Ok(()) => {
                interaction.show_message(
                    MessageKind::Info,
                    &format!(
                        "Processed {} certificates, report saved to {}",
                        summary.records.len(),
                        destination.display()
                    ),
                );
                return Some(writer.render(&ScanReport::new(summary, Some(&destination))));
            }
            Err(e) => interaction.show_message(MessageKind::Error, &user_message(&e)),
        }
    }
    None
}

/// Summary printed after a scan.
#[derive(Serialize)]
pub struct ScanReport {
    pub scan_id: String,
    pub root: String,
    pub discovered: usize,
    pub parsed: usize,
    pub failed: usize,
    /// Saved report path (None when the report could not be saved)
    pub report: Option<String>,
    pub elapsed_ms: u64,
    pub failures: Vec<FailureEntry>,
    pub certificates: Vec<CertificateRecord>,
}

#[derive(Serialize)]
pub struct FailureEntry {
    pub path: String,
    pub error: String,
}

impl ScanReport {
    pub fn new(summary: &ScanSummary, destination: Option<&std::path::Path>) -> Self {
        Self {
            scan_id: summary.scan_id.clone(),
            root: summary.root.display().to_string(),
            discovered: summary.discovered,
            parsed: summary.records.len(),
            failed: summary.failures.len(),
            report: destination.map(|d| d.display().to_string()),
            elapsed_ms: u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
            failures: summary
                .failures
                .iter()
                .map(|f| FailureEntry {
                    path: f.path.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
            certificates: summary.records.clone(),
        }
    }
}

impl Render for ScanReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scan: {}", self.root.bold())?;
        writeln!(w, "Files discovered: {}", self.discovered)?;
        writeln!(w, "Certificates parsed: {}", self.parsed.to_string().green())?;
        if self.failed > 0 {
            writeln!(w, "Failed files: {}", self.failed.to_string().red())?;
        } else {
            writeln!(w, "Failed files: 0")?;
        }
        writeln!(w, "Elapsed: {} ms", self.elapsed_ms)?;

        match &self.report {
            Some(path) => writeln!(w, "Report: {}", path.bold())?,
            None => writeln!(w, "Report: {}", "not saved".red().bold())?,
        }

        if !self.failures.is_empty() {
            writeln!(w)?;
            writeln!(w, "{:<60} Error", "File")?;
            writeln!(w, "{}", "-".repeat(80))?;
            for f in &self.failures {
                writeln!(w, "{:<60} {}", f.path, f.error.yellow())?;
            }
        }

        Ok(())
    }
}
