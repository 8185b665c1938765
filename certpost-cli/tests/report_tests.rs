//! Integration tests for the xlsx report writer and the terminal session flow.
//!
//! Certificates are generated with rcgen; the session runs with preset paths
//! and prompting disabled.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair, SerialNumber};
use tempfile::TempDir;

use certpost_cli::interaction::TerminalInteraction;
use certpost_cli::report::{REPORT_HEADERS, XlsxReportWriter};
use certpost_core::pipeline::ReportWriter;
use certpost_core::types::CertificateRecord;
use certpost_scanner::{CertScannerBuilder, NullProgressSink, ScannerError, SessionOutcome};

fn write_cert(dir: &Path, name: &str, common_name: &str, serial: &[u8]) {
    let mut params = CertificateParams::default();
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    params.distinguished_name = dn;
    params.not_before = rcgen::date_time_ymd(2024, 1, 1);
    params.not_after = rcgen::date_time_ymd(2027, 12, 31);
    params.serial_number = Some(SerialNumber::from_slice(serial));

    let key_pair = KeyPair::generate().expect("key generation should succeed");
    let der = params
        .self_signed(&key_pair)
        .expect("self-signing should succeed")
        .der()
        .to_vec();

    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("should create parent dir");
    }
    std::fs::write(path, der).expect("should write cert");
}

fn assert_xlsx(path: &Path) {
    let bytes = std::fs::read(path).expect("report should exist");
    assert!(bytes.starts_with(b"PK"), "xlsx is a zip container");
}

fn read_xlsx_part(path: &Path, part: &str) -> String {
    let file = std::fs::File::open(path).expect("report should exist");
    let mut archive = zip::ZipArchive::new(file).expect("xlsx should be a zip archive");
    let mut entry = archive.by_name(part).expect("part should exist");
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .expect("part should be UTF-8 XML");
    xml
}

/// Byte offset of each needle in `haystack`, panicking on a missing one.
fn positions(haystack: &str, needles: &[&str]) -> Vec<usize> {
    needles
        .iter()
        .map(|n| {
            haystack
                .find(n)
                .unwrap_or_else(|| panic!("{n} should appear in workbook"))
        })
        .collect()
}

#[tokio::test]
async fn test_session_writes_xlsx_with_appended_extension() {
    // Given: two valid certificates and one broken file
    let certs = TempDir::new().expect("should create temp dir");
    write_cert(certs.path(), "a.cer", "Alice", &[0x0A]);
    write_cert(certs.path(), "nested/b.CER", "Bob", &[0x0B]);
    std::fs::write(certs.path().join("broken.cer"), b"junk").expect("should write junk");

    let out = TempDir::new().expect("should create temp dir");
    let interaction = TerminalInteraction::new(
        Some(certs.path().to_path_buf()),
        Some(out.path().join("inventory")),
        "report.xlsx",
        false,
    );

    // When: running the full session with the xlsx writer
    let scanner = CertScannerBuilder::new().build().expect("scanner should build");
    let outcome = scanner
        .run_session(
            &interaction,
            Arc::new(NullProgressSink),
            &XlsxReportWriter::default(),
        )
        .await
        .expect("session should succeed");

    // Then: the report lands at "inventory.xlsx" with two rows
    match outcome {
        SessionOutcome::Completed {
            summary,
            destination,
        } => {
            assert_eq!(destination, out.path().join("inventory.xlsx"));
            assert_eq!(summary.records.len(), 2);
            assert_eq!(summary.failures.len(), 1);
            assert_xlsx(&destination);
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_reports_save_failure_and_allows_retry() {
    let certs = TempDir::new().expect("should create temp dir");
    write_cert(certs.path(), "a.cer", "Alice", &[0x01]);

    let out = TempDir::new().expect("should create temp dir");
    let interaction = TerminalInteraction::new(
        Some(certs.path().to_path_buf()),
        Some(out.path().join("missing-dir").join("report.xlsx")),
        "report.xlsx",
        false,
    );
    let writer = XlsxReportWriter::default();

    let scanner = CertScannerBuilder::new().build().expect("scanner should build");
    let outcome = scanner
        .run_session(&interaction, Arc::new(NullProgressSink), &writer)
        .await
        .expect("scan itself should succeed");

    let SessionOutcome::SaveFailed { summary, .. } = outcome else {
        panic!("expected SaveFailed");
    };

    // The retained summary can be written elsewhere without rescanning.
    let retry = out.path().join("retry.xlsx");
    summary
        .write_report(&writer, &retry)
        .expect("retry should succeed");
    assert_xlsx(&retry);
}

#[tokio::test]
async fn test_session_without_certificates_is_empty_discovery() {
    let certs = TempDir::new().expect("should create temp dir");
    std::fs::write(certs.path().join("readme.txt"), b"nothing").expect("should write file");

    let out = TempDir::new().expect("should create temp dir");
    let interaction = TerminalInteraction::new(
        Some(certs.path().to_path_buf()),
        Some(out.path().join("r.xlsx")),
        "report.xlsx",
        false,
    );

    let scanner = CertScannerBuilder::new().build().expect("scanner should build");
    let err = scanner
        .run_session(
            &interaction,
            Arc::new(NullProgressSink),
            &XlsxReportWriter::default(),
        )
        .await
        .expect_err("no files should fail");

    assert!(matches!(err, ScannerError::EmptyDiscovery { .. }));
    assert!(!out.path().join("r.xlsx").exists(), "no report should be written");
}

#[test]
fn test_writer_saves_records_in_given_order() {
    use chrono::{TimeZone, Utc};

    let records: Vec<CertificateRecord> = ["b", "a"]
        .iter()
        .map(|n| CertificateRecord {
            full_name: n.to_string(),
            not_before: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            not_after: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            serial_number: "01".to_owned(),
            source_path: format!("/certs/{n}.cer"),
        })
        .collect();

    let out = TempDir::new().expect("should create temp dir");
    let path = out.path().join("ordered.xlsx");
    XlsxReportWriter::default()
        .write_report(&records, &path)
        .expect("write should succeed");
    assert_xlsx(&path);

    // Strings are listed in the order cells are stored: header row first, then rows.
    let strings = read_xlsx_part(&path, "xl/sharedStrings.xml");
    let wrapped: Vec<String> = REPORT_HEADERS.iter().map(|h| format!(">{h}<")).collect();
    let wrapped: Vec<&str> = wrapped.iter().map(String::as_str).collect();
    let header_positions = positions(&strings, &wrapped);
    assert!(
        header_positions.windows(2).all(|w| w[0] < w[1]),
        "headers should be stored in column order"
    );

    let row_positions = positions(&strings, &["/certs/b.cer", "/certs/a.cer"]);
    assert!(row_positions[0] < row_positions[1], "rows keep the given order");
    assert!(header_positions[4] < row_positions[0]);

    let sheet = read_xlsx_part(&path, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), 3, "header plus two rows");
    assert!(sheet.contains(r#"<c r="E3""#), "path column is the fifth");
    assert!(!sheet.contains(r#"<c r="F"#), "no sixth column");
}

#[test]
fn test_workbook_header_titles() {
    let record = CertificateRecord {
        full_name: "Ivan Petrov".to_owned(),
        not_before: chrono::DateTime::from_timestamp(1_704_067_200, 0).expect("valid instant"),
        not_after: chrono::DateTime::from_timestamp(1_735_689_600, 0).expect("valid instant"),
        serial_number: "0A1B".to_owned(),
        source_path: "/certs/ivan.cer".to_owned(),
    };
    let out = TempDir::new().expect("should create temp dir");
    let path = out.path().join("one.xlsx");
    XlsxReportWriter::default()
        .write_report(&[record], &path)
        .expect("write should succeed");

    let strings = read_xlsx_part(&path, "xl/sharedStrings.xml");
    for title in [
        "ФИО",
        "Дата создания",
        "Дата окончания",
        "Серийный номер",
        "Путь до файла",
    ] {
        assert!(strings.contains(title), "missing header {title}");
    }
    assert!(strings.contains("01.01.2024 00:00:00"));
    assert!(strings.contains("01.01.2025 00:00:00"));
    assert!(strings.contains("0A1B"));

    let workbook = read_xlsx_part(&path, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Certificates""#));
}

#[test]
fn test_writer_into_missing_directory_fails() {
    let record = CertificateRecord {
        full_name: "x".to_owned(),
        not_before: chrono::Utc::now(),
        not_after: chrono::Utc::now(),
        serial_number: "01".to_owned(),
        source_path: "/x.cer".to_owned(),
    };
    let out = TempDir::new().expect("should create temp dir");
    let err = XlsxReportWriter::default()
        .write_report(&[record], &out.path().join("no/such/dir/r.xlsx"))
        .expect_err("missing parent should fail");
    assert!(err.to_string().contains("r.xlsx"));
}
