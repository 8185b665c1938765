#![no_main]

use certpost_scanner::{CertificateExtractor, DerCertificateExtractor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // 어떤 입력이든 panic 없이 Ok 또는 ExtractionError여야 함
    if let Ok(record) = DerCertificateExtractor.extract(data, "fuzz/input.cer") {
        assert_eq!(record.source_path, "fuzz/input.cer");
        assert!(record
            .serial_number
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }
});
