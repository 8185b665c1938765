#![no_main]

use certpost_scanner::extractor::format_serial_hex;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let hex = format_serial_hex(data);
    assert!(!hex.is_empty());
    assert!(!hex.starts_with('0') || hex == "0");
});
