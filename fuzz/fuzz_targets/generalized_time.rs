#![no_main]

use certpost_scanner::extractor::{expand_utc_time, parse_generalized_time};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        let _ = parse_generalized_time(value);
        let _ = parse_generalized_time(&expand_utc_time(value));
    }
});
