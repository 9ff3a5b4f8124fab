#![no_main]

use std::path::Path;

use circlegen::ir::label_map::parse_label_map;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_label_map(text, Path::new("<fuzz>"));
    }
});
