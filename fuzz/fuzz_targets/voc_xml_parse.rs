//! Fuzz target for VOC XML parsing.
//!
//! This fuzzer feeds arbitrary text to the VOC XML parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use std::collections::BTreeMap;

use circlegen::ir::io_voc_xml::from_voc_xml_str;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };

    let classes = BTreeMap::from([(1, "circle".to_string())]);
    let _ = from_voc_xml_str(xml, &classes);
});
