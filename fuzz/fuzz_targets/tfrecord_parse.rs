//! Fuzz target for container framing.
//!
//! Every read must end in a payload, a clean stop or a single corruption
//! error; the reader must never yield after an error.

#![no_main]

use std::io::Cursor;

use circlegen::record::RecordReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // A small limit keeps hostile length fields from allocating gigabytes.
    let mut reader = RecordReader::new(Cursor::new(data)).with_max_record_len(1 << 20);
    while let Some(item) = reader.next() {
        if item.is_err() {
            assert!(reader.next().is_none());
            break;
        }
    }
});
