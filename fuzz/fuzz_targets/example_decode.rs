//! Fuzz target for example payload decoding.

#![no_main]

use circlegen::annotate::TrainingExample;
use circlegen::feature::{decode, encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(features) = decode(data) {
        // Whatever decodes must re-encode to something that decodes the same.
        let again = decode(&encode(&features)).expect("re-encoded map decodes");
        assert_eq!(again.len(), features.len());
        let _ = TrainingExample::from_feature_map(&features);
    }
});
