#![allow(dead_code)]

use std::collections::BTreeMap;

use circlegen::feature::{Feature, FeatureMap};
use circlegen::ir::{Circle, ImageName};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_key() -> BoxedStrategy<String> {
    "[a-z]{1,8}(/[a-z_]{1,8}){0,3}".boxed()
}

/// Any feature value, NaN excluded so maps compare with `==`.
pub fn arb_feature() -> BoxedStrategy<Feature> {
    prop_oneof![
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..4)
            .prop_map(Feature::BytesList),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(Feature::Int64List),
        prop::collection::vec(-1.0e6f32..1.0e6f32, 0..8).prop_map(Feature::FloatList),
    ]
    .boxed()
}

pub fn arb_feature_map(max_entries: usize) -> BoxedStrategy<FeatureMap> {
    prop::collection::btree_map(arb_key(), arb_feature(), 0..=max_entries).boxed()
}

pub fn arb_image_names(max: usize) -> BoxedStrategy<Vec<ImageName>> {
    prop::collection::btree_set(0usize..1000, 0..=max)
        .prop_map(|indices| indices.into_iter().map(ImageName::for_index).collect())
        .boxed()
}

pub fn arb_payloads(max_records: usize, max_len: usize) -> BoxedStrategy<Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..=max_len), 0..=max_records).boxed()
}

pub fn assert_disjoint(circles: &[Circle]) -> Result<(), String> {
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            let reach = a.r + b.r;
            if a.center().distance_squared(&b.center()) < reach * reach {
                return Err(format!("{a:?} overlaps {b:?}"));
            }
        }
    }
    Ok(())
}

pub fn name_counts(names: &[ImageName]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    counts
}
