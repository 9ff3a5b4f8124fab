//! Container inspection.
//!
//! Walks a container frame by frame and summarizes what it holds without
//! assuming the payloads were produced by this crate.

mod report;

pub use report::{ImageSizeCount, InspectReport, LabelCount};

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::annotate::TrainingExample;
use crate::error::CirclegenError;
use crate::feature;
use crate::record::read_all_records;

/// Options for container inspection.
#[derive(Clone, Debug)]
pub struct InspectOptions {
    /// Width of histogram bars (in characters).
    pub bar_width: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self { bar_width: 20 }
    }
}

/// Summarize the container at `path`.
///
/// Undecodable payloads are counted, not fatal. A corrupt frame aborts the
/// walk with `CorruptContainer`; a truncated tail simply ends it.
pub fn inspect_container(path: &Path, opts: &InspectOptions) -> Result<InspectReport, CirclegenError> {
    let mut report = InspectReport {
        path: path.to_path_buf(),
        bar_width: opts.bar_width,
        ..Default::default()
    };
    let mut labels: BTreeMap<String, usize> = BTreeMap::new();
    let mut sizes: BTreeMap<(u32, u32), usize> = BTreeMap::new();

    for record in read_all_records(path)? {
        let payload = record?;
        report.records += 1;
        report.payload_bytes += payload.len() as u64;

        let features = match feature::decode(&payload) {
            Ok(features) => features,
            Err(err) => {
                debug!(record = report.records - 1, error = %err, "undecodable payload");
                report.malformed += 1;
                continue;
            }
        };
        let example = match TrainingExample::from_feature_map(&features) {
            Ok(example) => example,
            Err(err) => {
                debug!(record = report.records - 1, error = %err, "incomplete example");
                report.invalid += 1;
                continue;
            }
        };

        report.examples += 1;
        report.total_boxes += example.box_count();
        *sizes.entry((example.width, example.height)).or_default() += 1;
        for text in example.texts {
            *labels.entry(text).or_default() += 1;
        }
    }

    let mut labels: Vec<LabelCount> = labels
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    labels.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    report.labels = labels;

    report.image_sizes = sizes
        .into_iter()
        .map(|((width, height), count)| ImageSizeCount {
            width,
            height,
            count,
        })
        .collect();

    Ok(report)
}
