//! Partitioning generated images into training and validation subsets.

mod manifest;

pub use manifest::{
    list_images, read_manifest, write_manifest, DatasetManifest, TRAINVAL_FILE_NAME,
    TRAIN_FILE_NAME, VAL_FILE_NAME,
};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CirclegenError;
use crate::ir::ImageName;

/// How identifiers are ordered before the validation slice is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Order by embedded numeric suffix (`log_2` before `log_10`).
    Sorted,
    /// Shuffle with the caller's random source.
    #[default]
    Shuffled,
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitPolicy::Sorted => f.write_str("sorted"),
            SplitPolicy::Shuffled => f.write_str("shuffled"),
        }
    }
}

impl FromStr for SplitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" | "deterministic" => Ok(SplitPolicy::Sorted),
            "shuffled" | "random" => Ok(SplitPolicy::Shuffled),
            other => Err(format!(
                "unknown split policy '{other}' (supported: sorted, shuffled)"
            )),
        }
    }
}

/// Disjoint training and validation identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<ImageName>,
    pub val: Vec<ImageName>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of validation identifiers for `total` ids at `ratio`, rounded to nearest.
pub fn validation_count(total: usize, ratio: f64) -> usize {
    ((total as f64 * ratio).round() as usize).min(total)
}

/// Partition `ids` so that `round(len * ratio)` of them go to validation.
///
/// Under [`SplitPolicy::Sorted`] the ids are ordered by numeric suffix and
/// the first slice becomes validation; `rng` is not touched. Under
/// [`SplitPolicy::Shuffled`] the ids are shuffled with `rng` first. Repeated
/// ids are collapsed to their first occurrence before splitting.
pub fn split<R: Rng + ?Sized>(
    ids: &[ImageName],
    ratio: f64,
    policy: SplitPolicy,
    rng: &mut R,
) -> Result<Split, CirclegenError> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(CirclegenError::InvalidSplitRatio { ratio });
    }

    let mut seen = HashSet::with_capacity(ids.len());
    let mut ordered: Vec<ImageName> = ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();

    match policy {
        SplitPolicy::Sorted => {
            ordered.sort_by(|a, b| a.numeric_sort_key().cmp(&b.numeric_sort_key()));
        }
        SplitPolicy::Shuffled => ordered.shuffle(rng),
    }

    let val_count = validation_count(ordered.len(), ratio);
    let train = ordered.split_off(val_count);
    Ok(Split {
        train,
        val: ordered,
    })
}
