//! Typed feature lists and the example codec.
//!
//! A [`FeatureMap`] describes exactly one image: every key maps to a
//! [`Feature`] holding a list of byte blobs, 64-bit integers, or 32-bit
//! floats. [`encode`] and [`decode`] turn a map into the serialized example
//! bytes stored inside each container record.

mod codec;
pub mod proto;

pub use codec::{decode, encode};

use std::collections::BTreeMap;

/// Feature maps are keyed by unique strings such as `image/encoded`.
///
/// Key order carries no meaning; a `BTreeMap` keeps encoding deterministic.
pub type FeatureMap = BTreeMap<String, Feature>;

/// A typed list of values. The variant is fixed at construction; the list may be empty.
#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    BytesList(Vec<Vec<u8>>),
    Int64List(Vec<i64>),
    FloatList(Vec<f32>),
}

impl Feature {
    /// A single byte blob.
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Feature::BytesList(vec![value.into()])
    }

    /// UTF-8 strings stored as byte blobs.
    pub fn strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Feature::BytesList(
            values
                .into_iter()
                .map(|s| s.as_ref().as_bytes().to_vec())
                .collect(),
        )
    }

    /// A single integer.
    pub fn int64(value: i64) -> Self {
        Feature::Int64List(vec![value])
    }

    pub fn int64_list(values: impl IntoIterator<Item = i64>) -> Self {
        Feature::Int64List(values.into_iter().collect())
    }

    pub fn float_list(values: impl IntoIterator<Item = f32>) -> Self {
        Feature::FloatList(values.into_iter().collect())
    }

    /// Number of values in the list, whatever its type.
    pub fn len(&self) -> usize {
        match self {
            Feature::BytesList(values) => values.len(),
            Feature::Int64List(values) => values.len(),
            Feature::FloatList(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the active variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Feature::BytesList(_) => "bytes_list",
            Feature::Int64List(_) => "int64_list",
            Feature::FloatList(_) => "float_list",
        }
    }

    pub fn as_bytes_list(&self) -> Option<&[Vec<u8>]> {
        match self {
            Feature::BytesList(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_int64_list(&self) -> Option<&[i64]> {
        match self {
            Feature::Int64List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_float_list(&self) -> Option<&[f32]> {
        match self {
            Feature::FloatList(values) => Some(values),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_pick_the_right_variant() {
        assert_eq!(Feature::int64(128), Feature::Int64List(vec![128]));
        assert_eq!(
            Feature::strings(["circle", "circle"]),
            Feature::BytesList(vec![b"circle".to_vec(), b"circle".to_vec()])
        );
        assert_eq!(Feature::bytes(vec![1u8, 2]).len(), 1);
        assert!(Feature::float_list(Vec::new()).is_empty());
    }

    #[test]
    fn accessors_only_match_their_variant() {
        let floats = Feature::float_list([0.5, 0.25]);
        assert_eq!(floats.as_float_list(), Some(&[0.5, 0.25][..]));
        assert_eq!(floats.as_int64_list(), None);
        assert_eq!(floats.kind_name(), "float_list");
    }
}
