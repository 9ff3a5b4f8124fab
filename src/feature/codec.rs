use std::collections::btree_map::Entry;

use prost::Message;

use super::proto::{self, feature::Kind};
use super::{Feature, FeatureMap};
use crate::error::CirclegenError;

/// Serialize a feature map into example bytes.
///
/// Entries are emitted in key order, so equal maps always encode to equal bytes.
pub fn encode(features: &FeatureMap) -> Vec<u8> {
    let entries = features
        .iter()
        .map(|(key, feature)| proto::FeatureEntry {
            key: key.clone(),
            value: Some(to_proto(feature)),
        })
        .collect();

    proto::Example {
        features: Some(proto::Features { feature: entries }),
    }
    .encode_to_vec()
}

/// Parse example bytes back into a feature map.
///
/// Fails with [`CirclegenError::MalformedFeature`] when the bytes are not a
/// valid example, when an entry carries no recognised list type, or when a
/// key appears twice.
pub fn decode(bytes: &[u8]) -> Result<FeatureMap, CirclegenError> {
    let example = proto::Example::decode(bytes).map_err(|source| CirclegenError::MalformedFeature {
        reason: source.to_string(),
    })?;

    let mut features = FeatureMap::new();
    let entries = example.features.map(|f| f.feature).unwrap_or_default();

    for entry in entries {
        let feature = entry
            .value
            .and_then(|value| value.kind)
            .map(from_proto)
            .ok_or_else(|| CirclegenError::MalformedFeature {
                reason: format!("feature '{}' has no recognised list type", entry.key),
            })?;

        match features.entry(entry.key) {
            Entry::Occupied(occupied) => {
                return Err(CirclegenError::MalformedFeature {
                    reason: format!("duplicate feature key '{}'", occupied.key()),
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(feature);
            }
        }
    }

    Ok(features)
}

fn to_proto(feature: &Feature) -> proto::Feature {
    let kind = match feature {
        Feature::BytesList(values) => Kind::BytesList(proto::BytesList {
            value: values.clone(),
        }),
        Feature::Int64List(values) => Kind::Int64List(proto::Int64List {
            value: values.clone(),
        }),
        Feature::FloatList(values) => Kind::FloatList(proto::FloatList {
            value: values.clone(),
        }),
    };
    proto::Feature { kind: Some(kind) }
}

fn from_proto(kind: Kind) -> Feature {
    match kind {
        Kind::BytesList(list) => Feature::BytesList(list.value),
        Kind::Int64List(list) => Feature::Int64List(list.value),
        Kind::FloatList(list) => Feature::FloatList(list.value),
    }
}
