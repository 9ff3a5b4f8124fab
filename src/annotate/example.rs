//! Typed view over a decoded example, as handed to training code.

use super::keys;
use crate::error::CirclegenError;
use crate::feature::{Feature, FeatureMap};
use crate::ir::{BBoxXYXY, Normalized};

/// One decoded training example.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingExample {
    pub image: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<BBoxXYXY<Normalized>>,
    pub labels: Vec<i64>,
    pub texts: Vec<String>,
}

impl TrainingExample {
    /// Extract the image and box lists from `features`.
    ///
    /// Every box list must have the same length; `image/circle_count`, when
    /// present, must agree with it.
    pub fn from_feature_map(features: &FeatureMap) -> Result<Self, CirclegenError> {
        let image = single(bytes_list(features, keys::IMAGE_ENCODED)?, keys::IMAGE_ENCODED)?.clone();
        let width = dimension(features, keys::IMAGE_WIDTH)?;
        let height = dimension(features, keys::IMAGE_HEIGHT)?;

        let xmin = float_list(features, keys::BBOX_XMIN)?;
        let ymin = float_list(features, keys::BBOX_YMIN)?;
        let xmax = float_list(features, keys::BBOX_XMAX)?;
        let ymax = float_list(features, keys::BBOX_YMAX)?;
        let labels = int64_list(features, keys::CLASS_LABEL)?.to_vec();
        let texts: Vec<String> = bytes_list(features, keys::CLASS_TEXT)?
            .iter()
            .map(|raw| String::from_utf8_lossy(raw).into_owned())
            .collect();

        let count = xmin.len();
        let lengths = [ymin.len(), xmax.len(), ymax.len(), labels.len(), texts.len()];
        if lengths.iter().any(|&len| len != count) {
            return Err(CirclegenError::ExampleShapeMismatch {
                message: format!(
                    "box lists differ in length: xmin={count}, ymin={}, xmax={}, ymax={}, label={}, text={}",
                    lengths[0], lengths[1], lengths[2], lengths[3], lengths[4]
                ),
            });
        }

        if let Some(feature) = features.get(keys::CIRCLE_COUNT) {
            let declared = single(expect_int64(feature, keys::CIRCLE_COUNT)?, keys::CIRCLE_COUNT)?;
            if *declared != count as i64 {
                return Err(CirclegenError::ExampleShapeMismatch {
                    message: format!("{} is {declared} but {count} boxes are present", keys::CIRCLE_COUNT),
                });
            }
        }

        let boxes = (0..count)
            .map(|i| BBoxXYXY::from_xyxy(xmin[i], ymin[i], xmax[i], ymax[i]))
            .collect();

        Ok(Self {
            image,
            width,
            height,
            boxes,
            labels,
            texts,
        })
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }
}

fn get<'a>(features: &'a FeatureMap, key: &str) -> Result<&'a Feature, CirclegenError> {
    features
        .get(key)
        .ok_or_else(|| CirclegenError::ExampleMissingFeature {
            key: key.to_string(),
        })
}

fn wrong_type(key: &str, expected: &str, found: &Feature) -> CirclegenError {
    CirclegenError::ExampleShapeMismatch {
        message: format!("'{key}' should be a {expected}, found {}", found.kind_name()),
    }
}

fn bytes_list<'a>(features: &'a FeatureMap, key: &str) -> Result<&'a [Vec<u8>], CirclegenError> {
    let feature = get(features, key)?;
    feature
        .as_bytes_list()
        .ok_or_else(|| wrong_type(key, "bytes_list", feature))
}

fn float_list<'a>(features: &'a FeatureMap, key: &str) -> Result<&'a [f32], CirclegenError> {
    let feature = get(features, key)?;
    feature
        .as_float_list()
        .ok_or_else(|| wrong_type(key, "float_list", feature))
}

fn int64_list<'a>(features: &'a FeatureMap, key: &str) -> Result<&'a [i64], CirclegenError> {
    expect_int64(get(features, key)?, key)
}

fn expect_int64<'a>(feature: &'a Feature, key: &str) -> Result<&'a [i64], CirclegenError> {
    feature
        .as_int64_list()
        .ok_or_else(|| wrong_type(key, "int64_list", feature))
}

fn single<'a, T>(values: &'a [T], key: &str) -> Result<&'a T, CirclegenError> {
    match values {
        [value] => Ok(value),
        _ => Err(CirclegenError::ExampleShapeMismatch {
            message: format!("'{key}' should hold exactly one value, found {}", values.len()),
        }),
    }
}

fn dimension(features: &FeatureMap, key: &str) -> Result<u32, CirclegenError> {
    let value = *single(int64_list(features, key)?, key)?;
    u32::try_from(value).map_err(|_| CirclegenError::ExampleShapeMismatch {
        message: format!("'{key}' value {value} is not a valid dimension"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{build, build_example};
    use crate::ir::Circle;

    #[test]
    fn extracts_boxes_from_built_example() {
        let annotation = build(&[Circle::new(64.0, 64.0, 10.0), Circle::new(20.0, 20.0, 6.0)], 128, 128);
        let features = build_example(vec![9; 4], 128, 128, &annotation.boxes);

        let example = TrainingExample::from_feature_map(&features).expect("typed example");
        assert_eq!(example.image, vec![9; 4]);
        assert_eq!((example.width, example.height), (128, 128));
        assert_eq!(example.box_count(), 2);
        assert_eq!(example.labels, vec![1, 1]);
        assert_eq!(example.texts, vec!["circle", "circle"]);
        assert!(example.boxes.iter().all(|b| b.is_unit()));
    }

    #[test]
    fn missing_image_is_reported_by_key() {
        let mut features = build_example(Vec::new(), 32, 32, &[]);
        features.remove(keys::IMAGE_ENCODED);
        let err = TrainingExample::from_feature_map(&features).unwrap_err();
        assert!(matches!(err, CirclegenError::ExampleMissingFeature { key } if key == keys::IMAGE_ENCODED));
    }

    #[test]
    fn ragged_box_lists_are_rejected() {
        let annotation = build(&[Circle::new(16.0, 16.0, 5.0)], 64, 64);
        let mut features = build_example(Vec::new(), 64, 64, &annotation.boxes);
        features.insert(keys::BBOX_YMAX.to_string(), Feature::float_list([0.1, 0.2]));
        let err = TrainingExample::from_feature_map(&features).unwrap_err();
        assert!(matches!(err, CirclegenError::ExampleShapeMismatch { .. }));
    }

    #[test]
    fn wrong_variant_is_rejected() {
        let mut features = build_example(Vec::new(), 64, 64, &[]);
        features.insert(keys::IMAGE_WIDTH.to_string(), Feature::float_list([64.0]));
        let err = TrainingExample::from_feature_map(&features).unwrap_err();
        assert!(err.to_string().contains("int64_list"));
    }
}
