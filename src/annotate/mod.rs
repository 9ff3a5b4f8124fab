//! Turns placed circles into boxes and example features.
//!
//! The box lists of every emitted [`FeatureMap`] are parallel: `xmin`,
//! `ymin`, `xmax`, `ymax`, `class/label` and `class/text` always hold one
//! entry per box, in the same order.

mod example;

pub use example::TrainingExample;

use crate::feature::{Feature, FeatureMap};
use crate::ir::{BoundingBox, Circle};

/// Feature keys shared by the writer and every consumer of the containers.
pub mod keys {
    pub const IMAGE_ENCODED: &str = "image/encoded";
    pub const IMAGE_HEIGHT: &str = "image/height";
    pub const IMAGE_WIDTH: &str = "image/width";
    pub const BBOX_XMIN: &str = "image/object/bbox/xmin";
    pub const BBOX_YMIN: &str = "image/object/bbox/ymin";
    pub const BBOX_XMAX: &str = "image/object/bbox/xmax";
    pub const BBOX_YMAX: &str = "image/object/bbox/ymax";
    pub const CLASS_TEXT: &str = "image/object/class/text";
    pub const CLASS_LABEL: &str = "image/object/class/label";
    pub const CIRCLE_COUNT: &str = "image/circle_count";
}

/// Boxes for one image together with their feature-list fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub boxes: Vec<BoundingBox>,
    pub features: FeatureMap,
}

/// Box every circle with its enclosing square, clamped to the image.
///
/// Boxes that collapse to zero width or height after clamping are dropped,
/// so `boxes.len()` may be smaller than `circles.len()`.
pub fn build(circles: &[Circle], image_width: u32, image_height: u32) -> Annotation {
    let (w, h) = (image_width as f32, image_height as f32);
    let boxes: Vec<BoundingBox> = circles
        .iter()
        .map(|circle| circle.enclosing_box().clamp_to(w, h))
        .filter(|bbox| !bbox.is_degenerate())
        .map(BoundingBox::circle)
        .collect();

    let features = box_features(&boxes, image_width, image_height);
    Annotation { boxes, features }
}

/// The parallel box lists for `boxes`, normalized by the image size.
///
/// Degenerate boxes are skipped.
pub fn box_features(boxes: &[BoundingBox], image_width: u32, image_height: u32) -> FeatureMap {
    let (w, h) = (image_width as f32, image_height as f32);
    let kept: Vec<&BoundingBox> = boxes.iter().filter(|b| !b.bbox.is_degenerate()).collect();
    let normalized: Vec<_> = kept.iter().map(|b| b.normalized(w, h)).collect();

    FeatureMap::from([
        (
            keys::BBOX_XMIN.to_string(),
            Feature::float_list(normalized.iter().map(|b| b.xmin())),
        ),
        (
            keys::BBOX_YMIN.to_string(),
            Feature::float_list(normalized.iter().map(|b| b.ymin())),
        ),
        (
            keys::BBOX_XMAX.to_string(),
            Feature::float_list(normalized.iter().map(|b| b.xmax())),
        ),
        (
            keys::BBOX_YMAX.to_string(),
            Feature::float_list(normalized.iter().map(|b| b.ymax())),
        ),
        (
            keys::CLASS_TEXT.to_string(),
            Feature::strings(kept.iter().map(|b| b.label.as_str())),
        ),
        (
            keys::CLASS_LABEL.to_string(),
            Feature::int64_list(kept.iter().map(|b| b.class_id)),
        ),
    ])
}

/// The full feature map for one encoded image and its boxes.
pub fn build_example(
    image_bytes: Vec<u8>,
    image_width: u32,
    image_height: u32,
    boxes: &[BoundingBox],
) -> FeatureMap {
    let mut features = box_features(boxes, image_width, image_height);
    let box_count = features
        .get(keys::CLASS_LABEL)
        .map(Feature::len)
        .unwrap_or_default();

    features.insert(
        keys::IMAGE_ENCODED.to_string(),
        Feature::BytesList(vec![image_bytes]),
    );
    features.insert(
        keys::IMAGE_HEIGHT.to_string(),
        Feature::int64(i64::from(image_height)),
    );
    features.insert(
        keys::IMAGE_WIDTH.to_string(),
        Feature::int64(i64::from(image_width)),
    );
    features.insert(
        keys::CIRCLE_COUNT.to_string(),
        Feature::int64(box_count as i64),
    );
    features
}
