//! Core shapes produced and consumed by the pipeline.

use super::bbox::BBoxXYXY;
use super::coord::{Coord, Normalized, Pixel};

/// Class name every generated shape is labelled with.
pub const CIRCLE_CLASS_NAME: &str = "circle";

/// Class id paired with [`CIRCLE_CLASS_NAME`] in the label map.
pub const CIRCLE_CLASS_ID: i64 = 1;

/// A placed circle, centre plus radius, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub r: f32,
}

impl Circle {
    #[inline]
    pub fn new(x: f32, y: f32, r: f32) -> Self {
        Self { x, y, r }
    }

    #[inline]
    pub fn center(&self) -> Coord<Pixel> {
        Coord::new(self.x, self.y)
    }

    /// Returns true if the two circles are closer than `r1 + r2 + margin`.
    pub fn collides_with(&self, other: &Circle, margin: f32) -> bool {
        let min_dist = self.r + other.r + margin;
        self.center().distance_squared(&other.center()) < min_dist * min_dist
    }

    /// The square enclosing this circle, unclamped.
    #[inline]
    pub fn enclosing_box(&self) -> BBoxXYXY<Pixel> {
        BBoxXYXY::enclosing_square(self.x, self.y, self.r)
    }
}

/// A labelled box in pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub bbox: BBoxXYXY<Pixel>,
    pub label: String,
    pub class_id: i64,
    /// Detector score; generated ground truth is always `1.0`.
    pub confidence: f32,
}

impl BoundingBox {
    pub fn new(bbox: BBoxXYXY<Pixel>, label: impl Into<String>, class_id: i64) -> Self {
        Self {
            bbox,
            label: label.into(),
            class_id,
            confidence: 1.0,
        }
    }

    /// A box carrying the default circle class.
    pub fn circle(bbox: BBoxXYXY<Pixel>) -> Self {
        Self::new(bbox, CIRCLE_CLASS_NAME, CIRCLE_CLASS_ID)
    }

    #[inline]
    pub fn normalized(&self, image_width: f32, image_height: f32) -> BBoxXYXY<Normalized> {
        self.bbox.to_normalized(image_width, image_height)
    }

    /// Centre point, truncated to whole pixels.
    pub fn center(&self) -> (i32, i32) {
        let xmin = self.bbox.xmin() as i32;
        let ymin = self.bbox.ymin() as i32;
        let width = self.bbox.width() as i32;
        let height = self.bbox.height() as i32;
        (xmin + width / 2, ymin + height / 2)
    }
}
