//! Axis-aligned boxes in XYXY form.

use super::coord::{Coord, Normalized, Pixel};

/// An axis-aligned bounding box stored as (xmin, ymin, xmax, ymax).
///
/// Construction does not enforce `min < max`. Degenerate boxes can exist so
/// that callers decide whether to drop them (see [`BBoxXYXY::is_degenerate`]).
#[derive(Clone, Copy, PartialEq)]
pub struct BBoxXYXY<TSpace> {
    pub min: Coord<TSpace>,
    pub max: Coord<TSpace>,
}

impl<TSpace> BBoxXYXY<TSpace> {
    #[inline]
    pub fn from_xyxy(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    #[inline]
    pub fn xmin(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn ymin(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn xmax(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn ymax(&self) -> f32 {
        self.max.y
    }

    /// May be negative if the box is malformed (xmax < xmin).
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// May be negative if the box is malformed (ymax < ymin).
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Returns true if the box has zero or negative extent on either axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl<TSpace> std::fmt::Debug for BBoxXYXY<TSpace> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}

impl<TSpace> Default for BBoxXYXY<TSpace> {
    fn default() -> Self {
        Self::from_xyxy(0.0, 0.0, 0.0, 0.0)
    }
}

impl BBoxXYXY<Pixel> {
    /// The square enclosing a circle of radius `r` centred at `(x, y)`.
    #[inline]
    pub fn enclosing_square(x: f32, y: f32, r: f32) -> Self {
        Self::from_xyxy(x - r, y - r, x + r, y + r)
    }

    /// Clamps the box into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, width: f32, height: f32) -> Self {
        Self::from_xyxy(
            self.min.x.clamp(0.0, width),
            self.min.y.clamp(0.0, height),
            self.max.x.clamp(0.0, width),
            self.max.y.clamp(0.0, height),
        )
    }

    /// Divides each coordinate by the matching image dimension.
    pub fn to_normalized(&self, image_width: f32, image_height: f32) -> BBoxXYXY<Normalized> {
        BBoxXYXY::from_xyxy(
            self.min.x / image_width,
            self.min.y / image_height,
            self.max.x / image_width,
            self.max.y / image_height,
        )
    }
}

impl BBoxXYXY<Normalized> {
    /// Returns true if every coordinate lies in `[0, 1]`.
    pub fn is_unit(&self) -> bool {
        [self.min.x, self.min.y, self.max.x, self.max.y]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}
