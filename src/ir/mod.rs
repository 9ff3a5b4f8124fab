//! Shared data model and on-disk annotation formats.
//!
//! Geometry is kept in two coordinate spaces, pixel and normalized, tagged
//! at the type level so that a pixel box can never be written into a feature
//! list that expects fractions of the canvas.
//!
//! # Example
//!
//! ```
//! use circlegen::ir::{BBoxXYXY, BoundingBox, Circle, Pixel};
//!
//! let circle = Circle::new(64.0, 64.0, 10.0);
//! let bbox = BoundingBox::circle(circle.enclosing_box());
//! let norm = bbox.normalized(128.0, 128.0);
//! assert!((norm.xmin() - 0.421875).abs() < 1e-6);
//! # let _: BBoxXYXY<Pixel> = bbox.bbox;
//! ```

mod bbox;
mod coord;
mod ids;
pub mod io_voc_xml;
pub mod label_map;
mod model;

pub use bbox::BBoxXYXY;
pub use coord::{Coord, Normalized, Pixel};
pub use ids::ImageName;
pub use model::{BoundingBox, Circle, CIRCLE_CLASS_ID, CIRCLE_CLASS_NAME};
