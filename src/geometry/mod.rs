//! Rejection sampling of non-overlapping circles on a fixed canvas.
//!
//! The generator is driven entirely by the random source it is handed, so a
//! seeded `StdRng` reproduces the same circle set for the same parameters.

use rand::Rng;

use crate::error::CirclegenError;
use crate::ir::Circle;

/// Knobs for [`generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorConfig {
    /// Smallest radius drawn, in pixels.
    pub min_radius: u32,
    /// Largest radius drawn. `None` means a quarter of the shorter canvas side.
    pub max_radius: Option<u32>,
    /// Extra clearance required between two circle rims.
    pub margin: f32,
    /// Consecutive rejected candidates after which generation gives up.
    pub max_attempts: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_radius: 5,
            max_radius: None,
            margin: 1.0,
            max_attempts: 1000,
        }
    }
}

impl GeneratorConfig {
    /// The inclusive radius range used on a `width` x `height` canvas.
    ///
    /// The upper bound never exceeds half the shorter side, so every drawn
    /// radius leaves room for a centre. Returns `None` when the range is empty.
    pub fn radius_range(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let short_side = width.min(height);
        let max = self
            .max_radius
            .unwrap_or(short_side / 4)
            .min(short_side / 2);
        (self.min_radius <= max).then_some((self.min_radius, max))
    }

    /// Reject configurations that can never place a circle.
    pub fn validate(&self, width: u32, height: u32) -> Result<(), CirclegenError> {
        if width == 0 || height == 0 {
            return Err(CirclegenError::InvalidGenerateParams {
                message: format!("canvas must be non-empty, got {width}x{height}"),
            });
        }
        if self.min_radius == 0 {
            return Err(CirclegenError::InvalidGenerateParams {
                message: "minimum radius must be at least 1 pixel".to_string(),
            });
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(CirclegenError::InvalidGenerateParams {
                message: format!("margin must be a non-negative number, got {}", self.margin),
            });
        }
        if self.max_attempts == 0 {
            return Err(CirclegenError::InvalidGenerateParams {
                message: "max attempts must be greater than 0".to_string(),
            });
        }
        if self.radius_range(width, height).is_none() {
            return Err(CirclegenError::InvalidGenerateParams {
                message: format!(
                    "minimum radius {} does not fit a {width}x{height} canvas (max radius {})",
                    self.min_radius,
                    self.max_radius.unwrap_or(width.min(height) / 4)
                ),
            });
        }
        Ok(())
    }
}

/// The circles placed for one image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Placement {
    pub circles: Vec<Circle>,
    /// How many circles were asked for.
    pub requested: usize,
    /// Total candidates rejected for colliding.
    pub rejections: usize,
}

/// Fewer circles were placed than requested. Informational, never fatal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationIncomplete {
    pub requested: usize,
    pub placed: usize,
}

impl Placement {
    pub fn is_complete(&self) -> bool {
        self.circles.len() >= self.requested
    }

    pub fn shortfall(&self) -> Option<GenerationIncomplete> {
        (!self.is_complete()).then_some(GenerationIncomplete {
            requested: self.requested,
            placed: self.circles.len(),
        })
    }
}

/// Place up to `target_count` non-overlapping circles on the canvas.
///
/// Candidates draw a whole-pixel radius from the configured range and a
/// centre that keeps the circle inside the canvas. A candidate closer to any
/// placed circle than the sum of both radii plus `margin` is rejected.
/// Generation stops once `target_count` circles are placed or
/// `max_attempts` candidates in a row were rejected; the second case yields
/// a short [`Placement`], not an error.
pub fn generate<R: Rng + ?Sized>(
    canvas_width: u32,
    canvas_height: u32,
    target_count: usize,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Placement {
    let mut placement = Placement {
        circles: Vec::with_capacity(target_count),
        requested: target_count,
        rejections: 0,
    };

    let Some((min_radius, max_radius)) = config.radius_range(canvas_width, canvas_height) else {
        return placement;
    };

    let mut consecutive_rejections = 0usize;
    while placement.circles.len() < target_count && consecutive_rejections < config.max_attempts {
        let r = rng.random_range(min_radius..=max_radius);
        let x = rng.random_range(r..=canvas_width - r);
        let y = rng.random_range(r..=canvas_height - r);
        let candidate = Circle::new(x as f32, y as f32, r as f32);

        let collides = placement
            .circles
            .iter()
            .any(|placed| placed.collides_with(&candidate, config.margin));

        if collides {
            consecutive_rejections += 1;
            placement.rejections += 1;
            continue;
        }

        consecutive_rejections = 0;
        placement.circles.push(candidate);
    }

    placement
}
