//! Rasterizing placed circles into ring images.

mod codec;

pub use codec::{ImageCodec, PngCodec};

use image::{Rgb, RgbImage};
use rand::Rng;

use crate::ir::Circle;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Stroke colour and width for one ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingStyle {
    pub color: Rgb<u8>,
    pub stroke_width: f32,
}

impl RingStyle {
    /// A random green/brown stroke, 1 to 4 pixels wide.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let color = Rgb([
            rng.random_range(60..160),
            rng.random_range(80..180),
            rng.random_range(30..100),
        ]);
        let stroke_width = rng.random_range(1..5) as f32;
        Self {
            color,
            stroke_width,
        }
    }
}

/// Draw every circle as an anti-aliased ring on a white canvas.
///
/// One [`RingStyle`] is drawn from `rng` per circle, in order.
pub fn render_rings<R: Rng + ?Sized>(
    circles: &[Circle],
    width: u32,
    height: u32,
    rng: &mut R,
) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    for circle in circles {
        let style = RingStyle::random(rng);
        draw_ring(&mut canvas, circle, style);
    }
    canvas
}

/// Stroke the outline of `circle` onto `canvas`, centred on its radius.
pub fn draw_ring(canvas: &mut RgbImage, circle: &Circle, style: RingStyle) {
    let half = style.stroke_width / 2.0;
    let reach = circle.r + half + 1.0;

    let x0 = (circle.x - reach).floor().max(0.0) as u32;
    let y0 = (circle.y - reach).floor().max(0.0) as u32;
    let x1 = ((circle.x + reach).ceil().max(0.0) as u32).min(canvas.width());
    let y1 = ((circle.y + reach).ceil().max(0.0) as u32).min(canvas.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - circle.x;
            let dy = py as f32 + 0.5 - circle.y;
            let distance = (dx * dx + dy * dy).sqrt();
            let coverage = (half + 0.5 - (distance - circle.r).abs()).clamp(0.0, 1.0);
            if coverage <= 0.0 {
                continue;
            }

            let pixel = canvas.get_pixel_mut(px, py);
            for channel in 0..3 {
                let under = pixel.0[channel] as f32;
                let over = style.color.0[channel] as f32;
                pixel.0[channel] = (under + (over - under) * coverage).round() as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_scene_is_white() {
        let img = render_rings(&[], 8, 4, &mut StdRng::seed_from_u64(0));
        assert_eq!(img.dimensions(), (8, 4));
        assert!(img.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn ring_marks_rim_but_not_centre() {
        let mut canvas = RgbImage::from_pixel(64, 64, BACKGROUND);
        let style = RingStyle {
            color: Rgb([100, 120, 50]),
            stroke_width: 2.0,
        };
        draw_ring(&mut canvas, &Circle::new(32.0, 32.0, 10.0), style);

        assert_eq!(*canvas.get_pixel(32, 32), BACKGROUND);
        assert_eq!(*canvas.get_pixel(41, 31), style.color);
        assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn ring_near_edge_is_clipped() {
        let mut canvas = RgbImage::from_pixel(16, 16, BACKGROUND);
        let style = RingStyle {
            color: Rgb([0, 0, 0]),
            stroke_width: 3.0,
        };
        draw_ring(&mut canvas, &Circle::new(2.0, 2.0, 6.0), style);
        assert_ne!(*canvas.get_pixel(7, 1), BACKGROUND);
    }

    #[test]
    fn styles_stay_in_palette() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let style = RingStyle::random(&mut rng);
            let [r, g, b] = style.color.0;
            assert!((60..160).contains(&r));
            assert!((80..180).contains(&g));
            assert!((30..100).contains(&b));
            assert!((1.0..5.0).contains(&style.stroke_width));
        }
    }
}
