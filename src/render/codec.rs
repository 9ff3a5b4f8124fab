use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};

use crate::error::CirclegenError;

/// Encodes bitmaps to bytes and back.
///
/// The pipeline only needs the encoded bytes (stored verbatim in each
/// example) and the decoded dimensions; any lossless codec will do.
pub trait ImageCodec {
    /// File extension, without the dot, for images this codec writes.
    fn extension(&self) -> &'static str;

    fn encode(&self, image: &RgbImage) -> Result<Vec<u8>, CirclegenError>;

    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, CirclegenError>;
}

/// PNG via the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, image: &RgbImage) -> Result<Vec<u8>, CirclegenError> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|source| CirclegenError::ImageCodec {
                message: format!("PNG encode failed: {source}"),
            })?;
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<RgbImage, CirclegenError> {
        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(
            |source| CirclegenError::ImageCodec {
                message: format!("PNG decode failed: {source}"),
            },
        )?;
        Ok(decoded.to_rgb8())
    }
}
