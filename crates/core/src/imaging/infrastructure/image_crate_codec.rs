use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

use crate::imaging::domain::image_decoder::ImageDecoder;
use crate::imaging::domain::image_encoder::{EncodeFormat, ImageEncoder};
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("frame buffer does not match its dimensions")]
    InvalidBuffer,
}

/// Codec backed by the pure-Rust `image` crate.
///
/// Decodes any container the crate's default features support (JPEG, PNG,
/// BMP, WebP, TIFF, ...) and always converts to RGB8.
#[derive(Default)]
pub struct ImageCrateCodec;

impl ImageCrateCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageCrateCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Frame, Box<dyn std::error::Error>> {
        let rgb = image::load_from_memory(bytes)
            .map_err(CodecError::Decode)?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Frame::new(rgb.into_raw(), width, height, 3))
    }
}

impl ImageEncoder for ImageCrateCodec {
    fn encode(
        &self,
        frame: &Frame,
        format: EncodeFormat,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let img = to_rgb_image(frame)?;
        let target = match format {
            EncodeFormat::Png => ImageFormat::Png,
            EncodeFormat::Jpeg => ImageFormat::Jpeg,
        };

        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), target)
            .map_err(CodecError::Encode)?;
        Ok(buf)
    }
}

/// Proportionally shrinks a frame so its longest edge is at most `max_edge`.
///
/// Frames already within the cap are returned unchanged. Keeps inference
/// time bounded for very large uploads.
pub fn downscale_to_fit(frame: Frame, max_edge: u32) -> Result<Frame, CodecError> {
    let longest = frame.longest_edge();
    if longest <= max_edge || max_edge == 0 {
        return Ok(frame);
    }

    let scale = max_edge as f64 / longest as f64;
    let new_w = ((frame.width() as f64 * scale) as u32).max(1);
    let new_h = ((frame.height() as f64 * scale) as u32).max(1);

    let img = to_rgb_image(&frame)?;
    let resized = image::imageops::resize(&img, new_w, new_h, FilterType::Triangle);
    Ok(Frame::new(resized.into_raw(), new_w, new_h, 3))
}

fn to_rgb_image(frame: &Frame) -> Result<RgbImage, CodecError> {
    RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or(CodecError::InvalidBuffer)
}
