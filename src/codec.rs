//! Image decode/encode for request payloads.
//!
//! Pixel buffers are `image::RgbImage`: 8-bit samples in R, G, B order.
//! Any alpha channel in the upload is dropped on decode.

use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

pub const PNG_MIME: &str = "image/png";

pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes).with_context(|| "failed to decode image")?;
    Ok(image.to_rgb8())
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image.clone())
        .write_to(&mut buffer, ImageFormat::Png)
        .with_context(|| "failed to encode PNG")?;
    Ok(buffer.into_inner())
}
