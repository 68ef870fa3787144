//! Text detection behind a single-call interface.

mod engine;

use anyhow::Result;
use image::RgbImage;

use crate::geometry::Quad;

pub use engine::TesseractEngine;

/// One detector hit: corner points (TL, TR, BR, BL), the transcribed text
/// and a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub quad: Quad,
    pub text: String,
    pub confidence: f32,
}

/// A loaded text detector.
///
/// Implementations are created once at startup and shared between
/// concurrent requests, so `detect` takes `&self`.
pub trait OcrEngine: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}
