mod geom;
mod parse;
mod preprocess;
mod tesseract;
mod text;

use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage};
use std::io::Write;
use tracing::{debug, info};

use crate::geometry::quad_from_bbox;

use super::{OcrEngine, RawDetection};

/// Runs the `tesseract` command line tool once per recognition pass.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    languages: String,
    psm: u32,
    invert_retry: bool,
}

impl TesseractEngine {
    /// Resolves `languages` against the installed traineddata up front so
    /// configuration mistakes surface at startup rather than per request.
    pub fn new(languages: &str, psm: u32, invert_retry: bool) -> Result<Self> {
        let languages = tesseract::normalize_ocr_languages(languages)?;
        info!(%languages, psm, invert_retry, "tesseract engine ready");
        Ok(Self {
            languages,
            psm,
            invert_retry,
        })
    }

    fn recognize(&self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        let mut tmp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .with_context(|| "failed to create temp file for OCR")?;
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut tmp, image::ImageFormat::Png)
            .with_context(|| "failed to write temp image for OCR")?;
        tmp.flush().ok();

        let tsv = tesseract::run_tesseract_tsv(tmp.path(), &self.languages, self.psm)?;
        Ok(detections_from_tsv(&tsv))
    }
}

impl OcrEngine for TesseractEngine {
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        detect_with_retry(image, self.invert_retry, |pass| self.recognize(pass))
    }
}

fn detections_from_tsv(tsv: &str) -> Vec<RawDetection> {
    parse::parse_tsv_lines(tsv)
        .into_iter()
        .map(|line| RawDetection {
            quad: quad_from_bbox(&line.bbox),
            text: line.text,
            confidence: (line.conf / 100.0).clamp(0.0, 1.0),
        })
        .collect()
}

/// Runs `recognize` once, and again on the color negative when the first
/// pass finds nothing and `invert_retry` is set.
fn detect_with_retry<F>(
    image: &RgbImage,
    invert_retry: bool,
    mut recognize: F,
) -> Result<Vec<RawDetection>>
where
    F: FnMut(&RgbImage) -> Result<Vec<RawDetection>>,
{
    let detections = recognize(image)?;
    if !detections.is_empty() || !invert_retry {
        return Ok(detections);
    }
    debug!("no text found, retrying with inverted colors");
    recognize(&preprocess::invert(image))
}
