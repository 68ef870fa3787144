//! Text/background color and font size estimation for a detected region.
//!
//! The crop is split into two color clusters. The cluster with fewer pixels
//! is taken to be the text. That holds for thin strokes inside a tight box
//! and inverts for large bold glyphs that cover most of their box; the
//! result is a best guess, not a classification.

mod color;
mod kmeans;

use anyhow::{Result, bail};
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::warn;

use crate::settings::AnalysisSettings;

use kmeans::{KMeansParams, Rgb, two_means};

pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

const DEFAULT_SIZE_RATIO: f32 = 0.8;
const INK_HEIGHT_RATIO: f32 = 1.1;
const MIN_FONT_SIZE: u32 = 4;
const MAX_SIZE_RATIO: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionStyle {
    pub text_color: String,
    pub background_color: String,
    pub font_size: u32,
}

impl RegionStyle {
    /// Black on white at 80% of the region height.
    pub fn fallback(height: u32) -> Self {
        Self {
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            font_size: default_font_size(height),
        }
    }
}

pub fn default_font_size(height: u32) -> u32 {
    let height = height.max(1) as f32;
    (height * DEFAULT_SIZE_RATIO).round().max(1.0) as u32
}

#[derive(Debug, Clone, Copy)]
pub struct RegionAnalyzer {
    params: KMeansParams,
    seed: u64,
}

impl Default for RegionAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisSettings::default())
    }
}

impl RegionAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self {
            params: KMeansParams {
                attempts: settings.attempts,
                max_iterations: settings.max_iterations,
                epsilon: settings.epsilon,
            },
            seed: settings.seed,
        }
    }

    /// Never fails: any problem with the crop yields [`RegionStyle::fallback`].
    pub fn analyze(&self, crop: &RgbImage) -> RegionStyle {
        match self.try_analyze(crop) {
            Ok(style) => style,
            Err(err) => {
                warn!(
                    width = crop.width(),
                    height = crop.height(),
                    "region analysis failed: {:#}",
                    err
                );
                RegionStyle::fallback(crop.height())
            }
        }
    }

    fn try_analyze(&self, crop: &RgbImage) -> Result<RegionStyle> {
        let (width, height) = crop.dimensions();
        if width == 0 || height == 0 {
            bail!("empty crop");
        }
        let samples: Vec<Rgb> = crop.pixels().map(|pixel| pixel.0.map(f32::from)).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let clusters = two_means(&samples, self.params, &mut rng)?;

        let counts = clusters.counts();
        let text_label = if counts[0] > counts[1] { 1 } else { 0 };
        if counts[text_label] == 0 {
            bail!("no pixels assigned to the text cluster");
        }

        Ok(RegionStyle {
            text_color: color::hex_color(&clusters.centers[text_label]),
            background_color: color::hex_color(&clusters.centers[1 - text_label]),
            font_size: estimate_font_size(&clusters.labels, text_label as u8, width, height),
        })
    }
}

fn estimate_font_size(labels: &[u8], text_label: u8, width: u32, height: u32) -> u32 {
    let mut rows = labels
        .chunks(width as usize)
        .enumerate()
        .filter(|(_, row)| row.contains(&text_label))
        .map(|(y, _)| y);
    let Some(min_y) = rows.next() else {
        return default_font_size(height);
    };
    let max_y = rows.last().unwrap_or(min_y);
    let ink_height = (max_y - min_y) as f32;
    let candidate = (ink_height * INK_HEIGHT_RATIO) as u32;
    if candidate > MIN_FONT_SIZE && candidate as f32 <= height as f32 * MAX_SIZE_RATIO {
        candidate
    } else {
        default_font_size(height)
    }
}
