//! Text overlay extraction service.
//!
//! `/detect` finds text in an uploaded image and estimates each region's
//! text color, background color and font size. `/inpaint` erases a
//! rectangle from an image and returns the result as PNG.

pub mod analysis;
pub mod codec;
pub mod detection;
pub mod geometry;
pub mod inpaint;
pub mod logging;
pub mod ocr;
pub mod server;
pub mod settings;

#[cfg(test)]
mod test_util;

pub use analysis::{RegionAnalyzer, RegionStyle};
pub use detection::{DetectedRegion, detect_regions};
pub use geometry::{BBoxPx, Point, Quad};
pub use inpaint::{InpaintRect, erase_region};
pub use ocr::{OcrEngine, RawDetection, TesseractEngine};
pub use settings::Settings;
