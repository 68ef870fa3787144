//! Turns detector output into analyzed, client-ready regions.

use anyhow::{Context, Result};
use image::RgbImage;
use serde::Serialize;
use tracing::debug;

use crate::analysis::{RegionAnalyzer, RegionStyle};
use crate::geometry::{BBoxPx, normalize_quad};
use crate::ocr::{OcrEngine, RawDetection};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedRegion {
    pub id: String,
    pub text: String,
    #[serde(rename = "box")]
    pub bbox: BBoxPx,
    pub confidence: f32,
    pub font_size: u32,
    pub color: String,
    pub background_color: String,
}

pub fn detect_regions(
    engine: &dyn OcrEngine,
    analyzer: &RegionAnalyzer,
    image: &RgbImage,
) -> Result<Vec<DetectedRegion>> {
    let detections = engine
        .detect(image)
        .with_context(|| "text detection failed")?;
    Ok(build_regions(detections, analyzer, image))
}

/// Clamps each detection into the image and analyzes its pixels. Regions
/// that clamp to nothing keep their text and get the fallback style.
pub fn build_regions(
    detections: Vec<RawDetection>,
    analyzer: &RegionAnalyzer,
    image: &RgbImage,
) -> Vec<DetectedRegion> {
    let (width, height) = image.dimensions();
    detections
        .into_iter()
        .enumerate()
        .map(|(index, detection)| {
            let bbox = normalize_quad(&detection.quad, width, height);
            let style = if bbox.is_empty() {
                debug!(index, ?detection.quad, "detection clamps to an empty box");
                RegionStyle::fallback(bbox.height)
            } else {
                let crop =
                    image::imageops::crop_imm(image, bbox.x, bbox.y, bbox.width, bbox.height)
                        .to_image();
                analyzer.analyze(&crop)
            };
            debug!(
                index,
                text = %detection.text,
                ?bbox,
                font_size = style.font_size,
                color = %style.text_color,
                background = %style.background_color,
                "region analyzed"
            );
            DetectedRegion {
                id: index.to_string(),
                text: detection.text,
                bbox,
                confidence: sanitize_confidence(detection.confidence),
                font_size: style.font_size,
                color: style.text_color,
                background_color: style.background_color,
            }
        })
        .collect()
}

fn sanitize_confidence(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, quad_from_bbox};
    use crate::test_util::glyph_image;
    use anyhow::anyhow;

    struct FixedEngine(Vec<RawDetection>);

    impl OcrEngine for FixedEngine {
        fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenEngine;

    impl OcrEngine for BrokenEngine {
        fn detect(&self, _image: &RgbImage) -> Result<Vec<RawDetection>> {
            Err(anyhow!("model not loaded"))
        }
    }

    fn detection(quad: [(f32, f32); 4], text: &str, confidence: f32) -> RawDetection {
        RawDetection {
            quad: quad.map(|(x, y)| Point::new(x, y)),
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn analyzes_each_detection_in_order() {
        let image = glyph_image(200, 60, 90, 15);
        let engine = FixedEngine(vec![
            RawDetection {
                quad: quad_from_bbox(&BBoxPx {
                    x: 87,
                    y: 12,
                    width: 26,
                    height: 36,
                }),
                text: "A".to_string(),
                confidence: 0.93,
            },
            detection(
                [(250.0, 10.0), (260.0, 10.0), (260.0, 20.0), (250.0, 20.0)],
                "ghost",
                1.7,
            ),
        ]);
        let regions =
            detect_regions(&engine, &RegionAnalyzer::default(), &image).expect("regions");
        assert_eq!(regions.len(), 2);

        let glyph = &regions[0];
        assert_eq!(glyph.id, "0");
        assert_eq!(glyph.text, "A");
        assert_eq!(glyph.color, "#000000");
        assert_eq!(glyph.background_color, "#ffffff");
        assert_eq!(glyph.font_size, (29.0f32 * 1.1) as u32);
        assert_eq!(glyph.confidence, 0.93);

        let ghost = &regions[1];
        assert_eq!(ghost.id, "1");
        assert_eq!(ghost.text, "ghost");
        assert!(ghost.bbox.is_empty());
        assert_eq!(ghost.color, "#000000");
        assert_eq!(ghost.background_color, "#ffffff");
        assert_eq!(ghost.bbox.height, 10);
        assert_eq!(ghost.font_size, 8);
        assert_eq!(ghost.confidence, 1.0);
    }

    #[test]
    fn every_box_fits_the_image() {
        let image = glyph_image(64, 40, 5, 5);
        let detections = vec![
            detection([(50.0, 30.0), (90.0, 30.0), (90.0, 70.0), (50.0, 70.0)], "edge", 0.5),
            detection([(-4.0, 2.0), (10.0, 0.0), (12.0, 9.0), (-3.0, 11.0)], "tilt", 0.5),
            detection([(0.0, 0.0), (64.0, 0.0), (64.0, 40.0), (0.0, 40.0)], "all", 0.5),
        ];
        for region in build_regions(detections, &RegionAnalyzer::default(), &image) {
            let bbox = region.bbox;
            assert!(bbox.x + bbox.width <= 64, "{bbox:?}");
            assert!(bbox.y + bbox.height <= 40, "{bbox:?}");
            assert!(region.font_size >= 1);
        }
    }

    #[test]
    fn extreme_quads_still_yield_regions() {
        let image = RgbImage::from_pixel(5, 3, image::Rgb([255, 255, 255]));
        let detections = vec![
            detection(
                [(-1e30, -1e30), (1e30, -1e30), (1e30, 1e30), (-1e30, 1e30)],
                "huge",
                0.4,
            ),
            detection([(f32::NAN, f32::NAN); 4], "nan", f32::NAN),
        ];
        let regions = build_regions(detections, &RegionAnalyzer::default(), &image);
        assert_eq!(
            regions[0].bbox,
            BBoxPx {
                x: 0,
                y: 0,
                width: 5,
                height: 3
            }
        );
        assert_eq!(regions[0].font_size, 2);
        assert!(regions[1].bbox.is_empty());
        assert_eq!(regions[1].confidence, 0.0);
        assert_eq!(regions[1].font_size, 1);
    }

    #[test]
    fn engine_failure_is_propagated() {
        let image = glyph_image(40, 40, 5, 5);
        let err = detect_regions(&BrokenEngine, &RegionAnalyzer::default(), &image).unwrap_err();
        assert!(format!("{err:#}").contains("model not loaded"));
    }

    #[test]
    fn no_detections_means_no_regions() {
        let image = RgbImage::from_pixel(30, 30, image::Rgb([255, 255, 255]));
        let regions =
            detect_regions(&FixedEngine(Vec::new()), &RegionAnalyzer::default(), &image)
                .expect("regions");
        assert!(regions.is_empty());
    }

    #[test]
    fn serializes_with_client_field_names() {
        let region = DetectedRegion {
            id: "0".to_string(),
            text: "Sale".to_string(),
            bbox: BBoxPx {
                x: 4,
                y: 8,
                width: 40,
                height: 16,
            },
            confidence: 0.5,
            font_size: 13,
            color: "#102030".to_string(),
            background_color: "#fefefe".to_string(),
        };
        insta::assert_json_snapshot!(region, @r###"
        {
          "id": "0",
          "text": "Sale",
          "box": {
            "x": 4,
            "y": 8,
            "width": 40,
            "height": 16
          },
          "confidence": 0.5,
          "fontSize": 13,
          "color": "#102030",
          "backgroundColor": "#fefefe"
        }
        "###);
    }
}
