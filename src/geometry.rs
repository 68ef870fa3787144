use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Corner points ordered top-left, top-right, bottom-right, bottom-left.
pub type Quad = [Point; 4];

/// Axis-aligned pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BBoxPx {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BBoxPx {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub fn quad_from_bbox(bbox: &BBoxPx) -> Quad {
    let left = bbox.x as f32;
    let top = bbox.y as f32;
    let right = (bbox.x + bbox.width) as f32;
    let bottom = (bbox.y + bbox.height) as f32;
    [
        Point::new(left, top),
        Point::new(right, top),
        Point::new(right, bottom),
        Point::new(left, bottom),
    ]
}

/// Reduces a detector quadrilateral to an axis-aligned box clamped into a
/// `width` x `height` image.
///
/// The origin is taken from the left and top edges, the extent from the
/// right and bottom edges. Clamping moves the origin into the image and
/// trims the extent to the image border; it does not shrink the extent by
/// the amount the origin moved. The result may be empty for degenerate,
/// non-finite or out-of-bounds quads; an empty box may sit on the far edge
/// (`x == width` or `y == height`).
pub fn normalize_quad(quad: &Quad, width: u32, height: u32) -> BBoxPx {
    let [top_left, top_right, bottom_right, bottom_left] = quad;
    let x = top_left.x.min(bottom_left.x).floor() as i64;
    let y = top_left.y.min(top_right.y).floor() as i64;
    let w = (top_right.x.max(bottom_right.x).ceil() as i64).saturating_sub(x);
    let h = (bottom_left.y.max(bottom_right.y).ceil() as i64).saturating_sub(y);

    let image_w = i64::from(width);
    let image_h = i64::from(height);
    let x = x.clamp(0, image_w);
    let y = y.clamp(0, image_h);
    let w = w.min(image_w - x).max(0);
    let h = h.min(image_h - y).max(0);

    BBoxPx {
        x: x as u32,
        y: y as u32,
        width: w as u32,
        height: h as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(points: [(f32, f32); 4]) -> Quad {
        points.map(|(x, y)| Point::new(x, y))
    }

    fn assert_inside(bbox: &BBoxPx, width: u32, height: u32) {
        assert!(bbox.x + bbox.width <= width, "{bbox:?} exceeds width {width}");
        assert!(bbox.y + bbox.height <= height, "{bbox:?} exceeds height {height}");
    }

    #[test]
    fn axis_aligned_quad_maps_directly() {
        let bbox = normalize_quad(
            &quad([(10.0, 5.0), (50.0, 5.0), (50.0, 25.0), (10.0, 25.0)]),
            200,
            60,
        );
        assert_eq!(
            bbox,
            BBoxPx {
                x: 10,
                y: 5,
                width: 40,
                height: 20
            }
        );
    }

    #[test]
    fn rotated_quad_uses_outer_extent_with_floor_and_ceil() {
        let bbox = normalize_quad(
            &quad([(10.7, 6.2), (40.2, 4.9), (41.1, 20.3), (9.4, 21.0)]),
            200,
            60,
        );
        assert_eq!(bbox.x, 9);
        assert_eq!(bbox.y, 4);
        assert_eq!(bbox.width, 42 - 9);
        assert_eq!(bbox.height, 21 - 4);
    }

    #[test]
    fn negative_origin_is_clamped_and_extent_trimmed() {
        let bbox = normalize_quad(
            &quad([(-5.0, -3.0), (20.0, -3.0), (20.0, 10.0), (-5.0, 10.0)]),
            16,
            8,
        );
        assert_eq!(bbox.x, 0);
        assert_eq!(bbox.y, 0);
        assert_eq!(bbox.width, 16);
        assert_eq!(bbox.height, 8);
        assert_inside(&bbox, 16, 8);
    }

    #[test]
    fn quad_past_the_border_is_empty() {
        let bbox = normalize_quad(
            &quad([(300.0, 10.0), (320.0, 10.0), (320.0, 20.0), (300.0, 20.0)]),
            200,
            60,
        );
        assert!(bbox.is_empty());
        assert_inside(&bbox, 200, 60);
    }

    #[test]
    fn box_past_the_border_sits_on_the_far_edge() {
        let bbox = normalize_quad(
            &quad([(8.0, 1.0), (12.0, 1.0), (12.0, 2.0), (8.0, 2.0)]),
            5,
            3,
        );
        assert_eq!(
            bbox,
            BBoxPx {
                x: 5,
                y: 1,
                width: 0,
                height: 1
            }
        );
    }

    #[test]
    fn huge_and_infinite_quads_cover_the_image() {
        for extent in [1.0e30f32, f32::INFINITY] {
            let bbox = normalize_quad(
                &quad([
                    (-extent, -extent),
                    (extent, -extent),
                    (extent, extent),
                    (-extent, extent),
                ]),
                5,
                3,
            );
            assert_eq!(
                bbox,
                BBoxPx {
                    x: 0,
                    y: 0,
                    width: 5,
                    height: 3
                },
                "extent {extent}"
            );
        }
    }

    #[test]
    fn nan_quad_is_empty() {
        let bbox = normalize_quad(&quad([(f32::NAN, f32::NAN); 4]), 5, 3);
        assert!(bbox.is_empty());
        assert_inside(&bbox, 5, 3);
    }

    #[test]
    fn inverted_quad_is_empty() {
        let bbox = normalize_quad(
            &quad([(30.0, 30.0), (10.0, 30.0), (10.0, 10.0), (30.0, 10.0)]),
            200,
            60,
        );
        assert!(bbox.is_empty());
    }

    #[test]
    fn clamped_boxes_always_fit() {
        let (width, height) = (37u32, 23u32);
        for offset in [-50.0f32, -7.5, 0.0, 3.3, 20.0, 36.9, 80.0] {
            for size in [0.0f32, 1.0, 12.4, 40.0, 200.0] {
                let q = quad([
                    (offset, offset / 2.0),
                    (offset + size, offset / 2.0),
                    (offset + size, offset / 2.0 + size / 2.0),
                    (offset, offset / 2.0 + size / 2.0),
                ]);
                assert_inside(&normalize_quad(&q, width, height), width, height);
            }
        }
    }

    #[test]
    fn quad_from_bbox_round_trips_through_normalize() {
        let bbox = BBoxPx {
            x: 3,
            y: 4,
            width: 10,
            height: 6,
        };
        assert_eq!(normalize_quad(&quad_from_bbox(&bbox), 100, 100), bbox);
    }
}
