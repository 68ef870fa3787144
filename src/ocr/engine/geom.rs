use crate::geometry::BBoxPx;

pub(super) fn union_bbox(a: &BBoxPx, b: &BBoxPx) -> BBoxPx {
    let x1 = a.x.min(b.x);
    let y1 = a.y.min(b.y);
    let x2 = (a.x + a.width).max(b.x + b.width);
    let y2 = (a.y + a.height).max(b.y + b.height);
    BBoxPx {
        x: x1,
        y: y1,
        width: x2 - x1,
        height: y2 - y1,
    }
}

pub(super) fn center_y(bbox: &BBoxPx) -> f32 {
    bbox.y as f32 + bbox.height as f32 * 0.5
}
