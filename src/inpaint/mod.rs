//! Erasing a rectangle from an image by inpainting.

mod telea;

use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::settings::InpaintSettings;

pub const MASK_ERASE: u8 = 255;

/// Caller-supplied rectangle in image pixels. May extend past the image or
/// have non-positive extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InpaintRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Builds a `width` x `height` mask with `rect` grown by `padding` on every
/// side set to [`MASK_ERASE`].
///
/// The grown rectangle spans `x - padding ..= x + w + padding` (likewise
/// vertically) and is clipped to the canvas. A rectangle with non-positive
/// width or height, or one entirely outside the canvas, yields an all-zero
/// mask.
pub fn build_mask(width: u32, height: u32, rect: &InpaintRect, padding: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    if rect.width <= 0 || rect.height <= 0 {
        return mask;
    }
    let pad = i64::from(padding);
    let left = (i64::from(rect.x) - pad).max(0);
    let top = (i64::from(rect.y) - pad).max(0);
    let right = (i64::from(rect.x) + i64::from(rect.width) + pad).min(i64::from(width) - 1);
    let bottom = (i64::from(rect.y) + i64::from(rect.height) + pad).min(i64::from(height) - 1);
    if left > right || top > bottom {
        return mask;
    }
    let area = Rect::at(left as i32, top as i32)
        .of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
    draw_filled_rect_mut(&mut mask, area, Luma([MASK_ERASE]));
    mask
}

/// Returns a copy of `image` with `rect` (plus padding) filled in from its
/// surroundings. An empty mask returns the image unchanged.
pub fn erase_region(image: &RgbImage, rect: &InpaintRect, settings: InpaintSettings) -> RgbImage {
    let (width, height) = image.dimensions();
    let mask = build_mask(width, height, rect, settings.padding);
    let masked = mask.pixels().filter(|pixel| pixel[0] != 0).count();
    if masked == 0 {
        debug!(?rect, width, height, "inpaint rectangle misses the image");
        return image.clone();
    }
    debug!(?rect, masked, radius = settings.radius, "inpainting");
    telea::inpaint(image, &mask, settings.radius)
}
