use image::RgbImage;

/// Color negative, used to retry recognition on light-on-dark images.
pub(super) fn invert(image: &RgbImage) -> RgbImage {
    let mut output = image.clone();
    image::imageops::invert(&mut output);
    output
}
