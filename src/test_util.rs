#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    // SAFETY: HOME is only mutated while HOME_MUTEX is held.
    unsafe { std::env::set_var("HOME", dir.path()) };
    let result = func(dir.path());
    match old_home {
        Some(old) => unsafe { std::env::set_var("HOME", old) },
        None => unsafe { std::env::remove_var("HOME") },
    }
    result
}

/// White canvas with a block-letter "A" drawn in black, 3px strokes.
///
/// The glyph occupies `left..left + 20` by `top..top + 30`.
#[cfg(test)]
pub(crate) fn glyph_image(width: u32, height: u32, left: u32, top: u32) -> image::RgbImage {
    let mut image = image::RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]));
    let black = image::Rgb([0, 0, 0]);
    for dy in 0..30 {
        for dx in 0..20 {
            let left_leg = dx < 3;
            let right_leg = dx >= 17;
            let top_bar = dy < 3;
            let cross_bar = (13..16).contains(&dy);
            if left_leg || right_leg || top_bar || cross_bar {
                image.put_pixel(left + dx, top + dy, black);
            }
        }
    }
    image
}
