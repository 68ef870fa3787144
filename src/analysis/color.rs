use super::kmeans::Rgb;

/// Formats an RGB center as `#rrggbb`, truncating each channel toward zero.
pub(crate) fn hex_color(color: &Rgb) -> String {
    let [r, g, b] = color.map(|value| value.clamp(0.0, 255.0) as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_lowercase_hex() {
        assert_eq!(hex_color(&[0.0, 0.0, 0.0]), "#000000");
        assert_eq!(hex_color(&[255.0, 255.0, 255.0]), "#ffffff");
        assert_eq!(hex_color(&[171.9, 16.2, 1.0]), "#ab1001");
    }

    #[test]
    fn out_of_range_channels_saturate() {
        assert_eq!(hex_color(&[-3.0, 300.0, f32::NAN]), "#00ff00");
    }
}
