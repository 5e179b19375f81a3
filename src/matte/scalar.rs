//! Per-pixel fallback matte
//!
//! Uses only the largest absolute channel difference to the key color: no hue
//! analysis, no blur and no spill suppression. RGB is always preserved.

use crate::color::KeyColor;
use crate::config::KeyConfig;
use image::RgbaImage;

/// Largest absolute channel difference between `pixel` and `target`
#[must_use]
pub fn max_channel_difference(pixel: [u8; 3], target: KeyColor) -> u32 {
    pixel
        .iter()
        .zip(target.channels())
        .map(|(&p, t)| u32::from(p.abs_diff(t)))
        .max()
        .unwrap_or(0)
}

/// New alpha for a pixel at `difference` from the key, or `None` when the pixel is kept as is.
#[must_use]
pub fn matte_alpha(difference: u32, tolerance: u32, feather: u32) -> Option<u8> {
    if difference <= tolerance {
        Some(0)
    } else if feather > 0 && difference <= tolerance.saturating_add(feather) {
        let ramp = 255 * (difference - tolerance) / feather;
        Some(u8::try_from(ramp).unwrap_or(u8::MAX))
    } else {
        None
    }
}

/// Key out `config.target` from `image`, returning the matted copy.
#[must_use]
pub fn key_out(image: &RgbaImage, config: &KeyConfig) -> RgbaImage {
    let mut output = image.clone();

    for pixel in output.pixels_mut() {
        let difference = max_channel_difference([pixel[0], pixel[1], pixel[2]], config.target);
        if let Some(alpha) = matte_alpha(difference, config.tolerance, config.feather) {
            pixel[3] = pixel[3].min(alpha);
        }
    }

    output
}
