//! Alpha channel housekeeping and compositing
//!
//! Thin pixel-buffer operations around the matte: adding an alpha channel,
//! flattening onto a solid background, and overlaying one image on another.

use crate::color::KeyColor;
use crate::error::{ChromaKeyError, Result};
use image::{imageops, DynamicImage, Rgb, RgbImage, RgbaImage};
use std::str::FromStr;

/// Where an overlay is placed on the base image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Centered on the base image
    #[default]
    Center,
    /// Top-left corner at the given offset; may be negative or out of bounds
    At(i64, i64),
}

impl Placement {
    /// Top-left offset of an overlay of `overlay` size on a base of `base` size
    #[must_use]
    pub fn offset(self, base: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
        match self {
            Self::Center => (
                (i64::from(base.0) - i64::from(overlay.0)) / 2,
                (i64::from(base.1) - i64::from(overlay.1)) / 2,
            ),
            Self::At(x, y) => (x, y),
        }
    }
}

impl FromStr for Placement {
    type Err = ChromaKeyError;

    /// Parse `center` or `X,Y`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("center") {
            return Ok(Self::Center);
        }

        let invalid = || {
            ChromaKeyError::invalid_config(format!(
                "position '{}' must be 'center' or X,Y",
                s
            ))
        };
        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::At(x, y))
    }
}

/// Parse a `WxH` size such as `640x480`
pub fn parse_size(s: &str) -> Result<(u32, u32)> {
    let invalid = || ChromaKeyError::invalid_config(format!("size '{}' must be WxH", s));
    let lower = s.trim().to_ascii_lowercase();
    let (width, height) = lower.split_once('x').ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Convert any image to RGBA, adding an opaque alpha channel when missing
#[must_use]
pub fn add_alpha(image: &DynamicImage) -> RgbaImage {
    image.to_rgba8()
}

/// Composite `image` over a solid `background`, dropping the alpha channel
#[must_use]
pub fn flatten(image: &DynamicImage, background: KeyColor) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let bg = background.channels();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = u32::from(pixel[3]);
        let blend = |channel: usize| {
            let value =
                (u32::from(pixel[channel]) * alpha + u32::from(bg[channel]) * (255 - alpha) + 127)
                    / 255;
            value as u8
        };
        Rgb([blend(0), blend(1), blend(2)])
    })
}

/// Overlay `overlay` on `base` with alpha blending
///
/// The overlay is first resized to `overlay_size` (Lanczos3) when given.
#[must_use]
pub fn composite(
    base: &DynamicImage,
    overlay: &DynamicImage,
    placement: Placement,
    overlay_size: Option<(u32, u32)>,
) -> RgbaImage {
    let mut canvas = base.to_rgba8();
    let overlay = match overlay_size {
        Some((width, height)) => {
            imageops::resize(&overlay.to_rgba8(), width, height, imageops::FilterType::Lanczos3)
        },
        None => overlay.to_rgba8(),
    };

    let (x, y) = placement.offset(canvas.dimensions(), overlay.dimensions());
    imageops::overlay(&mut canvas, &overlay, x, y);
    canvas
}
