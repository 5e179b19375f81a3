//! Per-channel float planes of an RGBA raster

use crate::error::{ChromaKeyError, Result};
use image::RgbaImage;
use ndarray::Array2;

/// Round and clamp a float channel value into the 8-bit range
pub(crate) fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// The R, G, B and source alpha channels of a raster as `(height, width)` planes.
#[derive(Debug, Clone)]
pub struct RgbPlanes {
    pub red: Array2<f32>,
    pub green: Array2<f32>,
    pub blue: Array2<f32>,
    pub source_alpha: Array2<f32>,
}

impl RgbPlanes {
    /// Split an RGBA raster into float planes
    #[must_use]
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let shape = (height as usize, width as usize);
        let plane = |channel: usize| {
            Array2::from_shape_fn(shape, |(y, x)| {
                f32::from(image.get_pixel(x as u32, y as u32)[channel])
            })
        };

        Self {
            red: plane(0),
            green: plane(1),
            blue: plane(2),
            source_alpha: plane(3),
        }
    }

    /// `(height, width)` of every plane
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.red.dim()
    }

    /// Plane for channel index 0 (red), 1 (green) or 2 (blue)
    #[must_use]
    pub fn channel(&self, index: usize) -> &Array2<f32> {
        match index {
            0 => &self.red,
            1 => &self.green,
            _ => &self.blue,
        }
    }

    pub fn channel_mut(&mut self, index: usize) -> &mut Array2<f32> {
        match index {
            0 => &mut self.red,
            1 => &mut self.green,
            _ => &mut self.blue,
        }
    }

    /// Reassemble an RGBA raster from the color planes and the given alpha plane
    ///
    /// # Errors
    /// Returns a processing error when the alpha plane does not match the color planes
    pub fn to_rgba(&self, alpha: &Array2<f32>) -> Result<RgbaImage> {
        let (height, width) = self.dim();
        if alpha.dim() != (height, width) {
            return Err(ChromaKeyError::processing_stage_error(
                "assemble",
                "alpha plane shape does not match the color planes",
                Some(&format!("{}x{} vs {:?}", width, height, alpha.dim())),
            ));
        }

        let mut raw = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                raw.extend_from_slice(&[
                    to_channel(self.red[[y, x]]),
                    to_channel(self.green[[y, x]]),
                    to_channel(self.blue[[y, x]]),
                    to_channel(alpha[[y, x]]),
                ]);
            }
        }

        RgbaImage::from_raw(width as u32, height as u32, raw)
            .ok_or_else(|| ChromaKeyError::internal("RGBA buffer size mismatch"))
    }
}
