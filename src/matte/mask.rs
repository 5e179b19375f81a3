//! Alpha mask assembly and softening

use super::classify::Zones;
use super::planes::to_channel;
use crate::error::{ChromaKeyError, Result};
use image::{imageops, GrayImage};
use ndarray::{Array2, Zip};

/// Continuous alpha from the classification zones: core 0, edge a linear ramp
/// over the hue feather, everything else 255.
#[must_use]
pub fn build_alpha(zones: &Zones) -> Array2<f32> {
    let mut alpha = Array2::from_elem(zones.dim(), 255.0_f32);
    let tolerance = zones.hue_tolerance;
    let feather = zones.hue_feather;

    Zip::from(&mut alpha)
        .and(&zones.core)
        .and(&zones.edge)
        .and(&zones.hue_distance)
        .for_each(|alpha, &core, &edge, &distance| {
            if core {
                *alpha = 0.0;
            } else if edge {
                *alpha = ((distance - tolerance) / feather * 255.0).clamp(0.0, 255.0);
            }
        });

    alpha
}

/// Gaussian sigma used to soften the mask for a given feather
#[must_use]
pub fn blur_sigma(feather: u32) -> f32 {
    (feather as f32 / 15.0).max(1.0)
}

/// Quantize the alpha plane to 8 bits, blur it, and expand it back to floats.
///
/// # Errors
/// Returns a processing error if the plane does not fit an image buffer
pub fn soften(alpha: &Array2<f32>, feather: u32) -> Result<Array2<f32>> {
    let (height, width) = alpha.dim();
    let too_large = |_: std::num::TryFromIntError| {
        ChromaKeyError::processing_stage_error(
            "soften",
            "alpha plane exceeds image buffer limits",
            Some(&format!("{}x{}", width, height)),
        )
    };
    let buffer_width = u32::try_from(width).map_err(too_large)?;
    let buffer_height = u32::try_from(height).map_err(too_large)?;

    let quantized: Vec<u8> = alpha.iter().map(|&a| to_channel(a)).collect();
    let mask = GrayImage::from_raw(buffer_width, buffer_height, quantized)
        .ok_or_else(|| ChromaKeyError::internal("alpha buffer size mismatch"))?;

    let blurred = imageops::blur(&mask, blur_sigma(feather));

    Array2::from_shape_vec(
        (height, width),
        blurred.into_raw().into_iter().map(f32::from).collect(),
    )
    .map_err(|e| ChromaKeyError::processing_stage_error("soften", &e.to_string(), None))
}

/// Restore the fixed points the blur may have moved: exact key matches go back
/// to 0, protected subject pixels back to 255.
pub fn pin(alpha: &mut Array2<f32>, zones: &Zones) {
    Zip::from(alpha)
        .and(&zones.rgb_distance)
        .and(&zones.protected)
        .for_each(|alpha, &distance, &protected| {
            if distance <= 0.0 {
                *alpha = 0.0;
            } else if protected {
                *alpha = 255.0;
            }
        });
}
