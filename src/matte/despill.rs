//! Spill suppression
//!
//! Edge and translucent pixels still carry part of the key color. The key's
//! smallest channel is taken as the uncontaminated reference; the two other
//! channels are pulled down toward it by an amount that grows as the pixel
//! gets closer to the key color in RGB space.

use super::classify::Zones;
use super::planes::RgbPlanes;
use crate::color::KeyColor;
use ndarray::{Array2, Zip};

/// Largest possible RGB distance, `255 * sqrt(3)`
pub const MAX_RGB_DISTANCE: f32 = 441.672_96;
/// Fraction of [`MAX_RGB_DISTANCE`] within which spill is suppressed
pub const SPILL_REACH: f32 = 0.3;
/// Channel elevation over the reference that is tolerated as natural color
pub const SPILL_SLACK: f32 = 30.0;
/// Share of the excess removed at full spill strength
pub const SPILL_GAIN: f32 = 0.6;

/// Spill strength in `[0, 1]` for a pixel at `rgb_distance` from the key
#[must_use]
pub fn spill_strength(rgb_distance: f32) -> f32 {
    let reach = MAX_RGB_DISTANCE * SPILL_REACH;
    if reach <= 0.0 || !rgb_distance.is_finite() {
        return 0.0;
    }
    (1.0 - rgb_distance / reach).clamp(0.0, 1.0)
}

/// Reduce the key's high channels in place. Pixels with alpha 0, no spill
/// strength, or in the protected zone are left alone. Returns the number of
/// pixels that were changed.
pub fn despill(
    planes: &mut RgbPlanes,
    alpha: &Array2<f32>,
    zones: &Zones,
    target: KeyColor,
) -> usize {
    let reference = planes.channel(target.low_channel()).clone();
    let mut touched = Array2::from_elem(planes.dim(), false);

    for channel in target.high_channels() {
        Zip::from(planes.channel_mut(channel))
            .and(&mut touched)
            .and(&reference)
            .and(alpha)
            .and(&zones.rgb_distance)
            .and(&zones.protected)
            .for_each(|value, touched, &low, &alpha, &distance, &protected| {
                if alpha <= 0.0 || protected {
                    return;
                }
                let strength = spill_strength(distance);
                if strength <= 0.0 {
                    return;
                }

                let excess = (*value - low - SPILL_SLACK).max(0.0);
                let reduction = excess * strength * SPILL_GAIN;
                if reduction > 0.0 {
                    *value = (*value - reduction).clamp(0.0, 255.0);
                    *touched = true;
                }
            });
    }

    touched.iter().filter(|&&t| t).count()
}
