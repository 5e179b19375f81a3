//! RGB to hue/saturation conversion
//!
//! Hue is reported in degrees `[0, 360)` and saturation in `[0, 1]`, using the
//! hexagonal HSV model. The bulk variant works on whole `ndarray` planes and
//! goes through the same per-pixel function, so a target color converted with
//! [`KeyColor::hue`] always agrees with the converted raster.

use crate::error::{ChromaKeyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "vectorized")]
use ndarray::{Array2, Zip};

/// Saturation above which a pixel has a usable hue
pub const MIN_SATURATION: f32 = 0.15;

/// Convert one RGB triple (channels in `[0, 255]`) to `(hue, saturation)`.
#[must_use]
pub fn hue_saturation(r: f32, g: f32, b: f32) -> (f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta / max } else { 0.0 };

    if delta <= 0.0 {
        return (0.0, saturation);
    }

    #[allow(clippy::float_cmp)]
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    ((sector * 60.0).rem_euclid(360.0), saturation)
}

/// Convert whole R, G, B planes into hue and saturation planes of the same shape.
#[cfg(feature = "vectorized")]
#[must_use]
pub fn hsv_planes(
    r: &Array2<f32>,
    g: &Array2<f32>,
    b: &Array2<f32>,
) -> (Array2<f32>, Array2<f32>) {
    let mut hue = Array2::<f32>::zeros(r.raw_dim());
    let mut saturation = Array2::<f32>::zeros(r.raw_dim());

    Zip::from(&mut hue)
        .and(&mut saturation)
        .and(r)
        .and(g)
        .and(b)
        .for_each(|h, s, &r, &g, &b| {
            let (hue, sat) = hue_saturation(r, g, b);
            *h = hue;
            *s = sat;
        });

    (hue, saturation)
}

/// Circular distance between two hues in degrees, in `[0, 180]`.
#[must_use]
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let diff = (a - b).abs();
    diff.min(360.0 - diff)
}

/// An 8-bit RGB color, used as the key (background) color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl KeyColor {
    /// Pure green, the default key color
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// White, the default flatten background
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[must_use]
    pub fn channels_f32(self) -> [f32; 3] {
        [f32::from(self.r), f32::from(self.g), f32::from(self.b)]
    }

    /// Hue and saturation of this color
    #[must_use]
    pub fn hue_saturation(self) -> (f32, f32) {
        let [r, g, b] = self.channels_f32();
        hue_saturation(r, g, b)
    }

    /// Hue of this color in degrees
    #[must_use]
    pub fn hue(self) -> f32 {
        self.hue_saturation().0
    }

    /// Whether the color carries a meaningful hue
    #[must_use]
    pub fn is_chromatic(self) -> bool {
        self.hue_saturation().1 > MIN_SATURATION
    }

    /// Index of the smallest channel; ties resolve to the lowest index.
    #[must_use]
    pub fn low_channel(self) -> usize {
        let channels = self.channels();
        let mut low = 0;
        for (index, &value) in channels.iter().enumerate().skip(1) {
            if value < channels[low] {
                low = index;
            }
        }
        low
    }

    /// The two channels other than [`KeyColor::low_channel`], in index order.
    #[must_use]
    pub fn high_channels(self) -> [usize; 2] {
        match self.low_channel() {
            0 => [1, 2],
            1 => [0, 2],
            _ => [0, 1],
        }
    }
}

impl Default for KeyColor {
    fn default() -> Self {
        Self::GREEN
    }
}

impl fmt::Display for KeyColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for KeyColor {
    type Err = ChromaKeyError;

    /// Parse `"R,G,B"` with each component in `0..=255`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ChromaKeyError::invalid_color(format!(
                "'{}' must have exactly 3 components as R,G,B, found {}",
                s,
                parts.len()
            )));
        }

        let mut channels = [0u8; 3];
        for (channel, part) in channels.iter_mut().zip(&parts) {
            *channel = part.parse::<u8>().map_err(|e| {
                ChromaKeyError::invalid_color(format!(
                    "component '{}' in '{}' is not an integer in 0-255: {}",
                    part, s, e
                ))
            })?;
        }

        let [r, g, b] = channels;
        Ok(Self::new(r, g, b))
    }
}
