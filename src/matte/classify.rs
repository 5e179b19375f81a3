//! Per-pixel background classification
//!
//! Two gates mark a pixel as background core:
//!
//! - the hue gate: the pixel is chromatic (saturation above
//!   [`MIN_SATURATION`]) and its circular hue distance to the key hue is within
//!   the effective hue tolerance. Pixels beyond that but within tolerance +
//!   feather fall into the edge zone.
//! - the direct RGB gate: the Euclidean RGB distance to the key color is below
//!   `tolerance * 5`, or zero. This catches near-key pixels that are too
//!   desaturated for the hue gate.
//!
//! White, gray and black keys have hue 0, so saturated reds match them through
//! the hue gate.
//!
//! Hue tolerance and feather are floored at 15 and 20 degrees so the hue gate
//! stays usable for tiny configured values.

use super::planes::RgbPlanes;
use crate::color::{hsv_planes, hue_distance, KeyColor, MIN_SATURATION};
use ndarray::{Array2, Zip};

/// Floor applied to the tolerance on the hue gate, in degrees
pub const MIN_HUE_TOLERANCE: u32 = 15;
/// Floor applied to the feather on the hue gate, in degrees
pub const MIN_HUE_FEATHER: u32 = 20;
/// Direct RGB gate radius, in multiples of the tolerance
pub const RGB_GATE_MULTIPLIER: f32 = 5.0;

/// Zone assignment for every pixel of a raster
#[derive(Debug, Clone, PartialEq)]
pub struct Zones {
    /// Fully transparent background
    pub core: Array2<bool>,
    /// Feather zone with a partial alpha ramp; disjoint from `core`
    pub edge: Array2<bool>,
    /// Subject pixels farther than `tolerance + feather` in RGB; stay opaque and untouched
    pub protected: Array2<bool>,
    /// Circular hue distance to the key hue, in degrees
    pub hue_distance: Array2<f32>,
    /// Euclidean RGB distance to the key color
    pub rgb_distance: Array2<f32>,
    /// Effective hue tolerance after flooring
    pub hue_tolerance: f32,
    /// Effective hue feather after flooring
    pub hue_feather: f32,
}

impl Zones {
    /// Classify every pixel of `planes` against `target`
    #[must_use]
    pub fn classify(planes: &RgbPlanes, target: KeyColor, tolerance: u32, feather: u32) -> Self {
        let dim = planes.dim();
        let hue_tolerance = tolerance.max(MIN_HUE_TOLERANCE) as f32;
        let hue_feather = feather.max(MIN_HUE_FEATHER) as f32;
        let rgb_gate = tolerance as f32 * RGB_GATE_MULTIPLIER;
        let reach = tolerance.saturating_add(feather) as f32;

        let target_hue = target.hue();

        let (hue, saturation) = hsv_planes(&planes.red, &planes.green, &planes.blue);
        let hue_distance = hue.mapv(|h| hue_distance(h, target_hue));

        let [target_r, target_g, target_b] = target.channels_f32();
        let mut rgb_distance = Array2::<f32>::zeros(dim);
        Zip::from(&mut rgb_distance)
            .and(&planes.red)
            .and(&planes.green)
            .and(&planes.blue)
            .for_each(|d, &r, &g, &b| {
                *d = ((r - target_r).powi(2) + (g - target_g).powi(2) + (b - target_b).powi(2))
                    .sqrt();
            });

        let mut core = Array2::from_elem(dim, false);
        let mut edge = Array2::from_elem(dim, false);
        let mut protected = Array2::from_elem(dim, false);
        Zip::from(&mut core)
            .and(&mut edge)
            .and(&mut protected)
            .and(&hue_distance)
            .and(&saturation)
            .and(&rgb_distance)
            .for_each(|core, edge, protected, &distance, &sat, &rgb| {
                let chromatic = sat > MIN_SATURATION;
                let direct = rgb < rgb_gate || rgb <= 0.0;

                *core = direct || (chromatic && distance <= hue_tolerance);
                *edge = !*core && chromatic && distance <= hue_tolerance + hue_feather;
                *protected = !*core && !*edge && rgb > reach;
            });

        Self {
            core,
            edge,
            protected,
            hue_distance,
            rgb_distance,
            hue_tolerance,
            hue_feather,
        }
    }

    /// `(height, width)` of every plane
    #[must_use]
    pub fn dim(&self) -> (usize, usize) {
        self.core.dim()
    }

    /// Pixel counts as `(core, edge, subject)`
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        let core = self.core.iter().filter(|&&c| c).count();
        let edge = self.edge.iter().filter(|&&e| e).count();
        (core, edge, self.core.len() - core - edge)
    }
}
