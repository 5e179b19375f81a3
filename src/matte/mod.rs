//! Matting strategies
//!
//! Two implementations sit behind [`MatteStrategy`]:
//!
//! - [`MatteStrategy::Vectorized`]: hue classification, feathered alpha ramp,
//!   blur softening and spill suppression on `ndarray` planes. Only compiled
//!   with the `vectorized` feature.
//! - [`MatteStrategy::Scalar`]: per-pixel max channel difference with a linear
//!   feather and no decontamination.
//!
//! The vectorized path is selected when feathering is requested and the
//! feature is compiled in. A zero feather always takes the scalar path, which
//! makes `tolerance = 0, feather = 0` plain exact-match transparency.

pub mod scalar;

#[cfg(feature = "vectorized")]
pub mod classify;
#[cfg(feature = "vectorized")]
pub mod despill;
#[cfg(feature = "vectorized")]
pub mod mask;
#[cfg(feature = "vectorized")]
pub mod planes;

use crate::config::KeyConfig;
use crate::error::Result;
use crate::types::KeyTimings;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Whether the vectorized matting path is compiled into this build
pub const VECTORIZED_AVAILABLE: bool = cfg!(feature = "vectorized");

/// Matting implementation used for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatteStrategy {
    /// Hue classifier, mask builder and spill suppressor
    Vectorized,
    /// Per-pixel channel-difference fallback
    Scalar,
}

/// Output of a matting strategy
#[derive(Debug, Clone)]
pub struct MatteOutput {
    /// Matted raster with the computed alpha channel
    pub image: RgbaImage,
    /// Whether spill suppression ran
    pub spill_suppressed: bool,
    /// Number of pixels whose color was changed by spill suppression
    pub despilled_pixels: usize,
}

impl MatteStrategy {
    /// Pick the strategy for a feather width
    #[must_use]
    pub fn select(feather: u32, force_scalar: bool) -> Self {
        if feather > 0 && VECTORIZED_AVAILABLE && !force_scalar {
            Self::Vectorized
        } else {
            Self::Scalar
        }
    }

    /// Pick the strategy for a configuration
    #[must_use]
    pub fn for_config(config: &KeyConfig) -> Self {
        Self::select(config.feather, config.force_scalar)
    }

    /// Warning to surface when this strategy cannot honor the requested feather
    #[must_use]
    pub fn degradation_warning(self, config: &KeyConfig) -> Option<String> {
        match self {
            Self::Scalar if config.feather > 0 => Some(format!(
                "spill suppression unavailable: feather {} uses the per-pixel fallback ({})",
                config.feather,
                if VECTORIZED_AVAILABLE {
                    "forced by configuration"
                } else {
                    "built without the `vectorized` feature"
                }
            )),
            _ => None,
        }
    }

    /// Run this strategy on `image`
    ///
    /// # Errors
    /// Returns `ChromaKeyError::InvalidConfig` for out-of-range settings and a
    /// processing error when a matting stage fails
    pub fn apply(
        self,
        image: &RgbaImage,
        config: &KeyConfig,
        timings: &mut KeyTimings,
    ) -> Result<MatteOutput> {
        config.validate()?;
        match self {
            Self::Vectorized => vectorized_key_out(image, config, timings),
            Self::Scalar => {
                let start = instant::Instant::now();
                let image = scalar::key_out(image, config);
                timings.mask_ms = start.elapsed().as_millis() as u64;
                Ok(MatteOutput {
                    image,
                    spill_suppressed: false,
                    despilled_pixels: 0,
                })
            },
        }
    }
}

impl std::fmt::Display for MatteStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vectorized => write!(f, "vectorized"),
            Self::Scalar => write!(f, "scalar"),
        }
    }
}

#[cfg(feature = "vectorized")]
fn vectorized_key_out(
    image: &RgbaImage,
    config: &KeyConfig,
    timings: &mut KeyTimings,
) -> Result<MatteOutput> {
    use instant::Instant;
    use tracing::debug;

    let mut planes = planes::RgbPlanes::from_rgba(image);

    let start = Instant::now();
    let zones = classify::Zones::classify(&planes, config.target, config.tolerance, config.feather);
    timings.classify_ms = start.elapsed().as_millis() as u64;
    let (core, edge, subject) = zones.counts();
    debug!(
        core,
        edge,
        subject,
        hue_tolerance = zones.hue_tolerance,
        hue_feather = zones.hue_feather,
        "Classified pixels"
    );

    let start = Instant::now();
    let mut alpha = mask::soften(&mask::build_alpha(&zones), config.feather)?;
    mask::pin(&mut alpha, &zones);
    alpha.zip_mut_with(&planes.source_alpha, |a, &source| *a = a.min(source));
    timings.mask_ms = start.elapsed().as_millis() as u64;

    let start = Instant::now();
    let despilled_pixels = despill::despill(&mut planes, &alpha, &zones, config.target);
    timings.despill_ms = start.elapsed().as_millis() as u64;
    debug!(despilled_pixels, "Suppressed spill");

    Ok(MatteOutput {
        image: planes.to_rgba(&alpha)?,
        spill_suppressed: true,
        despilled_pixels,
    })
}

#[cfg(not(feature = "vectorized"))]
fn vectorized_key_out(
    _image: &RgbaImage,
    _config: &KeyConfig,
    _timings: &mut KeyTimings,
) -> Result<MatteOutput> {
    Err(crate::error::ChromaKeyError::internal(
        "vectorized matting requested but the `vectorized` feature is not enabled",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::KeyColor;
    use image::Rgba;

    #[test]
    fn test_zero_feather_selects_scalar() {
        assert_eq!(MatteStrategy::select(0, false), MatteStrategy::Scalar);
        assert_eq!(MatteStrategy::select(10, true), MatteStrategy::Scalar);
    }

    #[cfg(feature = "vectorized")]
    #[test]
    fn test_feather_selects_vectorized() {
        assert!(VECTORIZED_AVAILABLE);
        assert_eq!(MatteStrategy::select(1, false), MatteStrategy::Vectorized);
    }

    #[cfg(not(feature = "vectorized"))]
    #[test]
    fn test_feather_without_feature_selects_scalar() {
        assert!(!VECTORIZED_AVAILABLE);
        assert_eq!(MatteStrategy::select(10, false), MatteStrategy::Scalar);
    }

    #[test]
    fn test_degradation_warning_only_with_feather() {
        let config = KeyConfig::builder().feather(10).force_scalar(true).build().unwrap();
        let warning = MatteStrategy::Scalar.degradation_warning(&config).unwrap();
        assert!(warning.contains("spill suppression unavailable"));

        let config = KeyConfig::default();
        assert!(MatteStrategy::Scalar.degradation_warning(&config).is_none());
        assert!(MatteStrategy::Vectorized.degradation_warning(&config).is_none());
    }

    #[test]
    fn test_apply_rejects_unvalidated_config() {
        let config = KeyConfig {
            tolerance: 200,
            feather: u32::MAX,
            ..KeyConfig::default()
        };
        let image = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 255]));
        let mut timings = KeyTimings::default();

        for strategy in [MatteStrategy::Scalar, MatteStrategy::Vectorized] {
            let result = strategy.apply(&image, &config, &mut timings);
            assert!(matches!(
                result,
                Err(crate::error::ChromaKeyError::InvalidConfig(_))
            ));
        }
    }

    #[cfg(feature = "vectorized")]
    #[test]
    fn test_exact_match_agrees_across_strategies() {
        let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));
        image.put_pixel(2, 1, Rgba([0, 0, 255, 255]));
        image.put_pixel(1, 2, Rgba([255, 255, 255, 255]));
        let config = KeyConfig::builder().target(KeyColor::GREEN).build().unwrap();

        let mut timings = KeyTimings::default();
        let vectorized = MatteStrategy::Vectorized
            .apply(&image, &config, &mut timings)
            .unwrap();
        let scalar = MatteStrategy::Scalar.apply(&image, &config, &mut timings).unwrap();

        assert_eq!(vectorized.image, scalar.image);
        assert_eq!(vectorized.despilled_pixels, 0);
        assert!(vectorized.image.pixels().all(|p| p[3] == 0 || p[3] == 255));
    }
}
