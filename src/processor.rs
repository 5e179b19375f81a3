//! Chroma-key processor
//!
//! `ChromaKeyer` owns a validated [`KeyConfig`], picks the matting strategy
//! for it, and turns decoded images into [`KeyResult`]s. Both the library
//! entry points and the CLI go through it.

use crate::{
    config::KeyConfig,
    error::{ChromaKeyError, Result},
    matte::MatteStrategy,
    services::ImageIOService,
    types::{KeyMetadata, KeyResult, KeyStatistics, KeyTimings},
};
use image::DynamicImage;
use instant::Instant;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Processor that removes a solid background color from images
#[derive(Debug, Clone)]
pub struct ChromaKeyer {
    config: KeyConfig,
    strategy: MatteStrategy,
}

impl ChromaKeyer {
    /// Create a processor for `config`
    ///
    /// # Errors
    /// Returns `ChromaKeyError::InvalidConfig` when the configuration is invalid
    pub fn new(config: KeyConfig) -> Result<Self> {
        config.validate()?;
        let strategy = MatteStrategy::for_config(&config);
        debug!(%strategy, target = %config.target, "Created chroma keyer");
        Ok(Self { config, strategy })
    }

    #[must_use]
    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// Strategy every image processed by this keyer will use
    #[must_use]
    pub fn strategy(&self) -> MatteStrategy {
        self.strategy
    }

    /// Load and process an image file
    ///
    /// # Errors
    /// Returns `ChromaKeyError` for unreadable or undecodable files and matting failures
    pub fn process_file<P: AsRef<Path>>(&self, input_path: P) -> Result<KeyResult> {
        let input_path = input_path.as_ref();
        let image = ImageIOService::load_image(input_path)?;
        Ok(self
            .process_image(&image)?
            .with_input_path(input_path.display().to_string()))
    }

    /// Remove the key color from a decoded image
    ///
    /// # Errors
    /// Returns `ChromaKeyError::Processing` for zero-sized images or a failed matting stage
    #[instrument(
        skip(self, image),
        fields(
            strategy = %self.strategy,
            target = %self.config.target,
            dimensions = %format!("{}x{}", image.width(), image.height())
        )
    )]
    pub fn process_image(&self, image: &DynamicImage) -> Result<KeyResult> {
        let total_start = Instant::now();
        let dimensions = (image.width(), image.height());

        if dimensions.0 == 0 || dimensions.1 == 0 {
            return Err(ChromaKeyError::processing_stage_error(
                "input validation",
                "image has no pixels",
                Some(&format!("{}x{}", dimensions.0, dimensions.1)),
            ));
        }

        let mut warnings = Vec::new();
        if let Some(warning) = self.strategy.degradation_warning(&self.config) {
            warn!("{}", warning);
            warnings.push(warning);
        }

        let rgba = image.to_rgba8();
        let mut timings = KeyTimings::default();
        let output = self.strategy.apply(&rgba, &self.config, &mut timings)?;
        timings.total_ms = total_start.elapsed().as_millis() as u64;

        let statistics = KeyStatistics::from_image(&output.image);
        info!(
            transparent = statistics.transparent,
            partial = statistics.partial,
            opaque = statistics.opaque,
            total_ms = timings.total_ms,
            "Keyed image"
        );
        debug!(
            classify_ms = timings.classify_ms,
            mask_ms = timings.mask_ms,
            despill_ms = timings.despill_ms,
            "Stage timings"
        );

        let metadata = KeyMetadata {
            strategy: self.strategy,
            dimensions,
            statistics,
            spill_suppressed: output.spill_suppressed,
            despilled_pixels: output.despilled_pixels,
            warnings,
            timings,
        };

        Ok(KeyResult::new(output.image, metadata))
    }
}
