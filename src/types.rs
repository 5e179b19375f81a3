//! Core types for chroma-key results

use crate::{
    config::OutputFormat,
    error::{ChromaKeyError, Result},
    matte::MatteStrategy,
};
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a chroma-key operation
#[derive(Debug, Clone)]
pub struct KeyResult {
    /// The keyed image; same dimensions as the input, always RGBA
    pub image: RgbaImage,

    /// Processing metadata
    pub metadata: KeyMetadata,

    /// Original input path (for logging purposes)
    pub input_path: Option<String>,
}

impl KeyResult {
    /// Create a new key result
    #[must_use]
    pub fn new(image: RgbaImage, metadata: KeyMetadata) -> Self {
        Self {
            image,
            metadata,
            input_path: None,
        }
    }

    /// Attach the input path
    #[must_use]
    pub fn with_input_path<S: Into<String>>(mut self, input_path: S) -> Self {
        self.input_path = Some(input_path.into());
        self
    }

    /// Image dimensions
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The alpha channel as a grayscale mask
    #[must_use]
    pub fn alpha_mask(&self) -> GrayImage {
        let (width, height) = self.image.dimensions();
        GrayImage::from_fn(width, height, |x, y| image::Luma([self.image.get_pixel(x, y)[3]]))
    }

    /// Save the result as PNG with alpha channel
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save(path, OutputFormat::Png)
    }

    /// Save in the specified format
    pub fn save<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<()> {
        crate::services::ImageIOService::save_rgba(&self.image, path, format)
    }

    /// Get the image as encoded bytes in the specified format
    pub fn to_bytes(&self, format: OutputFormat) -> Result<Vec<u8>> {
        let image_format = match format {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::WebP => image::ImageFormat::WebP,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Rgba8 => return Ok(self.image.as_raw().clone()),
        };

        let mut buffer = std::io::Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, image_format).map_err(|e| {
            ChromaKeyError::processing_stage_error(
                "encode",
                &e.to_string(),
                Some(&format!("format: {}", format)),
            )
        })?;
        Ok(buffer.into_inner())
    }

    /// One-line summary, e.g. for CLI output
    #[must_use]
    pub fn summary(&self) -> String {
        let stats = &self.metadata.statistics;
        format!(
            "made {} pixels transparent/semi-transparent ({} transparent, {} partial) using {} matte in {}ms",
            stats.transparent + stats.partial,
            stats.transparent,
            stats.partial,
            self.metadata.strategy,
            self.metadata.timings.total_ms
        )
    }
}

/// Metadata describing how a result was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Strategy that produced the matte
    pub strategy: MatteStrategy,
    /// `(width, height)` of the raster
    pub dimensions: (u32, u32),
    /// Alpha histogram summary
    pub statistics: KeyStatistics,
    /// Whether spill suppression ran
    pub spill_suppressed: bool,
    /// Pixels recolored by spill suppression
    pub despilled_pixels: usize,
    /// Non-fatal capability warnings
    pub warnings: Vec<String>,
    /// Stage timings
    pub timings: KeyTimings,
}

/// Counts of final alpha values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatistics {
    /// Alpha 0
    pub transparent: usize,
    /// Alpha strictly between 0 and 255
    pub partial: usize,
    /// Alpha 255
    pub opaque: usize,
}

impl KeyStatistics {
    /// Tally the alpha channel of `image`
    #[must_use]
    pub fn from_image(image: &RgbaImage) -> Self {
        image
            .pixels()
            .fold(Self::default(), |mut stats, pixel| {
                match pixel[3] {
                    0 => stats.transparent += 1,
                    255 => stats.opaque += 1,
                    _ => stats.partial += 1,
                }
                stats
            })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.transparent + self.partial + self.opaque
    }
}

/// Per-stage timings in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTimings {
    /// Zone classification (vectorized only)
    pub classify_ms: u64,
    /// Alpha mask building and blur, or the whole scalar pass
    pub mask_ms: u64,
    /// Spill suppression (vectorized only)
    pub despill_ms: u64,
    /// Whole operation
    pub total_ms: u64,
}
