#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Chroma Key
//!
//! Removes a solid background color from images and produces an alpha matte
//! with smooth edges and spill-free colors.
//!
//! ## Pipeline
//!
//! With a non-zero feather and the `vectorized` feature (default):
//!
//! 1. **Color-space conversion**: hue and saturation planes for the raster
//! 2. **Classification**: background core, feather edge or subject per pixel,
//!    from circular hue distance and a direct RGB distance gate
//! 3. **Alpha mask**: linear ramp across the edge zone, softened with a
//!    Gaussian blur
//! 4. **Spill suppression**: the key's dominant channels are pulled down in
//!    pixels close to the key color
//!
//! With a zero feather, or without the `vectorized` feature, a per-pixel
//! channel-difference matte is used instead. `tolerance = 0, feather = 0` is
//! exact-match transparency.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chroma_key::{key_out_color, KeyColor, KeyConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = KeyConfig::builder()
//!     .target(KeyColor::new(0, 255, 0))
//!     .tolerance(30)
//!     .feather(20)
//!     .build()?;
//!
//! let image = image::open("greenscreen.jpg")?;
//! let result = key_out_color(&image, &config)?;
//! result.save_png("subject.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `vectorized` (default): `ndarray`-backed hue matte with spill suppression
//! - `cli` (default): command-line interface
//! - `webp-support` (default): WebP image format support
//! - `tracing-json`: JSON log output for the CLI

#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod compose;
pub mod config;
pub mod error;
pub mod matte;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

pub use color::KeyColor;
pub use compose::{add_alpha, composite, flatten, parse_size, Placement};
pub use config::{KeyConfig, KeyConfigBuilder, OutputFormat};
pub use error::{ChromaKeyError, Result};
pub use matte::{MatteOutput, MatteStrategy, VECTORIZED_AVAILABLE};
pub use processor::ChromaKeyer;
pub use services::ImageIOService;
pub use types::{KeyMetadata, KeyResult, KeyStatistics, KeyTimings};

#[cfg(feature = "cli")]
pub use tracing_config::{init_cli_tracing, TracingConfig, TracingFormat};

/// Remove `config.target` from a decoded image
///
/// ```rust
/// use chroma_key::{key_out_color, KeyConfig};
/// use image::{DynamicImage, Rgba, RgbaImage};
///
/// let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255])));
/// let result = key_out_color(&image, &KeyConfig::default()).unwrap();
/// assert_eq!(result.metadata.statistics.transparent, 4);
/// ```
pub fn key_out_color(image: &image::DynamicImage, config: &KeyConfig) -> Result<KeyResult> {
    ChromaKeyer::new(config.clone())?.process_image(image)
}

/// Remove `config.target` from an encoded image (PNG, JPEG, WebP, TIFF)
pub fn key_out_color_from_bytes(image_bytes: &[u8], config: &KeyConfig) -> Result<KeyResult> {
    let image = image::load_from_memory(image_bytes).map_err(|e| {
        ChromaKeyError::processing(format!("Failed to decode image from bytes: {}", e))
    })?;

    key_out_color(&image, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    #[test]
    fn test_from_bytes_decodes_png() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([0, 255, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let result = key_out_color_from_bytes(bytes.get_ref(), &KeyConfig::default()).unwrap();
        assert_eq!(result.metadata.statistics.transparent, 2);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = key_out_color_from_bytes(b"not an image", &KeyConfig::default()).unwrap_err();
        assert!(matches!(err, ChromaKeyError::Processing(_)));
    }
}
