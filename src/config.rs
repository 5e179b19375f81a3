//! Configuration types for chroma-key operations

use crate::color::KeyColor;
use crate::error::{ChromaKeyError, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted tolerance or feather value
pub const MAX_KEY_RANGE: u32 = 255;

/// Output image format options. All of them keep the alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    #[default]
    Png,
    /// WebP with alpha channel transparency
    WebP,
    /// TIFF with alpha channel transparency and lossless compression
    Tiff,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    Rgba8,
}

impl OutputFormat {
    /// File extension for this format (without the dot)
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Tiff => "tiff",
            Self::Rgba8 => "rgba",
        }
    }

    /// Format matching a path's extension, if it is one of ours
    #[must_use]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let extension = path.extension()?.to_string_lossy().to_lowercase();
        match extension.as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "tif" | "tiff" => Some(Self::Tiff),
            "rgba" | "raw" => Some(Self::Rgba8),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::WebP => write!(f, "WebP"),
            Self::Tiff => write!(f, "TIFF"),
            Self::Rgba8 => write!(f, "RGBA8"),
        }
    }
}

/// Configuration for a chroma-key operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyConfig {
    /// Background color to remove
    pub target: KeyColor,

    /// Match threshold: max channel difference on the fallback path, hue
    /// degrees (floored to 15) on the vectorized path
    pub tolerance: u32,

    /// Width of the transition zone; 0 means a hard binary cut
    pub feather: u32,

    /// Always use the per-pixel fallback path, even when the vectorized one is compiled in
    pub force_scalar: bool,

    /// Output format used when saving results
    pub output_format: OutputFormat,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            target: KeyColor::default(),
            tolerance: 0,
            feather: 0,
            force_scalar: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl KeyConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chroma_key::{KeyColor, KeyConfig};
    ///
    /// let config = KeyConfig::builder()
    ///     .target(KeyColor::new(0, 0, 255))
    ///     .tolerance(20)
    ///     .feather(30)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.feather, 30);
    /// ```
    #[must_use]
    pub fn builder() -> KeyConfigBuilder {
        KeyConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Tolerance outside 0-255
    /// - Feather outside 0-255
    ///
    /// ```rust
    /// use chroma_key::KeyConfig;
    ///
    /// let mut config = KeyConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.feather = 400;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.tolerance > MAX_KEY_RANGE {
            return Err(ChromaKeyError::config_value_error(
                "tolerance",
                self.tolerance,
                "0-255",
                Some(30),
            ));
        }

        if self.feather > MAX_KEY_RANGE {
            return Err(ChromaKeyError::config_value_error(
                "feather",
                self.feather,
                "0-255",
                Some(20),
            ));
        }

        Ok(())
    }

    /// True when tolerance and feather are both 0 (exact-match transparency)
    #[must_use]
    pub fn is_exact_match(&self) -> bool {
        self.tolerance == 0 && self.feather == 0
    }
}

/// Builder for `KeyConfig`
#[derive(Debug, Default)]
pub struct KeyConfigBuilder {
    config: KeyConfig,
}

impl KeyConfigBuilder {
    /// Set the background color to remove
    #[must_use]
    pub fn target(mut self, target: KeyColor) -> Self {
        self.config.target = target;
        self
    }

    /// Set the match tolerance
    #[must_use]
    pub fn tolerance(mut self, tolerance: u32) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Set the feather width
    #[must_use]
    pub fn feather(mut self, feather: u32) -> Self {
        self.config.feather = feather;
        self
    }

    /// Force the per-pixel fallback path
    #[must_use]
    pub fn force_scalar(mut self, force: bool) -> Self {
        self.config.force_scalar = force;
        self
    }

    /// Set output format
    #[must_use]
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.output_format = format;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns `ChromaKeyError::InvalidConfig` when validation fails
    pub fn build(self) -> Result<KeyConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_exact_match() {
        let config = KeyConfig::default();
        assert_eq!(config.tolerance, 0);
        assert_eq!(config.feather, 0);
        assert_eq!(config.target, KeyColor::GREEN);
        assert!(config.is_exact_match());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = KeyConfig::builder()
            .target(KeyColor::new(0, 0, 255))
            .tolerance(10)
            .feather(20)
            .force_scalar(true)
            .output_format(OutputFormat::Tiff)
            .build()
            .unwrap();

        assert_eq!(config.target, KeyColor::new(0, 0, 255));
        assert_eq!(config.tolerance, 10);
        assert_eq!(config.feather, 20);
        assert!(config.force_scalar);
        assert_eq!(config.output_format, OutputFormat::Tiff);
        assert!(!config.is_exact_match());
    }

    #[test]
    fn test_builder_rejects_out_of_range_values() {
        let err = KeyConfig::builder().tolerance(256).build().unwrap_err();
        assert!(err.to_string().contains("tolerance"));
        assert!(err.to_string().contains("256"));

        let err = KeyConfig::builder().feather(1000).build().unwrap_err();
        assert!(err.to_string().contains("feather"));
    }

    #[test]
    fn test_output_format_from_path() {
        use std::path::Path;
        assert_eq!(OutputFormat::from_path(Path::new("a.PNG")), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_path(Path::new("a.tif")), Some(OutputFormat::Tiff));
        assert_eq!(OutputFormat::from_path(Path::new("a.webp")), Some(OutputFormat::WebP));
        assert_eq!(OutputFormat::from_path(Path::new("a.jpg")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = KeyConfig::builder().tolerance(12).feather(8).build().unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: KeyConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
