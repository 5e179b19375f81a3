//! Image I/O operations service
//!
//! Decoding and encoding stay out of the matting code; this service is the
//! only place that touches the filesystem.

use crate::{
    config::OutputFormat,
    error::{ChromaKeyError, Result},
};
use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Service for handling image file input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Load an image from a file path
    ///
    /// Falls back to content-based format detection when the extension is
    /// missing or wrong.
    ///
    /// ```rust,no_run
    /// use chroma_key::services::ImageIOService;
    ///
    /// let image = ImageIOService::load_image("greenscreen.jpg")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ChromaKeyError::file_io_error(
                "read image file",
                path_ref,
                &std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
            ));
        }

        match image::open(path_ref) {
            Ok(img) => Ok(img),
            Err(e) => {
                tracing::debug!(
                    path = %path_ref.display(),
                    error = %e,
                    "Extension-based loading failed, trying content-based detection"
                );

                let data = std::fs::read(path_ref).map_err(|io_err| {
                    ChromaKeyError::file_io_error("read image data", path_ref, &io_err)
                })?;

                image::load_from_memory(&data).map_err(|content_err| {
                    ChromaKeyError::processing_stage_error(
                        "image loading",
                        &format!(
                            "extension-based error: {}. content-based error: {}",
                            e, content_err
                        ),
                        Some(&format!(
                            "path: {}, size: {} bytes",
                            path_ref.display(),
                            data.len()
                        )),
                    )
                })
            },
        }
    }

    /// Save an RGBA image in the given format, creating parent directories
    pub fn save_rgba<P: AsRef<Path>>(image: &RgbaImage, path: P, format: OutputFormat) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent(path_ref)?;

        let image_format = match format {
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::WebP => image::ImageFormat::WebP,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Rgba8 => {
                return std::fs::write(path_ref, image.as_raw())
                    .map_err(|e| ChromaKeyError::file_io_error("write RGBA8 data", path_ref, &e));
            },
        };

        image
            .save_with_format(path_ref, image_format)
            .map_err(|e| Self::save_error(path_ref, &format.to_string(), &e))
    }

    /// Save any image, picking the format from the path's extension
    pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        Self::ensure_parent(path_ref)?;

        image
            .save(path_ref)
            .map_err(|e| Self::save_error(path_ref, "extension", &e))
    }

    /// Default output path next to `input`: `<stem>_<suffix>.<ext>`.
    ///
    /// Inputs whose format cannot hold an alpha channel (JPEG, BMP, GIF, ...)
    /// become `.png`. When `format` is given its extension is used instead.
    #[must_use]
    pub fn output_path(input: &Path, suffix: &str, format: Option<OutputFormat>) -> PathBuf {
        let stem = input
            .file_stem()
            .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned());

        let extension = match format {
            Some(format) => format.extension().to_string(),
            None => match input.extension().map(|e| e.to_string_lossy().to_lowercase()) {
                Some(ext) if matches!(ext.as_str(), "png" | "webp" | "tif" | "tiff") => ext,
                _ => OutputFormat::Png.extension().to_string(),
            },
        };

        input.with_file_name(format!("{}_{}.{}", stem, suffix, extension))
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChromaKeyError::file_io_error("create output directory", parent, &e)
            })?;
        }
        Ok(())
    }

    fn save_error(path: &Path, format_name: &str, error: &image::ImageError) -> ChromaKeyError {
        ChromaKeyError::processing_stage_error(
            "image save",
            &format!("Failed to save as {}: {}", format_name, error),
            Some(&format!("path: {}", path.display())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_naming() {
        let path = ImageIOService::output_path(Path::new("/tmp/photo.jpg"), "transparent", None);
        assert_eq!(path, PathBuf::from("/tmp/photo_transparent.png"));

        let path = ImageIOService::output_path(Path::new("shot.JPEG"), "alpha", None);
        assert_eq!(path, PathBuf::from("shot_alpha.png"));

        let path = ImageIOService::output_path(Path::new("logo.webp"), "noalpha", None);
        assert_eq!(path, PathBuf::from("logo_noalpha.webp"));

        let path = ImageIOService::output_path(Path::new("scan.bmp"), "transparent", None);
        assert_eq!(path, PathBuf::from("scan_transparent.png"));

        let path = ImageIOService::output_path(Path::new("anim.GIF"), "alpha", None);
        assert_eq!(path, PathBuf::from("anim_alpha.png"));

        let path = ImageIOService::output_path(Path::new("page.TIF"), "transparent", None);
        assert_eq!(path, PathBuf::from("page_transparent.tif"));

        let path = ImageIOService::output_path(
            Path::new("logo.png"),
            "transparent",
            Some(OutputFormat::Tiff),
        );
        assert_eq!(path, PathBuf::from("logo_transparent.tiff"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("out.png");
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));

        ImageIOService::save_rgba(&image, &path, OutputFormat::Png).unwrap();
        let loaded = ImageIOService::load_image(&path).unwrap().to_rgba8();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_load_detects_content_with_wrong_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png_path = temp_dir.path().join("real.png");
        let image = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 255]));
        ImageIOService::save_rgba(&image, &png_path, OutputFormat::Png).unwrap();

        let misnamed = temp_dir.path().join("real.tiff");
        std::fs::copy(&png_path, &misnamed).unwrap();
        let loaded = ImageIOService::load_image(&misnamed).unwrap();
        assert_eq!(loaded.to_rgba8(), image);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = ImageIOService::load_image("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, ChromaKeyError::Io(_)));
        assert!(err.to_string().contains("read image file"));
    }

    #[test]
    fn test_raw_rgba8_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.rgba");
        let image = RgbaImage::from_pixel(2, 1, Rgba([5, 6, 7, 8]));

        ImageIOService::save_rgba(&image, &path, OutputFormat::Rgba8).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![5, 6, 7, 8, 5, 6, 7, 8]);
    }
}
