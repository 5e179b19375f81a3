//! Integration tests for complete chroma-key workflows
//!
//! These tests drive the public API end to end on small synthetic images.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use chroma_key::{
    key_out_color, key_out_color_from_bytes, ChromaKeyer, ImageIOService, KeyColor, KeyConfig,
    MatteStrategy, OutputFormat, Result,
};
use tempfile::TempDir;

/// Green screen with a red square in the middle and a soft green fringe around it
fn create_green_screen(size: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, Rgba([0, 255, 0, 255]));
    let inner = size / 4..size - size / 4;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if inner.contains(&x) && inner.contains(&y) {
            *pixel = Rgba([220, 30, 40, 255]);
        } else if (inner.start.saturating_sub(1)..=inner.end).contains(&x)
            && (inner.start.saturating_sub(1)..=inner.end).contains(&y)
        {
            *pixel = Rgba([110, 150, 40, 255]);
        }
    }
    image
}

fn encode(image: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut buffer, format)
        .unwrap();
    buffer.into_inner()
}

#[cfg(feature = "vectorized")]
#[test]
fn test_two_by_two_vectorized_matte() -> Result<()> {
    let mut image = RgbaImage::new(2, 2);
    image.put_pixel(0, 0, Rgba([0, 255, 0, 255]));
    image.put_pixel(1, 0, Rgba([10, 250, 5, 255]));
    image.put_pixel(0, 1, Rgba([128, 128, 128, 255]));
    image.put_pixel(1, 1, Rgba([255, 0, 0, 255]));

    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(10)
        .feather(20)
        .build()?;
    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    assert_eq!(result.metadata.strategy, MatteStrategy::Vectorized);
    assert!(result.metadata.spill_suppressed);
    assert!(result.metadata.warnings.is_empty());

    assert_eq!(result.image.get_pixel(0, 0)[3], 0);
    let near = result.image.get_pixel(1, 0)[3];
    assert!(near > 0 && near < 255, "near-key alpha {} should be partial", near);
    assert_eq!(result.image.get_pixel(0, 1)[3], 255);
    assert_eq!(result.image.get_pixel(1, 1)[3], 255);

    // Opaque subject pixels keep their colors
    assert_eq!(result.image.get_pixel(0, 1), &Rgba([128, 128, 128, 255]));
    assert_eq!(result.image.get_pixel(1, 1), &Rgba([255, 0, 0, 255]));

    Ok(())
}

#[cfg(feature = "vectorized")]
#[test]
fn test_white_key_removes_saturated_red_by_hue() -> Result<()> {
    // white has hue 0 and red is fully saturated at hue 0
    let image = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
    let config = KeyConfig::builder()
        .target(KeyColor::WHITE)
        .tolerance(10)
        .feather(20)
        .build()?;

    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    assert_eq!(result.metadata.strategy, MatteStrategy::Vectorized);
    assert!(result.image.pixels().all(|p| p[3] == 0));
    Ok(())
}

#[test]
fn test_fallback_within_tolerance_is_transparent() -> Result<()> {
    let image = RgbaImage::from_pixel(1, 1, Rgba([5, 250, 2, 255]));
    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(30)
        .build()?;

    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    assert_eq!(result.metadata.strategy, MatteStrategy::Scalar);
    assert_eq!(result.image.get_pixel(0, 0), &Rgba([5, 250, 2, 0]));
    Ok(())
}

#[test]
fn test_fallback_far_pixels_unchanged() -> Result<()> {
    let mut image = RgbaImage::from_pixel(3, 1, Rgba([0, 255, 0, 255]));
    image.put_pixel(1, 0, Rgba([200, 100, 50, 255]));
    image.put_pixel(2, 0, Rgba([200, 100, 50, 77]));
    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(10)
        .feather(5)
        .force_scalar(true)
        .build()?;

    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    assert_eq!(result.image.get_pixel(0, 0)[3], 0);
    assert_eq!(result.image.get_pixel(1, 0), &Rgba([200, 100, 50, 255]));
    assert_eq!(result.image.get_pixel(2, 0), &Rgba([200, 100, 50, 77]));
    assert_eq!(result.metadata.warnings.len(), 1);
    Ok(())
}

#[test]
fn test_fallback_feather_ramp() -> Result<()> {
    // max channel difference 20 with tolerance 10, feather 20 -> 255 * 10 / 20
    let image = RgbaImage::from_pixel(1, 1, Rgba([20, 255, 0, 255]));
    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(10)
        .feather(20)
        .force_scalar(true)
        .build()?;

    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;
    assert_eq!(result.image.get_pixel(0, 0), &Rgba([20, 255, 0, 127]));
    Ok(())
}

#[test]
fn test_exact_match_transparency() -> Result<()> {
    let mut image = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
    image.put_pixel(1, 1, Rgba([254, 255, 255, 255]));

    let config = KeyConfig::builder().target(KeyColor::WHITE).build()?;
    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    assert_eq!(result.metadata.statistics.transparent, 8);
    assert_eq!(result.metadata.statistics.opaque, 1);
    assert_eq!(result.image.get_pixel(1, 1), &Rgba([254, 255, 255, 255]));
    Ok(())
}

#[cfg(feature = "vectorized")]
#[test]
fn test_green_screen_subject_survives() -> Result<()> {
    let image = create_green_screen(32);
    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(20)
        .feather(30)
        .build()?;

    let result = key_out_color(&DynamicImage::ImageRgba8(image), &config)?;

    // Corners are pure key, the middle is the red subject
    assert_eq!(result.image.get_pixel(0, 0)[3], 0);
    assert_eq!(result.image.get_pixel(31, 31)[3], 0);
    assert_eq!(result.image.get_pixel(16, 16), &Rgba([220, 30, 40, 255]));

    let stats = result.metadata.statistics;
    assert_eq!(stats.total(), 32 * 32);
    assert!(stats.transparent > 0);
    assert!(stats.opaque > 0);

    // Spill suppression never adds green to the fringe
    let fringe = result.image.get_pixel(7, 7);
    assert!(fringe[1] <= 150);
    assert_eq!(fringe[0], 110);
    Ok(())
}

#[test]
fn test_source_alpha_is_an_upper_bound() -> Result<()> {
    let image = RgbaImage::from_pixel(2, 2, Rgba([200, 10, 10, 90]));
    for feather in [0, 15] {
        let config = KeyConfig::builder()
            .target(KeyColor::GREEN)
            .tolerance(10)
            .feather(feather)
            .build()?;
        let result = key_out_color(&DynamicImage::ImageRgba8(image.clone()), &config)?;
        assert!(result.image.pixels().all(|p| p[3] <= 90));
    }
    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("shot.png");
    std::fs::write(&input, encode(&create_green_screen(16), ImageFormat::Png))?;

    let keyer = ChromaKeyer::new(KeyConfig::builder().target(KeyColor::GREEN).build()?)?;
    let result = keyer.process_file(&input)?;
    assert_eq!(result.input_path.as_deref(), Some(input.display().to_string().as_str()));

    let output = ImageIOService::output_path(&input, "transparent", Some(OutputFormat::Png));
    assert_eq!(output.file_name().unwrap(), "shot_transparent.png");
    result.save(&output, OutputFormat::Png)?;

    let reloaded = ImageIOService::load_image(&output)?.to_rgba8();
    assert_eq!(reloaded, result.image);
    assert_eq!(reloaded.get_pixel(0, 0)[3], 0);
    assert_eq!(reloaded.get_pixel(8, 8)[3], 255);
    Ok(())
}

#[test]
fn test_jpeg_bytes_are_keyed() -> Result<()> {
    let bytes = {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])));
        let mut buffer = std::io::Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut buffer, ImageFormat::Jpeg)?;
        buffer.into_inner()
    };

    // JPEG shifts colors slightly; a small tolerance absorbs it
    let config = KeyConfig::builder()
        .target(KeyColor::GREEN)
        .tolerance(20)
        .build()?;
    let result = key_out_color_from_bytes(&bytes, &config)?;
    assert_eq!(result.metadata.statistics.transparent, 64);
    Ok(())
}

#[test]
fn test_rgba8_output_is_raw_pixels() -> Result<()> {
    let config = KeyConfig::builder().target(KeyColor::GREEN).build()?;
    let image = DynamicImage::ImageRgba8(create_green_screen(4));
    let result = key_out_color(&image, &config)?;

    let raw = result.to_bytes(OutputFormat::Rgba8)?;
    assert_eq!(raw.len(), 4 * 4 * 4);
    assert_eq!(raw, result.image.as_raw().clone());
    Ok(())
}

#[test]
fn test_metadata_serializes_to_json() -> Result<()> {
    let config = KeyConfig::builder().target(KeyColor::GREEN).build()?;
    let image = DynamicImage::ImageRgba8(create_green_screen(8));
    let result = key_out_color(&image, &config)?;

    let json = serde_json::to_value(&result.metadata).unwrap();
    assert_eq!(json["strategy"], "Scalar");
    assert_eq!(json["dimensions"][0], 8);
    assert!(result.summary().contains("transparent"));
    Ok(())
}
