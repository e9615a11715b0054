use crate::Config;
use crate::composer::image_processing::formats;
use crate::composer::image_processing::{ImageSize, resolve_font_path};
use crate::composer::{Composer, ComposerError, Event, Outcome};
use image::{GenericImageView, ImageBuffer, ImageFormat, Rgb, Rgba};
use std::path::PathBuf;
use tempfile::TempDir;

// Composer with the watermark hidden, so exports work without a font file
fn composer_without_text() -> Composer {
    let mut config = Config::default();
    config.watermark.text = String::new();
    Composer::new(config).unwrap()
}

fn write_source(temp_dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = temp_dir.path().join(name);
    ImageBuffer::from_pixel(width, height, Rgb([255u8, 128, 64]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_export_png_matches_view_size() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(&temp_dir, "source.png", 1000, 500);
    let target = temp_dir.path().join("out.png");

    let mut composer = composer_without_text();
    composer.dispatch(Event::LoadImage(Some(source))).unwrap();
    let outcome = composer.dispatch(Event::SaveImage(Some(target.clone()))).unwrap();
    assert_eq!(outcome, Outcome::Saved(target.clone()));

    let saved = image::open(&target).unwrap();
    assert_eq!(saved.dimensions(), (700, 350));
    assert_eq!(
        image::ImageReader::open(&target)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format(),
        Some(ImageFormat::Png)
    );
}

#[test]
fn test_export_jpeg_for_both_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let source = write_source(&temp_dir, "source.jpg", 400, 800);

    let mut composer = composer_without_text();
    composer.dispatch(Event::LoadImage(Some(source))).unwrap();

    for name in ["out.jpg", "out.JPEG"] {
        let target = temp_dir.path().join(name);
        composer.dispatch(Event::SaveImage(Some(target.clone()))).unwrap();

        let format = image::ImageReader::open(&target)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(ImageFormat::Jpeg), "{}", name);
        assert_eq!(image::open(&target).unwrap().dimensions(), (350, 700));
    }
}

#[test]
fn test_export_without_extension_defaults_to_png() {
    let temp_dir = TempDir::new().unwrap();
    let mut composer = composer_without_text();

    let outcome = composer
        .dispatch(Event::SaveImage(Some(temp_dir.path().join("composed"))))
        .unwrap();
    let expected = temp_dir.path().join("composed.png");
    assert_eq!(outcome, Outcome::Saved(expected.clone()));
    assert!(expected.exists());
}

#[test]
fn test_export_before_load_writes_empty_canvas() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("blank.png");
    let mut composer = composer_without_text();

    composer.export(&target).unwrap();

    let saved = image::open(&target).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (700, 700));
    assert_eq!(saved.get_pixel(350, 350), &Rgba([0, 0, 0, 255]));
}

#[test]
fn test_export_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let mut composer = composer_without_text();

    let result = composer.export(&temp_dir.path().join("out.bmp"));
    assert!(matches!(result, Err(ComposerError::UnsupportedFormat(_))));
}

#[test]
fn test_export_into_missing_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let mut composer = composer_without_text();

    let result = composer.export(&temp_dir.path().join("no/such/dir/out.png"));
    assert!(matches!(result, Err(ComposerError::IoError(_))));
}

#[test]
fn test_export_with_visible_watermark_needs_font() {
    let temp_dir = TempDir::new().unwrap();
    let mut composer = Composer::new(Config::default()).unwrap();
    let target = temp_dir.path().join("marked.png");

    let result = composer.export(&target);
    if resolve_font_path(&Config::default().font.path).is_some() {
        assert!(result.is_ok());
        let saved = image::open(&target).unwrap().to_rgba8();
        // Default gray text on the black canvas
        assert!(saved.pixels().any(|p| p[0] > 100));
    } else {
        assert!(matches!(result, Err(ComposerError::FontError(_))));
        assert!(!target.exists());
    }
}

#[test]
fn test_export_with_huge_font_size() {
    let temp_dir = TempDir::new().unwrap();
    let mut composer = Composer::new(Config::default()).unwrap();
    let target = temp_dir.path().join("huge.png");

    let outcome = composer.dispatch(Event::FontSizeInput("20000".to_string())).unwrap();
    assert_eq!(outcome, Outcome::Updated);
    composer.dispatch(Event::AngleInput("30".to_string())).unwrap();

    let result = composer.dispatch(Event::SaveImage(Some(target.clone())));
    if resolve_font_path(&Config::default().font.path).is_some() {
        assert_eq!(result.unwrap(), Outcome::Saved(target.clone()));
        assert_eq!(image::open(&target).unwrap().dimensions(), (700, 700));
    } else {
        assert!(matches!(result, Err(ComposerError::FontError(_))));
    }
}

#[test]
fn test_icc_profile_passes_through() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("profiled.png");
    let profile = b"not a real icc profile but carried verbatim".to_vec();

    let pixels = ImageBuffer::from_pixel(64, 32, Rgba([10u8, 20, 30, 255]));
    formats::png::save_with_profile(&pixels, &source, Some(&profile)).unwrap();

    let source_data = std::fs::read(&source).unwrap();
    let Some(embedded) = formats::extract_icc_profile(ImageFormat::Png, &source_data) else {
        // Encoder did not embed the profile; nothing to pass through
        return;
    };
    assert_eq!(embedded, profile);

    let mut composer = composer_without_text();
    let outcome = composer.dispatch(Event::LoadImage(Some(source))).unwrap();
    assert_eq!(outcome, Outcome::Loaded(ImageSize::new(700, 350)));
    assert_eq!(
        composer.image().unwrap().icc_profile.as_deref(),
        Some(profile.as_slice())
    );

    let target = temp_dir.path().join("out.png");
    composer.export(&target).unwrap();
    let output_data = std::fs::read(&target).unwrap();
    assert_eq!(
        formats::extract_icc_profile(ImageFormat::Png, &output_data),
        Some(profile)
    );
}
