use image::{ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::formats;
use super::layout::scale_to_canvas;
use super::types::{ExportFormat, ImageSize};
use crate::composer::ComposerError;

/// A source image already fitted to the canvas, ready for display
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub original_size: ImageSize,
    pub scaled: RgbaImage,
    pub icc_profile: Option<Vec<u8>>,
}

impl LoadedImage {
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.scaled.width(), self.scaled.height())
    }
}

/// Decode a PNG or JPEG file and fit it to the canvas
pub fn load_image(path: &Path, canvas: ImageSize) -> Result<LoadedImage, ComposerError> {
    // Same extension filter as the export side
    ExportFormat::from_path(path)?;

    let data = std::fs::read(path)?;
    let reader = ImageReader::new(Cursor::new(&data)).with_guessed_format()?;
    let detected_format = reader.format();
    debug!(
        "Opening image file: {:?}, detected format: {:?}",
        path, detected_format
    );

    let image = reader.decode()?;
    let original_size = ImageSize::new(image.width(), image.height());
    let icc_profile =
        detected_format.and_then(|format| formats::extract_icc_profile(format, &data));

    let scaled = scale_to_canvas(&image, canvas);
    info!(
        "Loaded {:?} ({} scaled to {}x{})",
        path,
        original_size,
        scaled.width(),
        scaled.height()
    );

    Ok(LoadedImage {
        path: path.to_path_buf(),
        original_size,
        scaled,
        icc_profile,
    })
}
