pub mod jpeg;
pub mod png;

use image::{ImageFormat, RgbaImage};
use std::path::Path;

pub use super::types::ExportFormat;
use crate::composer::ComposerError;

/// Pull an embedded ICC profile out of encoded PNG or JPEG bytes
pub fn extract_icc_profile(format: ImageFormat, data: &[u8]) -> Option<Vec<u8>> {
    match format {
        ImageFormat::Jpeg => jpeg::extract_icc_profile(data),
        ImageFormat::Png => png::extract_icc_profile(data),
        _ => None,
    }
}

/// Write the composed view in the requested format
pub fn save(
    image: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    jpeg_quality: u8,
    icc_profile: Option<&[u8]>,
) -> Result<(), ComposerError> {
    match format {
        ExportFormat::Jpeg => jpeg::save_with_profile(image, path, jpeg_quality, icc_profile),
        ExportFormat::Png => png::save_with_profile(image, path, icc_profile),
    }
}
