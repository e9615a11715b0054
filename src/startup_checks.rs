use crate::Config;
use crate::composer::image_processing::resolve_font_path;
use crate::composer::watermark::parse_rgba;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Canvas size must be non-zero, got {0}x{1}")]
    InvalidCanvasSize(u32, u32),

    #[error("Invalid canvas background color: {0}")]
    InvalidBackground(String),

    #[error("Watermark font not found: {0}")]
    FontMissing(String),

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidJpegQuality(u8),
}

impl StartupCheckError {
    /// Critical errors make a session impossible; the rest only degrade it
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::InvalidCanvasSize(..) | StartupCheckError::InvalidBackground(_)
        )
    }
}

pub fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let canvas = &config.canvas;
    if canvas.width == 0 || canvas.height == 0 {
        error!("Canvas size is invalid: {}x{}", canvas.width, canvas.height);
        errors.push(StartupCheckError::InvalidCanvasSize(
            canvas.width,
            canvas.height,
        ));
    } else {
        info!("Canvas size: {}x{}", canvas.width, canvas.height);
    }

    if parse_rgba(&canvas.background).is_err() {
        error!("Canvas background is not a color: {:?}", canvas.background);
        errors.push(StartupCheckError::InvalidBackground(
            canvas.background.clone(),
        ));
    }

    match resolve_font_path(&config.font.path) {
        Some(path) if path == config.font.path => info!("Watermark font found: {:?}", path),
        Some(path) => warn!(
            "Configured font {:?} missing, falling back to {:?}",
            config.font.path, path
        ),
        None => {
            warn!("Watermark font missing: {:?}", config.font.path);
            warn!("Rendering text will fail until a font is available");
            errors.push(StartupCheckError::FontMissing(
                config.font.path.display().to_string(),
            ));
        }
    }

    let quality = config.export.jpeg_quality;
    if quality == 0 || quality > 100 {
        warn!("JPEG quality {} is out of range", quality);
        errors.push(StartupCheckError::InvalidJpegQuality(quality));
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
