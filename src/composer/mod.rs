pub mod alignment;
pub mod commands;
pub mod error;
pub mod events;
pub mod image_processing;
pub mod watermark;

pub use alignment::{Alignment, Anchor, Placement};
pub use error::ComposerError;
pub use events::{Event, Outcome};
pub use watermark::{WatermarkColor, WatermarkState};

use ab_glyph::FontVec;
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::Config;
use image_processing::{ExportFormat, ImageSize, LoadedImage};

/// Application state for one editing session: the canvas, the loaded image,
/// the watermark settings and the queue of deferred events.
pub struct Composer {
    config: Config,
    canvas: ImageSize,
    background: Rgba<u8>,
    watermark: WatermarkState,
    image: Option<LoadedImage>,
    font: Option<FontVec>,
    pending: VecDeque<Event>,
}

impl Composer {
    pub fn new(config: Config) -> Result<Self, ComposerError> {
        if config.canvas.width == 0 || config.canvas.height == 0 {
            return Err(ComposerError::InvalidCanvas(format!(
                "{}x{}",
                config.canvas.width, config.canvas.height
            )));
        }

        let canvas = ImageSize::new(config.canvas.width, config.canvas.height);
        let background = watermark::parse_rgba(&config.canvas.background)?;
        let watermark = WatermarkState::from_config(&config.watermark);

        Ok(Self {
            config,
            canvas,
            background,
            watermark,
            image: None,
            font: None,
            pending: VecDeque::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn canvas(&self) -> ImageSize {
        self.canvas
    }

    pub fn watermark(&self) -> &WatermarkState {
        &self.watermark
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Size of the composed view: the scaled image once loaded, the canvas before that
    pub fn view_size(&self) -> ImageSize {
        self.image
            .as_ref()
            .map(LoadedImage::size)
            .unwrap_or(self.canvas)
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn schedule(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    fn font(&mut self) -> Result<&FontVec, ComposerError> {
        let font = match self.font.take() {
            Some(font) => font,
            None => image_processing::load_font(&self.config.font.path)?,
        };
        Ok(self.font.insert(font))
    }

    /// Draw the composed view: background, scaled image, then the watermark
    pub fn render(&mut self) -> Result<RgbaImage, ComposerError> {
        let mut view = image_processing::base_view(
            self.background,
            self.canvas,
            self.image.as_ref().map(|loaded| &loaded.scaled),
        );

        if self.watermark.is_visible() {
            let watermark = self.watermark.clone();
            let font = self.font()?;
            image_processing::draw_watermark(&mut view, &watermark, font);
        }

        Ok(view)
    }

    /// Render and write the composed view; the extension picks the format.
    /// A path without an extension is saved as PNG.
    pub fn export(&mut self, path: &Path) -> Result<PathBuf, ComposerError> {
        let path = if path.extension().is_none() {
            path.with_extension(ExportFormat::Png.extension())
        } else {
            path.to_path_buf()
        };
        let format = ExportFormat::from_path(&path)?;

        let view = self.render()?;
        let icc_profile = self
            .image
            .as_ref()
            .and_then(|loaded| loaded.icc_profile.as_deref());

        image_processing::formats::save(
            &view,
            &path,
            format,
            self.config.export.jpeg_quality,
            icc_profile,
        )?;

        info!(
            "Saved {}x{} {:?} image to {:?}",
            view.width(),
            view.height(),
            format.image_format(),
            path
        );
        Ok(path)
    }
}
