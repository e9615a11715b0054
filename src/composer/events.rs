use std::path::PathBuf;
use tracing::{debug, info};

use super::image_processing::{self, ImageSize, LoadedImage};
use super::{Alignment, Composer, ComposerError, WatermarkColor};

/// User interactions that change the composer state.
///
/// `None` payloads on the dialog-driven events mean the dialog was cancelled.
#[derive(Debug, Clone)]
pub enum Event {
    TextChanged(String),
    /// Raw contents of the font-size field
    FontSizeInput(String),
    ColorChosen(Option<WatermarkColor>),
    AlignmentSelected(Alignment),
    /// Raw contents of the rotation-angle field
    AngleInput(String),
    LoadImage(Option<PathBuf>),
    /// Deferred refresh queued by a successful load
    DisplayImage(Box<LoadedImage>),
    SaveImage(Option<PathBuf>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated,
    /// Input rejected without changing anything (non-digit numeric field)
    Ignored,
    Cancelled,
    /// Work was queued for the next drain of the event queue
    Scheduled,
    Loaded(ImageSize),
    Saved(PathBuf),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::TextChanged(_) => "text_changed",
            Event::FontSizeInput(_) => "font_size_input",
            Event::ColorChosen(_) => "color_chosen",
            Event::AlignmentSelected(_) => "alignment_selected",
            Event::AngleInput(_) => "angle_input",
            Event::LoadImage(_) => "load_image",
            Event::DisplayImage(_) => "display_image",
            Event::SaveImage(_) => "save_image",
        }
    }
}

impl Composer {
    /// Handle one event, then drain anything it scheduled.
    ///
    /// Returns the outcome of the last event processed, so a load reports
    /// `Loaded` once its deferred display has run.
    pub fn dispatch(&mut self, event: Event) -> Result<Outcome, ComposerError> {
        let outcome = self.handle(event)?;
        let mut drained = self.process_pending()?;
        Ok(drained.pop().unwrap_or(outcome))
    }

    /// Handle a single event without draining the queue
    pub fn handle(&mut self, event: Event) -> Result<Outcome, ComposerError> {
        debug!("Handling event: {}", event.name());

        match event {
            Event::TextChanged(text) => self.on_text_changed(text),
            Event::FontSizeInput(input) => self.on_font_size_input(&input),
            Event::ColorChosen(color) => self.on_color_chosen(color),
            Event::AlignmentSelected(alignment) => self.on_alignment_selected(alignment),
            Event::AngleInput(input) => self.on_angle_input(&input),
            Event::LoadImage(path) => self.on_load_image(path),
            Event::DisplayImage(loaded) => self.on_display_image(*loaded),
            Event::SaveImage(path) => self.on_save_image(path),
        }
    }

    /// Run queued events in order until the queue is empty
    pub fn process_pending(&mut self) -> Result<Vec<Outcome>, ComposerError> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.pending.pop_front() {
            outcomes.push(self.handle(event)?);
        }
        Ok(outcomes)
    }

    fn on_text_changed(&mut self, text: String) -> Result<Outcome, ComposerError> {
        self.watermark.set_text(text);
        Ok(Outcome::Updated)
    }

    fn on_font_size_input(&mut self, input: &str) -> Result<Outcome, ComposerError> {
        if self.watermark.set_font_size_input(input) {
            Ok(Outcome::Updated)
        } else {
            debug!("Ignoring non-numeric font size {:?}", input);
            Ok(Outcome::Ignored)
        }
    }

    fn on_angle_input(&mut self, input: &str) -> Result<Outcome, ComposerError> {
        if self.watermark.set_angle_input(input) {
            Ok(Outcome::Updated)
        } else {
            debug!("Ignoring non-numeric angle {:?}", input);
            Ok(Outcome::Ignored)
        }
    }

    fn on_color_chosen(&mut self, color: Option<WatermarkColor>) -> Result<Outcome, ComposerError> {
        match color {
            Some(color) => {
                self.watermark.set_color(color);
                Ok(Outcome::Updated)
            }
            None => Ok(Outcome::Cancelled),
        }
    }

    fn on_alignment_selected(&mut self, alignment: Alignment) -> Result<Outcome, ComposerError> {
        self.watermark.set_alignment(alignment);
        Ok(Outcome::Updated)
    }

    fn on_load_image(&mut self, path: Option<PathBuf>) -> Result<Outcome, ComposerError> {
        let Some(path) = path else {
            return Ok(Outcome::Cancelled);
        };

        let loaded = image_processing::load_image(&path, self.canvas)?;
        self.schedule(Event::DisplayImage(Box::new(loaded)));
        Ok(Outcome::Scheduled)
    }

    fn on_display_image(&mut self, loaded: LoadedImage) -> Result<Outcome, ComposerError> {
        let size = loaded.size();
        info!("Displaying {:?} at {}", loaded.path, size);
        self.image = Some(loaded);
        Ok(Outcome::Loaded(size))
    }

    fn on_save_image(&mut self, path: Option<PathBuf>) -> Result<Outcome, ComposerError> {
        match path {
            Some(path) => Ok(Outcome::Saved(self.export(&path)?)),
            None => Ok(Outcome::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn composer() -> Composer {
        Composer::new(Config::default()).unwrap()
    }

    fn write_test_image(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(width, height, Rgba([40, 80, 120, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_text_and_alignment_updates() {
        let mut composer = composer();
        assert_eq!(
            composer.dispatch(Event::TextChanged("© ACME".to_string())).unwrap(),
            Outcome::Updated
        );
        assert_eq!(
            composer
                .dispatch(Event::AlignmentSelected(Alignment::TopRight))
                .unwrap(),
            Outcome::Updated
        );
        assert_eq!(composer.watermark().text, "© ACME");
        assert_eq!(composer.watermark().alignment, Alignment::TopRight);
    }

    #[test]
    fn test_non_digit_numeric_input_is_ignored() {
        let mut composer = composer();
        let before = composer.watermark().clone();

        for input in ["", "abc", "-1", "1.5"] {
            assert_eq!(
                composer.dispatch(Event::FontSizeInput(input.to_string())).unwrap(),
                Outcome::Ignored
            );
            assert_eq!(
                composer.dispatch(Event::AngleInput(input.to_string())).unwrap(),
                Outcome::Ignored
            );
        }
        assert_eq!(composer.watermark(), &before);

        composer.dispatch(Event::FontSizeInput("12".to_string())).unwrap();
        composer.dispatch(Event::AngleInput("45".to_string())).unwrap();
        assert_eq!(composer.watermark().font_size, 12);
        assert_eq!(composer.watermark().angle, 45);
    }

    #[test]
    fn test_cancelled_dialogs_have_no_side_effects() {
        let mut composer = composer();
        let before = composer.watermark().clone();

        assert_eq!(composer.dispatch(Event::ColorChosen(None)).unwrap(), Outcome::Cancelled);
        assert_eq!(composer.dispatch(Event::LoadImage(None)).unwrap(), Outcome::Cancelled);
        assert_eq!(composer.dispatch(Event::SaveImage(None)).unwrap(), Outcome::Cancelled);

        assert_eq!(composer.watermark(), &before);
        assert!(composer.image().is_none());
        assert_eq!(composer.pending_events(), 0);
    }

    #[test]
    fn test_load_defers_display_until_queue_drains() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_test_image(&temp_dir, "wide.png", 1000, 500);
        let mut composer = composer();

        let outcome = composer.handle(Event::LoadImage(Some(path))).unwrap();
        assert_eq!(outcome, Outcome::Scheduled);
        assert!(composer.image().is_none());
        assert_eq!(composer.pending_events(), 1);
        assert_eq!(composer.view_size(), ImageSize::new(700, 700));

        let outcomes = composer.process_pending().unwrap();
        assert_eq!(outcomes, vec![Outcome::Loaded(ImageSize::new(700, 350))]);
        assert_eq!(composer.view_size(), ImageSize::new(700, 350));
        assert_eq!(
            composer.image().unwrap().original_size,
            ImageSize::new(1000, 500)
        );
    }

    #[test]
    fn test_dispatch_load_reports_loaded_size() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_test_image(&temp_dir, "tall.png", 400, 800);
        let mut composer = composer();

        let outcome = composer.dispatch(Event::LoadImage(Some(path))).unwrap();
        assert_eq!(outcome, Outcome::Loaded(ImageSize::new(350, 700)));
    }

    #[test]
    fn test_corrupt_image_surfaces_error_and_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_test_image(&temp_dir, "good.png", 100, 50);
        let corrupt = temp_dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();

        let mut composer = composer();
        composer.dispatch(Event::LoadImage(Some(good.clone()))).unwrap();

        let result = composer.dispatch(Event::LoadImage(Some(corrupt)));
        assert!(matches!(result, Err(ComposerError::ImageError(_))));
        assert_eq!(composer.image().unwrap().path, good);
        assert_eq!(composer.pending_events(), 0);
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut composer = composer();

        let missing = temp_dir.path().join("missing.png");
        assert!(matches!(
            composer.dispatch(Event::LoadImage(Some(missing))),
            Err(ComposerError::IoError(_))
        ));

        let gif = temp_dir.path().join("anim.gif");
        std::fs::write(&gif, b"GIF89a").unwrap();
        assert!(matches!(
            composer.dispatch(Event::LoadImage(Some(gif))),
            Err(ComposerError::UnsupportedFormat(_))
        ));
        assert!(composer.image().is_none());
    }

    #[test]
    fn test_save_rejects_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let mut composer = composer();
        let target = temp_dir.path().join("out.gif");

        assert!(matches!(
            composer.dispatch(Event::SaveImage(Some(target.clone()))),
            Err(ComposerError::UnsupportedFormat(_))
        ));
        assert!(!target.exists());
    }

    #[test]
    fn test_invalid_canvas_config() {
        let mut config = Config::default();
        config.canvas.width = 0;
        assert!(matches!(
            Composer::new(config),
            Err(ComposerError::InvalidCanvas(_))
        ));

        let mut config = Config::default();
        config.canvas.background = "nope".to_string();
        assert!(matches!(
            Composer::new(config),
            Err(ComposerError::InvalidColor(_))
        ));
    }
}
