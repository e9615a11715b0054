use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::{draw_text_mut, text_size};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::ImageSize;
use crate::composer::ComposerError;
use crate::composer::watermark::{WatermarkColor, WatermarkState};

/// Monospaced bold faces tried when the configured font file is missing
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Bold.ttf",
    "/Library/Fonts/Courier New Bold.ttf",
    "/System/Library/Fonts/Supplemental/Courier New Bold.ttf",
    "C:\\Windows\\Fonts\\courbd.ttf",
];

/// Pick the configured font if it exists, otherwise the first system fallback found
pub fn resolve_font_path(configured: &Path) -> Option<PathBuf> {
    if configured.exists() {
        return Some(configured.to_path_buf());
    }
    FALLBACK_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

pub fn load_font(configured: &Path) -> Result<FontVec, ComposerError> {
    let path = resolve_font_path(configured).ok_or_else(|| {
        ComposerError::FontError(format!("font file not found: {}", configured.display()))
    })?;
    debug!("Loading watermark font from {:?}", path);

    let font_data = std::fs::read(&path)
        .map_err(|e| ComposerError::FontError(format!("{}: {}", path.display(), e)))?;
    FontVec::try_from_vec(font_data)
        .map_err(|_| ComposerError::FontError(format!("failed to parse font {}", path.display())))
}

/// Canvas fill with the scaled image (if any) laid over it at the origin.
///
/// With no image the view is the whole canvas; once an image is loaded the view
/// shrinks to the image's dimensions.
pub fn base_view(background: Rgba<u8>, canvas: ImageSize, image: Option<&RgbaImage>) -> RgbaImage {
    match image {
        Some(image) => {
            let mut view = RgbaImage::from_pixel(image.width(), image.height(), background);
            imageops::overlay(&mut view, image, 0, 0);
            view
        }
        None => RgbaImage::from_pixel(canvas.width, canvas.height, background),
    }
}

/// Draw the watermark text onto the view.
///
/// The text box is anchored on the alignment point (scaled to the view) and
/// turned anticlockwise about that point by the watermark angle.
pub fn draw_watermark(view: &mut RgbaImage, watermark: &WatermarkState, font: &impl Font) {
    if !watermark.is_visible() {
        return;
    }

    let font_size = watermark.font_size as f32;
    // Nothing further than this from the anchor can land in the view
    let reach = (view.width() as f32).hypot(view.height() as f32).max(1.0);
    // Glyphs are rasterized no taller than the view's diagonal, then magnified
    let raster_size = font_size.min(reach);
    let magnify = font_size / raster_size;

    let scale = PxScale::from(raster_size);
    let (raster_width, _) = text_size(scale, font, &watermark.text);
    // Box spans the full line (ascent to descent) so glyphs drawn from its top stay inside
    let scaled_font = font.as_scaled(scale);
    let text_width = raster_width as f32 * magnify;
    let text_height = (scaled_font.ascent() - scaled_font.descent()).ceil() * magnify;

    let placement = watermark.alignment.placement();
    let (anchor_x, anchor_y) = placement.point_on(ImageSize::new(view.width(), view.height()));
    let (offset_x, offset_y) = placement.anchor.box_offset(text_width, text_height);

    let color = match watermark.color {
        WatermarkColor::Fixed(color) => color,
        WatermarkColor::Auto => determine_text_color(
            view,
            (anchor_x + offset_x).max(0.0) as u32,
            (anchor_y + offset_y).max(0.0) as u32,
            text_width as u32,
            text_height as u32,
        ),
    };
    let clear = Rgba([color[0], color[1], color[2], 0]);

    // Square layer centred on the anchor point, wide enough for any rotation of
    // the text box but clipped to the view's reach
    let radius = text_width.hypot(text_height).ceil().min(reach.ceil());
    let side = radius as u32 * 2 + 2;
    let raster_side = ((side as f32 / magnify).ceil() as u32).max(1);
    let raster_center = raster_side as f32 / 2.0;
    let to_raster = raster_side as f32 / side as f32;

    let mut layer = RgbaImage::from_pixel(raster_side, raster_side, clear);
    draw_text_mut(
        &mut layer,
        color,
        (raster_center + offset_x * to_raster).round() as i32,
        (raster_center + offset_y * to_raster).round() as i32,
        scale,
        font,
        &watermark.text,
    );
    if raster_side != side {
        layer = imageops::resize(&layer, side, side, imageops::FilterType::Triangle);
    }
    let center = side as f32 / 2.0;

    let angle = watermark.normalized_angle();
    if angle != 0 {
        // imageproc turns clockwise
        layer = rotate_about_center(
            &layer,
            -(angle as f32).to_radians(),
            Interpolation::Bilinear,
            clear,
        );
    }

    debug!(
        "Drawing watermark {:?} ({:.0}x{:.0}) at ({:.1}, {:.1}), angle {}",
        watermark.text, text_width, text_height, anchor_x, anchor_y, angle
    );

    imageops::overlay(
        view,
        &layer,
        (anchor_x - center).round() as i64,
        (anchor_y - center).round() as i64,
    );
}

fn linearize(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Determine whether to use black or white text based on the background
pub fn determine_text_color(image: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> Rgba<u8> {
    let x_end = x.saturating_add(width).min(image.width());
    let y_end = y.saturating_add(height).min(image.height());

    let mut total_luminance = 0.0;
    let mut pixel_count = 0;

    for py in y..y_end {
        for px in x..x_end {
            let pixel = image.get_pixel(px, py);
            // WCAG relative luminance
            total_luminance += 0.2126 * linearize(pixel[0])
                + 0.7152 * linearize(pixel[1])
                + 0.0722 * linearize(pixel[2]);
            pixel_count += 1;
        }
    }

    if pixel_count == 0 {
        return Rgba([255, 255, 255, 255]);
    }

    if total_luminance / (pixel_count as f32) < 0.5 {
        Rgba([255, 255, 255, 255])
    } else {
        Rgba([0, 0, 0, 255])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_text_color_dark_background() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let color = determine_text_color(&img, 0, 0, 50, 20);
        assert_eq!(color, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_determine_text_color_light_background() {
        let img = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        let color = determine_text_color(&img, 0, 0, 50, 20);
        assert_eq!(color, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_determine_text_color_outside_image() {
        let img = RgbaImage::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let color = determine_text_color(&img, 50, 50, 20, 20);
        assert_eq!(color, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_base_view_without_image_fills_canvas() {
        let view = base_view(Rgba([0, 0, 0, 255]), ImageSize::new(700, 700), None);
        assert_eq!(view.dimensions(), (700, 700));
        assert_eq!(view.get_pixel(699, 699), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_base_view_takes_image_size() {
        let image = RgbaImage::from_pixel(700, 350, Rgba([200, 10, 10, 255]));
        let view = base_view(Rgba([0, 0, 0, 255]), ImageSize::new(700, 700), Some(&image));
        assert_eq!(view.dimensions(), (700, 350));
        assert_eq!(view.get_pixel(0, 0), &Rgba([200, 10, 10, 255]));
    }

    #[test]
    fn test_base_view_shows_background_through_transparency() {
        let image = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 0]));
        let view = base_view(Rgba([0, 0, 255, 255]), ImageSize::new(700, 700), Some(&image));
        assert_eq!(view.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_missing_font_is_an_error() {
        let result = load_font(Path::new("/nonexistent/font.ttf"));
        // A system fallback may exist; only a missing one must error
        if resolve_font_path(Path::new("/nonexistent/font.ttf")).is_none() {
            assert!(matches!(result, Err(ComposerError::FontError(_))));
        }
    }

    #[test]
    fn test_garbage_font_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(load_font(&path), Err(ComposerError::FontError(_))));
    }
}
