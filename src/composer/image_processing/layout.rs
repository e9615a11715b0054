use image::{DynamicImage, RgbaImage, imageops::FilterType};
use tracing::debug;

use super::types::ImageSize;

/// Compute the largest size with the source's aspect ratio that fits inside `bounds`.
///
/// When the bounds are relatively wider than the source, height is the binding
/// constraint; otherwise (including equal ratios) width binds. The free axis is
/// truncated toward zero and never drops below one pixel.
pub fn fit_to_canvas(source: ImageSize, bounds: ImageSize) -> ImageSize {
    let aspect_ratio = source.aspect_ratio();

    if bounds.aspect_ratio() > aspect_ratio {
        let width = (bounds.height as f64 * aspect_ratio) as u32;
        ImageSize::new(width.clamp(1, bounds.width), bounds.height)
    } else {
        let height = (bounds.width as f64 / aspect_ratio) as u32;
        ImageSize::new(bounds.width, height.clamp(1, bounds.height))
    }
}

/// Resize an image to fit the canvas while preserving proportions
pub fn scale_to_canvas(image: &DynamicImage, bounds: ImageSize) -> RgbaImage {
    let source = ImageSize::new(image.width(), image.height());
    let target = fit_to_canvas(source, bounds);

    debug!("Scaling image from {} to {} (canvas {})", source, target, bounds);

    image
        .resize_exact(target.width, target.height, FilterType::Lanczos3)
        .to_rgba8()
}
