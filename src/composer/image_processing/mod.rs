// Image processing - fitting sources to the canvas, drawing the watermark, encoding output
pub mod formats;
mod layout;
mod load;
mod render;
mod types;

pub use layout::{fit_to_canvas, scale_to_canvas};
pub use load::{LoadedImage, load_image};
pub use render::{base_view, determine_text_color, draw_watermark, load_font, resolve_font_path};
pub use types::{ExportFormat, ImageSize};
