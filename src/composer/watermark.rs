use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ComposerError;
use super::alignment::Alignment;
use crate::WatermarkConfig;

/// Tk's "gray", the color of the default watermark
pub const DEFAULT_COLOR: Rgba<u8> = Rgba([190, 190, 190, 255]);

/// Text color of the watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum WatermarkColor {
    Fixed(Rgba<u8>),
    /// Black or white, whichever contrasts with the background under the text
    Auto,
}

impl Default for WatermarkColor {
    fn default() -> Self {
        WatermarkColor::Fixed(DEFAULT_COLOR)
    }
}

/// Parse a CSS color (`#rgb`, `#rrggbb`, `#rrggbbaa`, a color name, `rgb(...)`, ...)
pub fn parse_rgba(input: &str) -> Result<Rgba<u8>, ComposerError> {
    let value = input.trim().to_ascii_lowercase();
    let invalid = || ComposerError::InvalidColor(input.to_string());

    // Hex channels must be plain hex digits; integer parsing would let "+f" through
    if let Some(hex) = value.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
    }

    // Tk's gray is the X11 one, lighter than CSS gray
    if value == "gray" || value == "grey" {
        return Ok(DEFAULT_COLOR);
    }

    csscolorparser::parse(&value)
        .map(|color| Rgba(color.to_rgba8()))
        .map_err(|_| invalid())
}

impl FromStr for WatermarkColor {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(WatermarkColor::Auto)
        } else {
            parse_rgba(s).map(WatermarkColor::Fixed)
        }
    }
}

impl TryFrom<String> for WatermarkColor {
    type Error = ComposerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WatermarkColor> for String {
    fn from(color: WatermarkColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for WatermarkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatermarkColor::Auto => f.write_str("auto"),
            WatermarkColor::Fixed(Rgba([r, g, b, 255])) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            WatermarkColor::Fixed(Rgba([r, g, b, a])) => {
                write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
            }
        }
    }
}

/// Accept a numeric field only when it is a non-empty run of ASCII digits
fn parse_digits(input: &str) -> Option<u32> {
    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        input.parse().ok()
    } else {
        None
    }
}

/// Current overlay settings; every field can be changed independently
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkState {
    pub text: String,
    pub font_size: u32,
    pub color: WatermarkColor,
    pub alignment: Alignment,
    /// Degrees anticlockwise about the placement point
    pub angle: u32,
}

impl Default for WatermarkState {
    fn default() -> Self {
        Self::from_config(&WatermarkConfig::default())
    }
}

impl WatermarkState {
    pub fn from_config(config: &WatermarkConfig) -> Self {
        Self {
            text: config.text.clone(),
            font_size: config.font_size,
            color: config.color,
            alignment: config.alignment,
            angle: config.angle,
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Returns false (leaving the size untouched) for anything but digits
    pub fn set_font_size_input(&mut self, input: &str) -> bool {
        match parse_digits(input) {
            Some(size) => {
                self.font_size = size;
                true
            }
            None => false,
        }
    }

    /// Returns false (leaving the angle untouched) for anything but digits
    pub fn set_angle_input(&mut self, input: &str) -> bool {
        match parse_digits(input) {
            Some(angle) => {
                self.angle = angle;
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, color: WatermarkColor) {
        self.color = color;
    }

    pub fn set_alignment(&mut self, alignment: Alignment) {
        self.alignment = alignment;
    }

    /// Angle reduced to a single turn
    pub fn normalized_angle(&self) -> u32 {
        self.angle % 360
    }

    pub fn is_visible(&self) -> bool {
        self.font_size > 0 && !self.text.trim().is_empty()
    }
}
