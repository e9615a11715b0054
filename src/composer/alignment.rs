use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ComposerError;
use super::image_processing::ImageSize;

/// Side length of the square canvas the preset points are defined against
pub const REFERENCE_CANVAS: u32 = 700;

/// Named placement presets for the watermark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum Alignment {
    #[default]
    #[serde(rename = "center")]
    Center,
    #[serde(rename = "top left", alias = "top-left")]
    TopLeft,
    #[serde(rename = "top right", alias = "top-right")]
    TopRight,
    #[serde(rename = "bottom left", alias = "bottom-left")]
    BottomLeft,
    #[serde(rename = "bottom right", alias = "bottom-right")]
    BottomRight,
}

/// Which point of the text bounding box sits on the placement point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Resolved placement: a point on the reference canvas plus its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub anchor: Anchor,
}

impl Alignment {
    pub const ALL: [Alignment; 5] = [
        Alignment::Center,
        Alignment::TopLeft,
        Alignment::TopRight,
        Alignment::BottomLeft,
        Alignment::BottomRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Alignment::Center => "center",
            Alignment::TopLeft => "top left",
            Alignment::TopRight => "top right",
            Alignment::BottomLeft => "bottom left",
            Alignment::BottomRight => "bottom right",
        }
    }

    pub fn placement(&self) -> Placement {
        let (x, y, anchor) = match self {
            Alignment::Center => (350, 350, Anchor::Center),
            Alignment::TopLeft => (30, 30, Anchor::TopLeft),
            Alignment::TopRight => (670, 30, Anchor::TopRight),
            Alignment::BottomLeft => (30, 670, Anchor::BottomLeft),
            Alignment::BottomRight => (670, 670, Anchor::BottomRight),
        };
        Placement { x, y, anchor }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Alignment {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_ascii_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Alignment::ALL
            .into_iter()
            .find(|alignment| alignment.name() == normalized)
            .ok_or_else(|| ComposerError::InvalidAlignment(s.to_string()))
    }
}

impl Anchor {
    /// Offset from the anchor point to the top-left corner of a box of the given size
    pub fn box_offset(&self, width: f32, height: f32) -> (f32, f32) {
        match self {
            Anchor::Center => (-width / 2.0, -height / 2.0),
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::TopRight => (-width, 0.0),
            Anchor::BottomLeft => (0.0, -height),
            Anchor::BottomRight => (-width, -height),
        }
    }
}

impl Placement {
    /// Map the reference point proportionally onto a canvas of another size
    pub fn point_on(&self, canvas: ImageSize) -> (f32, f32) {
        let scale_x = canvas.width as f32 / REFERENCE_CANVAS as f32;
        let scale_y = canvas.height as f32 / REFERENCE_CANVAS as f32;
        (self.x as f32 * scale_x, self.y as f32 * scale_y)
    }
}
