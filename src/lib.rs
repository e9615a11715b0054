use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod composer;
pub mod startup_checks;

use composer::{Alignment, WatermarkColor};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Fixed drawing area the loaded image is fitted into
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Fill color shown before an image is loaded (e.g. "#000000")
    pub background: String,
}

/// Initial watermark settings for a new session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatermarkConfig {
    pub text: String,
    pub font_size: u32,
    pub color: WatermarkColor,
    pub alignment: Alignment,
    pub angle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    pub jpeg_quality: u8,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 700,
            height: 700,
            background: "#000000".to_string(),
        }
    }
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            text: "YOUR WATERMARK".to_string(),
            font_size: 35,
            color: WatermarkColor::default(),
            alignment: Alignment::Center,
            angle: 0,
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("static/DejaVuSansMono-Bold.ttf"),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { jpeg_quality: 90 }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when it doesn't exist
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml_edit::de::from_str::<Config>(&content)?)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}
