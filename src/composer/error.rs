use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Unsupported image format: {0} (expected .png, .jpg or .jpeg)")]
    UnsupportedFormat(String),

    #[error("Invalid canvas size: {0}")]
    InvalidCanvas(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Unknown alignment preset: {0}")]
    InvalidAlignment(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}
