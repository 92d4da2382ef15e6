use thiserror::Error;

/// Failures of the drawing engine. Only loading and encoding can fail.
#[derive(Debug, Error)]
pub enum DrawingError {
    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid data URL: {0}")]
    DataUrl(String),

    #[error("Failed to decode base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type DrawingResult<T> = Result<T, DrawingError>;
