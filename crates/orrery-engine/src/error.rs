use thiserror::Error;

/// Failures reading a persisted scene document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("document root is not a JSON object")]
    NotAnObject,
}

/// Failures producing an image snapshot.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("viewport has no pixels")]
    EmptyViewport,

    #[cfg(feature = "raster")]
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
