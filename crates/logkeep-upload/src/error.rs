//! Error types for upload backends

use std::path::PathBuf;

/// Upload error type
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Cannot read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL generation failed: {0}")]
    UrlError(String),

    #[error("Uploader not configured")]
    NotConfigured,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;

impl UploadError {
    pub fn url<S: Into<String>>(msg: S) -> Self {
        UploadError::UrlError(msg.into())
    }

    pub fn other<S: Into<String>>(msg: S) -> Self {
        UploadError::Other(msg.into())
    }
}
