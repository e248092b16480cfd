//! Error types for logkeep

use std::path::PathBuf;

use crate::types::Category;

/// logkeep error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot create directory {path}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot rename file {from} to {to}: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot delete {path}: {source}")]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot get a new file name for {path} after {attempts} attempts")]
    NameExhausted { path: PathBuf, attempts: usize },

    #[error("Upload of {category} log {file} failed: {message}")]
    UploadFailed {
        file: PathBuf,
        category: Category,
        message: String,
    },

    #[error("Upload run failed: {0}")]
    UploadRunFailed(String),

    #[error("Work queue is closed")]
    QueueClosed,

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid log name: {0}")]
    InvalidLogName(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for logkeep
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn upload_run<S: Into<String>>(msg: S) -> Self {
        Error::UploadRunFailed(msg.into())
    }

    /// Whether this error came from the remote transport rather than local storage
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::UploadFailed { .. } | Error::UploadRunFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NotADirectory(PathBuf::from("/tmp/logs/structured"));
        assert_eq!(err.to_string(), "Not a directory: /tmp/logs/structured");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn test_upload_failed_is_transport() {
        let err = Error::UploadFailed {
            file: PathBuf::from("log-main.log.1"),
            category: Category::Structured,
            message: "HTTP 500".to_string(),
        };
        assert!(err.is_transport());
        assert!(err.to_string().contains("structured"));
        assert!(!Error::QueueClosed.is_transport());
    }
}
