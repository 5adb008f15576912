//! Error types for fundus preprocessing operations

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Result type alias for fundus preprocessing operations
pub type Result<T> = std::result::Result<T, FundusError>;

/// Error types for fundus preprocessing operations
#[derive(Error, Debug)]
pub enum FundusError {
    /// Input/output errors (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image codec errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Source file missing or not decodable as an image
    #[error("Failed to load image '{path}': {message}")]
    Load { path: String, message: String },

    /// Failure during enhancement, masking or writing
    #[error("Processing error: {0}")]
    Processing(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report serialization errors
    #[error("Report error: {0}")]
    Report(#[from] csv::Error),
}

/// Coarse error classification carried into processing results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The source could not be read or decoded
    LoadError,
    /// Any failure after the source was decoded
    ProcessingError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadError => write!(f, "LoadError"),
            Self::ProcessingError => write!(f, "ProcessingError"),
        }
    }
}

impl FundusError {
    /// Create a new processing error
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an image loading error for `path`
    pub fn load<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        Self::Load {
            path: path.as_ref().display().to_string(),
            message: msg.into(),
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Create processing error with stage context
    pub fn processing_stage_error(stage: &str, details: &str) -> Self {
        Self::Processing(format!("Processing failed at stage '{}': {}", stage, details))
    }

    /// Classify this error for reporting
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load { .. } => ErrorKind::LoadError,
            _ => ErrorKind::ProcessingError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FundusError::invalid_config("tile grid must be non-zero");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: tile grid must be non-zero"
        );
    }

    #[test]
    fn test_error_kind_classification() {
        let err = FundusError::load("a/b.jpg", "empty file");
        assert_eq!(err.kind(), ErrorKind::LoadError);
        assert!(err.to_string().contains("a/b.jpg"));
        assert!(err.to_string().contains("empty file"));

        let err = FundusError::processing("bad pixel format");
        assert_eq!(err.kind(), ErrorKind::ProcessingError);

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = FundusError::file_io_error("write output", Path::new("/out/x.png"), &io);
        assert_eq!(err.kind(), ErrorKind::ProcessingError);
        assert!(err.to_string().contains("write output"));
        assert!(err.to_string().contains("/out/x.png"));
    }

    #[test]
    fn test_config_value_error() {
        let err = FundusError::config_value_error("clip limit", -1.0, "> 0");
        let msg = err.to_string();
        assert!(msg.contains("clip limit"));
        assert!(msg.contains("-1"));
        assert!(msg.contains("> 0"));
    }
}
