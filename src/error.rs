//! Error types for exampage library.
//!
//! The layout core itself never fails: malformed markup degrades to empty or
//! zeroed values. Errors only come from the surrounding I/O, equation maps,
//! page-range parsing and JSON emission.

use std::io;
use thiserror::Error;

/// Result type alias for exampage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur around document extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The equation identifier map could not be understood.
    #[error("Invalid equation map: {0}")]
    InvalidEquationMap(String),

    /// Error during rendering of output records.
    #[error("Rendering error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidPageRange("x-y".to_string());
        assert_eq!(err.to_string(), "Invalid page range: x-y");

        let err = Error::InvalidEquationMap("expected object".to_string());
        assert_eq!(err.to_string(), "Invalid equation map: expected object");

        let err = Error::Render("bad float".to_string());
        assert_eq!(err.to_string(), "Rendering error: bad float");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
