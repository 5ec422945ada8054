//! Error types shared by the store, the spreadsheet codec and the service

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error for wrapping backend-specific errors
pub type BoxedError = Box<dyn StdError + Send + Sync>;

pub type Result<T, E = RateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RateError {
    /// Caller input is missing or malformed
    #[error("invalid input: {0}")]
    Validation(String),

    /// Query against an empty result set
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Durable store read or write failure
    #[error("persistence failed: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// File open, create or write failure
    #[error("i/o failed: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxedError>,
    },

    /// Unparsable spreadsheet row, `row` is the 1-based row number
    #[error("malformed row {row}: {message}")]
    Format { row: u32, message: String },
}

impl RateError {
    pub fn persistence(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn io(message: impl Into<String>, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn format(row: u32, message: impl Into<String>) -> Self {
        Self::Format {
            row,
            message: message.into(),
        }
    }

    /// True for errors caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_persistence_error_helper() {
        let source = io::Error::other("disk full");
        let err = RateError::persistence("failed to insert snapshot", source);

        match err {
            RateError::Persistence { message, source } => {
                assert_eq!(message, "failed to insert snapshot");
                assert!(source.is_some());
            }
            _ => panic!("Expected Persistence variant"),
        }
    }

    #[test]
    fn test_io_error_helper() {
        let source = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = RateError::io("failed to open workbook", source);

        match err {
            RateError::Io { message, source } => {
                assert_eq!(message, "failed to open workbook");
                assert!(source.is_some());
            }
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = RateError::format(7, "rate cell is empty");
        assert_eq!(err.to_string(), "malformed row 7: rate cell is empty");

        let err = RateError::Validation("missing rate fields: jpy, gbp".into());
        assert!(err.to_string().contains("jpy, gbp"));
        assert!(err.is_client_error());

        let err = RateError::NotFound("rate snapshot");
        assert!(err.to_string().contains("rate snapshot"));
        assert!(!err.is_client_error());
    }
}
