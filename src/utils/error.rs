//! Error handling for laxents conversions
//!
//! This module provides a unified error type and result type for all
//! conversion operations. Backpressure from the transformers (need more
//! source, destination full) is not an error and never reaches this type.

use std::fmt;
use std::io;

/// Conversion error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Input bytes are not valid in the expected encoding
    InvalidEncoding {
        message: String,
        /// Byte offset into the transformer input, when known
        offset: Option<usize>,
    },
    /// Invalid input or arguments
    InvalidInput { message: String },
    /// IO error (for file and stream operations)
    IoError { message: String },
    /// Internal error
    InternalError { message: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InvalidEncoding { message, offset } => {
                if let Some(offset) = offset {
                    write!(f, "Encoding error at byte {}: {}", offset, message)
                } else {
                    write!(f, "Encoding error: {}", message)
                }
            }
            ConversionError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            ConversionError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            ConversionError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<io::Error> for ConversionError {
    fn from(err: io::Error) -> Self {
        // errors raised by `TransformWriter` inside `io::Write` come back intact
        match err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<ConversionError>())
        {
            Some(inner) => inner.clone(),
            None => ConversionError::IoError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ConversionError> for io::Error {
    fn from(err: ConversionError) -> Self {
        let kind = match err {
            ConversionError::InvalidEncoding { .. } | ConversionError::InvalidInput { .. } => {
                io::ErrorKind::InvalidData
            }
            ConversionError::IoError { .. } | ConversionError::InternalError { .. } => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, err)
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

// Convenience constructors for errors
impl ConversionError {
    pub fn encoding(message: impl Into<String>) -> Self {
        ConversionError::InvalidEncoding {
            message: message.into(),
            offset: None,
        }
    }

    pub fn encoding_at(message: impl Into<String>, offset: usize) -> Self {
        ConversionError::InvalidEncoding {
            message: message.into(),
            offset: Some(offset),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ConversionError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ConversionError::InternalError {
            message: message.into(),
        }
    }
}
