//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Input charset detection and decoding
//! - Unicode normalization

pub mod encoding;
pub mod error;
pub mod normalize;

// Re-export commonly used items
pub use encoding::{
    detect_charset, detect_charset_complete, guess_utf16, is_ascii, is_utf8, InputDecoder,
};
pub use error::{ConversionError, ConversionResult};
pub use normalize::{Normalization, NormalizingWriter};
