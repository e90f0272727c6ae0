//! # laxents
//!
//! Streaming converter between LaTeX accent escapes and Unicode diacritics.
//!
//! ## Features
//!
//! - **Bidirectional**: `\'e` → `é` and `é` → `\'e`
//! - **Streaming**: resumable transformers with explicit backpressure, fed
//!   from any `io::Read` into any `io::Write` with bounded memory
//! - **Charset detection**: UTF-8, UTF-16 (BOM or heuristic) and a
//!   single-byte fallback for legacy input
//! - **WASM Support**: Compiles to WebAssembly for browser usage
//!
//! ## Usage Examples
//!
//! ### String Conversion
//!
//! ```rust
//! use laxents::{to_latex, to_unicode};
//!
//! // LaTeX → Unicode
//! assert_eq!(to_unicode(r"Erd\H{o}s").unwrap(), "Erdős");
//!
//! // Unicode → LaTeX
//! assert_eq!(to_latex("Ceci est œuf").unwrap(), r"Ceci est {\oe}uf");
//! ```
//!
//! ### Stream Conversion
//!
//! ```rust
//! use laxents::{convert_stream, ConvertOptions, Direction};
//!
//! let input: &[u8] = b"na\\\"ive caf\\'e\n";
//! let options = ConvertOptions::default();
//! let out = convert_stream(input, Vec::new(), Direction::ToUnicode, &options).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "naïve café\n");
//! ```

use std::io::{Read, Write};

/// Core conversion modules
pub mod core;

/// Data layer - static accent and letter tables
pub mod data;

/// Utility modules
pub mod utils;

/// WASM bindings (feature-gated)
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export core conversion types
pub use crate::core::{
    transform_bytes, ConvertOptions, LatexToUnicode, Progress, SliceWriter, Status,
    TransformWriter, Transformer, UnicodeToLatex,
};

// Re-export symbol data
pub use data::symbols;

// Re-export utilities
pub use utils::encoding::{detect_charset, InputDecoder};
pub use utils::error::{ConversionError, ConversionResult};
pub use utils::normalize::{Normalization, NormalizingWriter};

/// Conversion direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// LaTeX escapes → Unicode combining marks
    ToUnicode,
    /// Unicode combining marks → LaTeX escapes
    ToLatex,
}

impl Direction {
    /// Normalization form the transformer expects its input in.
    ///
    /// `UnicodeToLatex` sees one combining mark per accent only in NFD.
    /// Output is always NFC.
    pub fn input_form(self) -> Normalization {
        match self {
            Direction::ToUnicode => Normalization::Nfc,
            Direction::ToLatex => Normalization::Nfd,
        }
    }

    /// Fresh transformer for this direction
    pub fn transformer(self) -> Box<dyn Transformer> {
        match self {
            Direction::ToUnicode => Box::new(LatexToUnicode::new()),
            Direction::ToLatex => Box::new(UnicodeToLatex::new()),
        }
    }
}

/// Replace LaTeX accent escapes with Unicode characters (NFC)
pub fn to_unicode(input: &str) -> ConversionResult<String> {
    convert(input, Direction::ToUnicode)
}

/// Replace accented characters with LaTeX accent escapes
pub fn to_latex(input: &str) -> ConversionResult<String> {
    convert(input, Direction::ToLatex)
}

/// Convert a string in the given direction
pub fn convert(input: &str, direction: Direction) -> ConversionResult<String> {
    // a &str is UTF-8 already, charset sniffing could only mislead
    let out = convert_stream(
        input.as_bytes(),
        Vec::with_capacity(input.len()),
        direction,
        &ConvertOptions::strict_utf8(),
    )?;
    String::from_utf8(out).map_err(|e| ConversionError::internal(e.to_string()))
}

/// Convert everything `reader` yields and write it to `writer`.
///
/// The input is decoded (see [`ConvertOptions::detect_charset`]),
/// normalized for the direction, run through the transformer and written
/// out as NFC. Returns the writer once all output has been flushed.
pub fn convert_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    direction: Direction,
    options: &ConvertOptions,
) -> ConversionResult<W> {
    let output = NormalizingWriter::new(writer, Normalization::Nfc);
    let mut sink =
        TransformWriter::with_capacity(output, direction.transformer(), options.buffer_size);
    let mut decoder = InputDecoder::new(reader, direction.input_form(), options);

    while let Some(block) = decoder.next_block()? {
        sink.write_all(block.as_bytes())?;
    }
    if let Some(encoding) = decoder.encoding() {
        log::debug!("converted {} input {:?}", encoding.name(), direction);
    }

    let output = sink.finish()?;
    Ok(output.finish()?)
}
