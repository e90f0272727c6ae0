//! Core conversion modules
//!
//! This module contains the two streaming transformers and their driver:
//! - `to_latex`: Unicode (NFD) → LaTeX accent escapes
//! - `to_unicode`: LaTeX accent escapes → Unicode combining marks
//! - `stream`: `io::Write` adapter running the retry protocol
//!
//! A transformer is fed a source slice and a destination slice. It reports
//! exactly how many bytes it consumed and produced, and why it stopped.

pub mod stream;
pub mod to_latex;
pub mod to_unicode;
pub mod write;

pub use stream::{transform_bytes, ConvertOptions, TransformWriter};
pub use to_latex::UnicodeToLatex;
pub use to_unicode::LatexToUnicode;
pub use write::SliceWriter;

/// Why a `transform` call returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All source consumed and all pending output written
    Done,
    /// The source ends inside a construct; append more bytes to the
    /// unconsumed tail, or call again with `at_eof` set
    NeedMoreSource,
    /// The destination is full; drain it and call again from the
    /// unconsumed tail
    DestinationFull,
    /// The source is not valid UTF-8 and no further bytes can fix it
    Malformed,
}

/// Outcome of a single `transform` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes written to the destination
    pub written: usize,
    /// Bytes consumed from the source
    pub consumed: usize,
    pub status: Status,
}

impl Progress {
    #[inline]
    pub fn new(written: usize, consumed: usize, status: Status) -> Self {
        Self {
            written,
            consumed,
            status,
        }
    }
}

/// A resumable byte-stream transformation
pub trait Transformer {
    /// Convert as much of `src` into `dst` as possible.
    ///
    /// `at_eof` tells the transformer that no bytes will follow `src`, so
    /// ambiguous lookahead must be resolved and pending state flushed.
    fn transform(&mut self, dst: &mut [u8], src: &[u8], at_eof: bool) -> Progress;

    /// Drop all pending state
    fn reset(&mut self);
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn transform(&mut self, dst: &mut [u8], src: &[u8], at_eof: bool) -> Progress {
        (**self).transform(dst, src, at_eof)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
