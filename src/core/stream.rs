//! Streaming driver for transformers
//!
//! `TransformWriter` owns the retry protocol: it keeps the unconsumed source
//! tail, drains the destination after every call and grows it when a single
//! unit of output does not fit.

use std::io::{self, Write};

use super::{Status, Transformer};
use crate::utils::error::{ConversionError, ConversionResult};

/// Tuning knobs for stream conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Bytes read from the input per call
    pub chunk_size: usize,
    /// Initial destination buffer size; grows on demand
    pub buffer_size: usize,
    /// Bytes inspected for charset detection
    pub peek_size: usize,
    /// Detect non-UTF-8 input (UTF-16, single-byte charsets).
    /// When false, input must be UTF-8 and malformed bytes are an error.
    pub detect_charset: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            buffer_size: 4096,
            peek_size: 4096,
            detect_charset: true,
        }
    }
}

impl ConvertOptions {
    /// Accept UTF-8 input only and fail on malformed bytes
    pub fn strict_utf8() -> Self {
        Self {
            detect_charset: false,
            ..Default::default()
        }
    }
}

/// `io::Write` adapter feeding everything written through a transformer
#[derive(Debug)]
pub struct TransformWriter<W: Write, T: Transformer> {
    inner: W,
    transformer: T,
    /// Source bytes not yet consumed by the transformer
    pending: Vec<u8>,
    dst: Vec<u8>,
    /// Source bytes consumed since creation, for error offsets
    consumed: usize,
}

impl<W: Write, T: Transformer> TransformWriter<W, T> {
    pub fn new(inner: W, transformer: T) -> Self {
        Self::with_capacity(inner, transformer, ConvertOptions::default().buffer_size)
    }

    /// Start with a destination buffer of `capacity` bytes (at least one)
    pub fn with_capacity(inner: W, transformer: T, capacity: usize) -> Self {
        Self {
            inner,
            transformer,
            pending: Vec::new(),
            dst: vec![0; capacity.max(1)],
            consumed: 0,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Signal end of input, flush pending state and return the inner writer
    pub fn finish(mut self) -> ConversionResult<W> {
        self.drive(true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Drop pending state and buffered source, e.g. after an error
    pub fn reset(&mut self) {
        self.transformer.reset();
        self.pending.clear();
        self.consumed = 0;
    }

    fn drive(&mut self, at_eof: bool) -> ConversionResult<()> {
        let mut start = 0;
        let result = loop {
            let progress = self
                .transformer
                .transform(&mut self.dst, &self.pending[start..], at_eof);
            if let Err(e) = self.inner.write_all(&self.dst[..progress.written]) {
                break Err(e.into());
            }
            start += progress.consumed;
            match progress.status {
                Status::Done => break Ok(()),
                Status::NeedMoreSource if at_eof => {
                    break Err(ConversionError::internal(
                        "transformer asked for more input after end of stream",
                    ))
                }
                Status::NeedMoreSource => break Ok(()),
                Status::DestinationFull => {
                    if progress.written == 0 && progress.consumed == 0 {
                        let size = self.dst.len() * 2;
                        log::debug!("growing destination buffer to {} bytes", size);
                        self.dst.resize(size, 0);
                    }
                }
                Status::Malformed => {
                    break Err(ConversionError::encoding_at(
                        "invalid UTF-8 sequence",
                        self.consumed + start,
                    ))
                }
            }
        };
        self.pending.drain(..start);
        self.consumed += start;
        log::trace!(
            "drive(at_eof={}): {} bytes pending, {} consumed",
            at_eof,
            self.pending.len(),
            self.consumed
        );
        result
    }
}

impl<W: Write, T: Transformer> Write for TransformWriter<W, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.drive(false)?;
        Ok(buf.len())
    }

    /// Flushes the inner writer. Pending transformer state is only
    /// released by `finish`, since more input may still change it.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Run a whole buffer through `transformer`
pub fn transform_bytes<T: Transformer>(transformer: T, input: &[u8]) -> ConversionResult<Vec<u8>> {
    let mut writer = TransformWriter::new(Vec::with_capacity(input.len()), transformer);
    writer.write_all(input)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LatexToUnicode, UnicodeToLatex};

    #[test]
    fn test_transform_bytes() {
        let out = transform_bytes(UnicodeToLatex::new(), "c\u{0327}a".as_bytes()).unwrap();
        assert_eq!(out, b"\\c{c}a");

        let out = transform_bytes(LatexToUnicode::new(), b"\\c{c}a").unwrap();
        assert_eq!(out, "c\u{0327}a".as_bytes());
    }

    #[test]
    fn test_one_byte_buffer_grows() {
        let mut writer = TransformWriter::with_capacity(Vec::new(), UnicodeToLatex::new(), 1);
        writer.write_all("ß and c\u{0327}".as_bytes()).unwrap();
        let out = writer.finish().unwrap();
        assert_eq!(out, b"{\\ss} and \\c{c}");
    }

    #[test]
    fn test_byte_at_a_time() {
        let input = "\\'\\`a {\\aa} \\c{c} \\LaTeX";
        let mut writer = TransformWriter::new(Vec::new(), LatexToUnicode::new());
        for b in input.bytes() {
            writer.write_all(&[b]).unwrap();
        }
        let out = writer.finish().unwrap();
        let expected = transform_bytes(LatexToUnicode::new(), input.as_bytes()).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_malformed_reports_offset() {
        let mut writer = TransformWriter::new(Vec::new(), UnicodeToLatex::new());
        writer.write_all(b"abc").unwrap();
        // more bytes could still follow, so the bad byte is only held back
        writer.write_all(b"d\xFF").unwrap();
        let err = writer.finish().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { offset: Some(4), .. }));
        assert!(err.to_string().contains("byte 4"));
    }

    #[test]
    fn test_truncated_input_fails_at_finish() {
        let mut writer = TransformWriter::new(Vec::new(), UnicodeToLatex::new());
        writer.write_all(&"é".as_bytes()[..1]).unwrap();
        let err = writer.finish().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { offset: Some(0), .. }));
    }

    #[test]
    fn test_strict_options() {
        let opts = ConvertOptions::strict_utf8();
        assert!(!opts.detect_charset);
        assert_eq!(opts.chunk_size, ConvertOptions::default().chunk_size);
    }
}
