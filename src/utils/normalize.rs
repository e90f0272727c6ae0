//! Unicode normalization around the transformers
//!
//! Normalization is applied per line: `\n` never composes with a
//! neighbour, so normalizing line by line gives the same result as
//! normalizing the whole text while keeping memory bounded.

use std::io::{self, Write};

use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Canonical composition (`é` as one code point)
    Nfc,
    /// Canonical decomposition (`e` followed by U+0301)
    Nfd,
}

impl Normalization {
    pub fn apply(self, text: &str) -> String {
        match self {
            Normalization::Nfc => text.nfc().collect(),
            Normalization::Nfd => text.nfd().collect(),
        }
    }
}

/// Split `text` after its last newline; the head is safe to normalize.
pub(crate) fn split_at_last_line(text: &str) -> (&str, &str) {
    match text.rfind('\n') {
        Some(i) => text.split_at(i + 1),
        None => ("", text),
    }
}

/// Writer normalizing UTF-8 output line by line before passing it on
#[derive(Debug)]
pub struct NormalizingWriter<W: Write> {
    inner: W,
    form: Normalization,
    buf: Vec<u8>,
}

impl<W: Write> NormalizingWriter<W> {
    pub fn new(inner: W, form: Normalization) -> Self {
        Self {
            inner,
            form,
            buf: Vec::new(),
        }
    }

    /// Normalize and write everything still buffered, then return the writer
    pub fn finish(mut self) -> io::Result<W> {
        let rest = std::mem::take(&mut self.buf);
        self.write_normalized(&rest)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_normalized(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let text = std::str::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.inner.write_all(self.form.apply(text).as_bytes())
    }
}

impl<W: Write> Write for NormalizingWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        // `\n` never occurs inside a multi-byte sequence
        if let Some(i) = self.buf.iter().rposition(|&b| b == b'\n') {
            let rest = self.buf.split_off(i + 1);
            let lines = std::mem::replace(&mut self.buf, rest);
            self.write_normalized(&lines)?;
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
