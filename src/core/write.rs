//! Bounded writes into a caller-provided destination slice
//!
//! Every write either fits completely or leaves the written length
//! untouched, so a transformer can stop with `DestinationFull` and resume on
//! the next call without duplicating or losing output.

/// Destination slice plus the number of bytes already committed to it
#[derive(Debug)]
pub struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    /// Bytes committed so far
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }

    /// Write a single byte, returns false when the slice is full
    pub fn write_byte(&mut self, b: u8) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.buf[self.len] = b;
        self.len += 1;
        true
    }

    /// Write all of `bytes` or nothing
    pub fn write_bytes(&mut self, bytes: &[u8]) -> bool {
        if bytes.len() > self.remaining() {
            return false;
        }
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        true
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> bool {
        self.write_bytes(s.as_bytes())
    }

    /// Write the UTF-8 encoding of `c` or nothing
    pub fn write_char(&mut self, c: char) -> bool {
        let mut tmp = [0u8; 4];
        self.write_bytes(c.encode_utf8(&mut tmp).as_bytes())
    }

    /// Copy as much of `bytes` as fits and return how much was copied
    pub fn write_partial(&mut self, bytes: &[u8]) -> usize {
        let n = bytes.len().min(self.remaining());
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        n
    }

    /// Run a group of writes that must succeed together.
    ///
    /// When `f` returns false the committed length is restored to what it
    /// was before the call.
    pub fn atomically(&mut self, f: impl FnOnce(&mut Self) -> bool) -> bool {
        let mark = self.len;
        if f(self) {
            true
        } else {
            self.len = mark;
            false
        }
    }
}
