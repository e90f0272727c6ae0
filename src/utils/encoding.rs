//! Input charset detection and decoding
//!
//! The transformers only see UTF-8. This module sniffs the first bytes of
//! the input, picks an encoding (BOM, UTF-16 heuristic, UTF-8, then a
//! `chardetng` guess among legacy charsets), decodes incrementally with `encoding_rs` and hands
//! out normalized text one block of whole lines at a time.

use std::io::{self, Read};

use chardetng::EncodingDetector;
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};

use super::error::{ConversionError, ConversionResult};
use super::normalize::{split_at_last_line, Normalization};
use crate::core::ConvertOptions;

/// True when there is no byte above 0x7F and no NUL
pub fn is_ascii(data: &[u8]) -> bool {
    data.iter().all(|&b| b != 0 && b.is_ascii())
}

/// Valid UTF-8, ignoring a code point cut off at the end of the sample
pub fn is_utf8(data: &[u8]) -> bool {
    match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Guess UTF-16 from a BOM, or from `<NUL><ascii>` / `<ascii><NUL>` pairs
pub fn guess_utf16(data: &[u8]) -> Option<&'static Encoding> {
    match data {
        [0xFE, 0xFF, ..] => return Some(UTF_16BE),
        [0xFF, 0xFE, ..] => return Some(UTF_16LE),
        _ => {}
    }
    let (mut be, mut le) = (0usize, 0usize);
    for pair in data.chunks_exact(2) {
        if pair[0] == 0 && pair[1] < 0x80 {
            be += 1;
        }
        if pair[0] < 0x80 && pair[1] == 0 {
            le += 1;
        }
    }
    match (be, le) {
        (0, 0) => None,
        (be, le) if be > le => Some(UTF_16BE),
        _ => Some(UTF_16LE),
    }
}

/// Detect the encoding of an input sample.
///
/// Returns `None` for plain ASCII, which needs no decoding. The sample may
/// end in the middle of a code point.
pub fn detect_charset(data: &[u8]) -> Option<&'static Encoding> {
    detect(data, false)
}

/// Like [`detect_charset`] for a sample holding the whole input, where a
/// cut-off code point at the end rules out UTF-8.
pub fn detect_charset_complete(data: &[u8]) -> Option<&'static Encoding> {
    detect(data, true)
}

fn detect(data: &[u8], complete: bool) -> Option<&'static Encoding> {
    if is_ascii(data) {
        return None;
    }
    if let Some((encoding, _)) = Encoding::for_bom(data) {
        return Some(encoding);
    }
    if data.contains(&0) {
        if let Some(encoding) = guess_utf16(data) {
            return Some(encoding);
        }
    }
    let utf8 = if complete {
        std::str::from_utf8(data).is_ok()
    } else {
        is_utf8(data)
    };
    if utf8 {
        return Some(UTF_8);
    }
    let mut detector = EncodingDetector::new();
    detector.feed(data, complete);
    Some(detector.guess(None, false))
}

/// Incremental decoder yielding normalized UTF-8 text in whole lines
pub struct InputDecoder<R: Read> {
    reader: R,
    form: Normalization,
    options: ConvertOptions,
    decoder: Option<Decoder>,
    /// Decoded text not yet handed out
    text: String,
    /// Raw bytes consumed so far, for error offsets
    offset: usize,
    eof: bool,
    /// Whether malformed input was replaced with U+FFFD
    lossy: bool,
}

impl<R: Read> InputDecoder<R> {
    pub fn new(reader: R, form: Normalization, options: &ConvertOptions) -> Self {
        Self {
            reader,
            form,
            options: options.clone(),
            decoder: None,
            text: String::new(),
            offset: 0,
            eof: false,
            lossy: false,
        }
    }

    /// Encoding in use, once the first chunk has been read
    pub fn encoding(&self) -> Option<&'static Encoding> {
        self.decoder.as_ref().map(|d| d.encoding())
    }

    /// Next block of normalized text, ending at a line boundary except for
    /// the last block. `None` once the input is exhausted.
    pub fn next_block(&mut self) -> ConversionResult<Option<String>> {
        loop {
            let head = split_at_last_line(&self.text).0.len();
            if head > 0 {
                let rest = self.text.split_off(head);
                let lines = std::mem::replace(&mut self.text, rest);
                return Ok(Some(self.form.apply(&lines)));
            }
            if self.eof {
                if self.text.is_empty() {
                    return Ok(None);
                }
                let rest = std::mem::take(&mut self.text);
                return Ok(Some(self.form.apply(&rest)));
            }
            self.fill()?;
        }
    }

    /// Read and decode one more chunk
    fn fill(&mut self) -> ConversionResult<()> {
        let size = if self.decoder.is_none() {
            self.options.peek_size.max(1)
        } else {
            self.options.chunk_size.max(1)
        };
        let raw = read_up_to(&mut self.reader, size)?;
        if self.decoder.is_none() {
            self.decoder = Some(self.choose_decoder(&raw));
        }
        self.eof = raw.is_empty();
        self.decode(&raw)?;
        if self.eof && self.lossy {
            log::warn!("malformed input bytes were replaced with U+FFFD");
        }
        Ok(())
    }

    fn choose_decoder(&self, sample: &[u8]) -> Decoder {
        if !self.options.detect_charset {
            return UTF_8.new_decoder_with_bom_removal();
        }
        // a short first read is the whole input
        let detected = if sample.len() < self.options.peek_size.max(1) {
            detect_charset_complete(sample)
        } else {
            detect_charset(sample)
        };
        let encoding = detected.unwrap_or(UTF_8);
        log::debug!("input charset: {}", encoding.name());
        // BOM sniffing overrides the guess when a BOM is present
        encoding.new_decoder()
    }

    fn decode(&mut self, raw: &[u8]) -> ConversionResult<()> {
        let strict = !self.options.detect_charset;
        let last = self.eof;
        let Some(decoder) = self.decoder.as_mut() else {
            return Err(ConversionError::internal("decoder used before initialisation"));
        };
        let mut input = raw;
        loop {
            let needed = if strict {
                decoder.max_utf8_buffer_length_without_replacement(input.len())
            } else {
                decoder.max_utf8_buffer_length(input.len())
            }
            .ok_or_else(|| ConversionError::internal("input chunk too large to decode"))?;
            self.text.reserve(needed);
            if strict {
                let (result, read) =
                    decoder.decode_to_string_without_replacement(input, &mut self.text, last);
                input = &input[read..];
                self.offset += read;
                match result {
                    DecoderResult::InputEmpty => return Ok(()),
                    DecoderResult::OutputFull => continue,
                    DecoderResult::Malformed(bad, after) => {
                        let at = self.offset.saturating_sub(bad as usize + after as usize);
                        return Err(ConversionError::encoding_at("input is not valid UTF-8", at));
                    }
                }
            } else {
                let (result, read, replaced) =
                    decoder.decode_to_string(input, &mut self.text, last);
                input = &input[read..];
                self.offset += read;
                self.lossy |= replaced;
                match result {
                    CoderResult::InputEmpty => return Ok(()),
                    CoderResult::OutputFull => continue,
                }
            }
        }
    }
}

/// Read until `size` bytes are collected or the reader is exhausted
fn read_up_to<R: Read>(reader: &mut R, size: usize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(size);
    reader.take(size as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn utf16be(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect()
    }

    fn read_all(
        input: &[u8],
        form: Normalization,
        options: &ConvertOptions,
    ) -> ConversionResult<String> {
        let mut decoder = InputDecoder::new(input, form, options);
        let mut out = String::new();
        while let Some(block) = decoder.next_block()? {
            out.push_str(&block);
        }
        Ok(out)
    }

    #[test]
    fn test_is_ascii() {
        assert!(is_ascii(b"plain \\'e"));
        assert!(!is_ascii("é".as_bytes()));
        assert!(!is_ascii(b"a\0b"));
    }

    #[test]
    fn test_is_utf8_allows_cut_sequence() {
        let bytes = "aé".as_bytes();
        assert!(is_utf8(bytes));
        assert!(is_utf8(&bytes[..2]));
        assert!(!is_utf8(b"a\xFFb"));
    }

    #[test]
    fn test_guess_utf16() {
        assert_eq!(guess_utf16(&[0xFE, 0xFF, 0, b'a']), Some(UTF_16BE));
        assert_eq!(guess_utf16(&[0xFF, 0xFE, b'a', 0]), Some(UTF_16LE));
        assert_eq!(guess_utf16(&utf16le("hello")), Some(UTF_16LE));
        assert_eq!(guess_utf16(&utf16be("hello")), Some(UTF_16BE));
        assert_eq!(guess_utf16(b"hello"), None);
    }

    #[test]
    fn test_detect_charset() {
        assert_eq!(detect_charset(b"plain"), None);
        assert_eq!(detect_charset("déjà".as_bytes()), Some(UTF_8));
        assert_eq!(detect_charset(&utf16le("déjà")), Some(UTF_16LE));
        assert_eq!(detect_charset(&utf16be("déjà")), Some(UTF_16BE));
        let french = detect_charset(b"Le caf\xE9 et le th\xE9 de l'\xE9t\xE9 ").unwrap();
        assert_ne!(french, UTF_8);
        assert_eq!(french.decode_without_bom_handling(b"\xE9t\xE9").0, "été");
        assert_eq!(detect_charset(b"\xEF\xBB\xBFabc\xC3\xA9"), Some(UTF_8));
    }

    #[test]
    fn test_detect_charset_complete() {
        assert_eq!(detect_charset(b"caf\xE9"), Some(UTF_8));
        assert_ne!(detect_charset_complete(b"caf\xE9"), Some(UTF_8));
        assert_eq!(detect_charset_complete("café".as_bytes()), Some(UTF_8));
    }

    #[test]
    fn test_decode_normalizes() {
        let options = ConvertOptions::default();
        let out = read_all("é\nè".as_bytes(), Normalization::Nfd, &options).unwrap();
        assert_eq!(out, "e\u{0301}\ne\u{0300}");
    }

    #[test]
    fn test_decode_utf16_with_bom() {
        let mut input = vec![0xFF, 0xFE];
        input.extend(utf16le("ça va"));
        let out = read_all(&input, Normalization::Nfc, &ConvertOptions::default()).unwrap();
        assert_eq!(out, "ça va");
    }

    #[test]
    fn test_decode_latin1() {
        let input = b"Le caf\xE9 et le th\xE9 de l'\xE9t\xE9\n";
        let out = read_all(input, Normalization::Nfc, &ConvertOptions::default()).unwrap();
        assert_eq!(out, "Le café et le thé de l'été\n");
    }

    #[test]
    fn test_decode_latin2() {
        let text = "Zażółć gęślą jaźń. Łódź jest pięknym miastem, a świat się śmieje.\n";
        let (input, _, _) = encoding_rs::WINDOWS_1250.encode(text);
        assert_eq!(detect_charset_complete(&input), Some(encoding_rs::WINDOWS_1250));
        let out = read_all(&input, Normalization::Nfc, &ConvertOptions::default()).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_decode_small_chunks() {
        let options = ConvertOptions {
            chunk_size: 1,
            peek_size: 1,
            ..Default::default()
        };
        let out = read_all("ab\nçé\n".as_bytes(), Normalization::Nfc, &options).unwrap();
        assert_eq!(out, "ab\nçé\n");
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let options = ConvertOptions::strict_utf8();
        let err = read_all(b"ok\n\xFF", Normalization::Nfc, &options).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidEncoding { offset: Some(3), .. }));
    }

    #[test]
    fn test_strict_strips_bom() {
        let options = ConvertOptions::strict_utf8();
        let out = read_all(b"\xEF\xBB\xBFabc", Normalization::Nfc, &options).unwrap();
        assert_eq!(out, "abc");
    }
}
