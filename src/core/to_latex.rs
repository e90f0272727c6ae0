//! Unicode → LaTeX accent transformer
//!
//! Input must be NFD: a base letter followed by its combining marks. Each
//! base letter is held until the next non-mark code point shows that its
//! accent stack is complete, then written as `\acc...letter`.

use super::write::SliceWriter;
use super::{Progress, Status, Transformer};
use crate::data::symbols::{accent_for_mark, find_adjustment, letter_macro};

/// Converts combining diacritics into LaTeX accent escapes
#[derive(Debug, Default, Clone)]
pub struct UnicodeToLatex {
    /// Base letter waiting for its accents
    letter: Option<char>,
    /// Accent triggers, innermost (first read) first
    accents: Vec<u8>,
}

impl UnicodeToLatex {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.letter.is_none() && self.accents.is_empty()
    }

    /// Apply the adjustment table to the innermost accent.
    ///
    /// Idempotent: the replacement letters never match a rule, so a flush
    /// retried after `DestinationFull` sees the same state.
    fn adjust(&mut self) {
        let (Some(letter), Some(&innermost)) = (self.letter, self.accents.first()) else {
            return;
        };
        if let Some(adj) = find_adjustment(innermost, letter) {
            match adj.replacement_accent {
                Some(accent) => self.accents[0] = accent,
                None => {
                    self.accents.remove(0);
                }
            }
            self.letter = Some(adj.replacement_letter);
        }
    }

    /// Write the pending accents (outermost first) followed by the letter.
    ///
    /// Returns false and leaves `out` untouched when it does not fit.
    fn flush(&mut self, out: &mut SliceWriter<'_>) -> bool {
        if self.is_empty() {
            return true;
        }
        self.adjust();
        let accents = &self.accents;
        let letter = self.letter;
        let written = out.atomically(|out| {
            // a bare letter after `\c` would become part of the macro name
            let mut grouped = false;
            for &accent in accents.iter().rev() {
                if !out.write_byte(b'\\') || !out.write_byte(accent) {
                    return false;
                }
                grouped = accent.is_ascii_alphabetic();
            }
            match letter {
                None => true,
                Some(c) => match letter_macro(c) {
                    Some(spelling) => out.write_str(spelling),
                    None if grouped => {
                        out.write_byte(b'{') && out.write_char(c) && out.write_byte(b'}')
                    }
                    None => out.write_char(c),
                },
            }
        });
        if written {
            self.letter = None;
            self.accents.clear();
        }
        written
    }
}

impl Transformer for UnicodeToLatex {
    fn transform(&mut self, dst: &mut [u8], src: &[u8], at_eof: bool) -> Progress {
        let mut out = SliceWriter::new(dst);
        let (text, utf8_error) = match std::str::from_utf8(src) {
            Ok(text) => (text, None),
            Err(e) => match std::str::from_utf8(&src[..e.valid_up_to()]) {
                Ok(text) => (text, Some(e)),
                Err(_) => return Progress::new(0, 0, Status::Malformed),
            },
        };

        for (i, c) in text.char_indices() {
            if let Some(accent) = accent_for_mark(c) {
                self.accents.push(accent);
                continue;
            }
            if !self.flush(&mut out) {
                return Progress::new(out.len(), i, Status::DestinationFull);
            }
            self.letter = Some(c);
        }

        let consumed = text.len();
        if let Some(e) = utf8_error {
            // invalid input is only an error once no more bytes can follow
            let status = if at_eof {
                Status::Malformed
            } else {
                Status::NeedMoreSource
            };
            log::trace!(
                "utf-8 stop at byte {} ({:?} bad bytes): {:?}",
                consumed,
                e.error_len(),
                status
            );
            return Progress::new(out.len(), consumed, status);
        }
        if !at_eof && !self.is_empty() {
            // the next chunk may start with more marks for the held letter
            return Progress::new(out.len(), consumed, Status::NeedMoreSource);
        }
        if !self.flush(&mut out) {
            return Progress::new(out.len(), consumed, Status::DestinationFull);
        }
        Progress::new(out.len(), consumed, Status::Done)
    }

    fn reset(&mut self) {
        self.letter = None;
        self.accents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_state(accents: &[u8], letter: char) -> UnicodeToLatex {
        UnicodeToLatex {
            letter: Some(letter),
            accents: accents.to_vec(),
        }
    }

    fn convert(src: &str) -> String {
        let mut t = UnicodeToLatex::new();
        let mut dst = vec![0u8; 256];
        let progress = t.transform(&mut dst, src.as_bytes(), true);
        assert_eq!(progress.status, Status::Done);
        assert_eq!(progress.consumed, src.len());
        String::from_utf8(dst[..progress.written].to_vec()).unwrap()
    }

    #[test]
    fn test_reset() {
        let mut t = with_state(b"`", 'a');
        t.reset();
        assert!(t.letter.is_none());
        assert!(t.accents.is_empty());
    }

    #[test]
    fn test_flush_letter() {
        let cases: [(char, bool, &str); 4] = [
            ('a', false, "a"),
            ('a', true, "{a}"),
            ('Ł', false, "{\\L}"),
            ('Ł', true, "{\\L}"),
        ];
        for (letter, grouped, expected) in cases {
            let accents: &[u8] = if grouped { b"c" } else { b"" };
            let mut t = with_state(accents, letter);
            let mut buf = [0u8; 16];
            let mut out = SliceWriter::new(&mut buf);
            assert!(t.flush(&mut out));
            let n = out.len();
            let prefix = if grouped { "\\c" } else { "" };
            assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), format!("{}{}", prefix, expected));
        }
    }

    #[test]
    fn test_flush_accents() {
        let cases: [(&[u8], char, &str); 5] = [
            (b"`", 'a', "\\`a"),
            (b"c", 'c', "\\c{c}"),
            (b"`'", 'a', "\\'\\`a"),
            (b"`'^", 'a', "\\^\\'\\`a"),
            (b"c'", 'c', "\\'\\c{c}"),
        ];
        for (accents, letter, expected) in cases {
            let mut t = with_state(accents, letter);
            let mut buf = [0u8; 16];
            let mut out = SliceWriter::new(&mut buf);
            assert!(t.flush(&mut out), "{}", expected);
            let n = out.len();
            assert_eq!(std::str::from_utf8(&buf[..n]).unwrap(), expected);
            assert!(t.is_empty());
        }
    }

    #[test]
    fn test_flush_without_room_keeps_state() {
        // `\c{c}` needs five bytes
        for room in 0..5 {
            let mut t = with_state(b"c", 'c');
            let mut buf = [b'.'; 8];
            let mut out = SliceWriter::new(&mut buf[..room]);
            assert!(!t.flush(&mut out), "room {}", room);
            assert_eq!(out.len(), 0);
            assert_eq!(t.letter, Some('c'));
            assert_eq!(t.accents, b"c");
        }
        let mut t = with_state(b"c", 'c');
        let mut buf = [0u8; 5];
        let mut out = SliceWriter::new(&mut buf);
        assert!(t.flush(&mut out));
        assert_eq!(&buf, b"\\c{c}");
    }

    #[test]
    fn test_adjust() {
        let mut t = with_state(b"'", 'i');
        t.adjust();
        assert_eq!(t.letter, Some('ı'));
        assert_eq!(t.accents, b"'");

        let mut t = with_state(b"r", 'a');
        t.adjust();
        assert_eq!(t.letter, Some('å'));
        assert!(t.accents.is_empty());

        // only the innermost accent is considered
        let mut t = with_state(b"~'", 'i');
        t.adjust();
        assert_eq!(t.letter, Some('i'));
    }

    #[test]
    fn test_transform_basic() {
        assert_eq!(convert(""), "");
        assert_eq!(convert("a"), "a");
        assert_eq!(convert("c\u{0327}"), "\\c{c}");
        assert_eq!(convert("e\u{0301}"), "\\'e");
        assert_eq!(convert("be\u{0302}ta\u{0302}"), "b\\^et\\^a");
        assert_eq!(convert("k\u{0331}"), "\\b{k}");
        assert_eq!(convert("Ceci est œuf"), "Ceci est {\\oe}uf");
    }

    #[test]
    fn test_transform_adjustments() {
        assert_eq!(convert("i\u{0301}"), "\\'{\\i}");
        assert_eq!(convert("j\u{0302}"), "\\^{\\j}");
        assert_eq!(convert("a\u{030A}"), "{\\aa}");
        assert_eq!(convert("A\u{030A}\u{0301}"), "\\'{\\AA}");
        assert_eq!(convert("i\u{0303}"), "\\~i");
        assert_eq!(convert("i\u{030C}"), "\\v{i}");
    }

    #[test]
    fn test_transform_unmapped_marks_pass_through() {
        assert_eq!(convert("η\u{0342}"), "η\u{0342}");
        assert_eq!(convert("α\u{0301}"), "\\'α");
    }

    #[test]
    fn test_transform_holds_letter_until_eof() {
        let mut t = UnicodeToLatex::new();
        let mut dst = [0u8; 32];
        let p = t.transform(&mut dst, b"ae", false);
        assert_eq!(p, Progress::new(1, 2, Status::NeedMoreSource));
        assert_eq!(&dst[..1], b"a");

        let p = t.transform(&mut dst, "\u{0301}".as_bytes(), true);
        assert_eq!(p.status, Status::Done);
        assert_eq!(&dst[..p.written], b"\\'e");
    }

    #[test]
    fn test_transform_split_code_point() {
        let bytes = "é".as_bytes();
        let mut t = UnicodeToLatex::new();
        let mut dst = [0u8; 32];
        let p = t.transform(&mut dst, &bytes[..1], false);
        assert_eq!(p, Progress::new(0, 0, Status::NeedMoreSource));

        let p = t.transform(&mut dst, &bytes[..1], true);
        assert_eq!(p.status, Status::Malformed);
    }

    #[test]
    fn test_transform_invalid_utf8() {
        let mut t = UnicodeToLatex::new();
        let mut dst = [0u8; 32];
        let p = t.transform(&mut dst, b"ab\xFFcd", false);
        assert_eq!(p.status, Status::NeedMoreSource);
        assert_eq!(p.consumed, 2);
        assert_eq!(&dst[..p.written], b"a");

        let p = t.transform(&mut dst, b"\xFFcd", true);
        assert_eq!(p, Progress::new(0, 0, Status::Malformed));
    }

    #[test]
    fn test_transform_destination_full() {
        let mut t = UnicodeToLatex::new();
        let src = "xc\u{0327}y".as_bytes();
        let mut dst = [0u8; 3];
        let p = t.transform(&mut dst, src, true);
        // `x` fits, `\c{c}` does not: stop before `y`
        assert_eq!(p.status, Status::DestinationFull);
        assert_eq!(p.written, 1);
        assert_eq!(p.consumed, 4);

        let mut dst = [0u8; 8];
        let p = t.transform(&mut dst, &src[4..], true);
        assert_eq!(p.status, Status::Done);
        assert_eq!(&dst[..p.written], b"\\c{c}y");
    }
}
