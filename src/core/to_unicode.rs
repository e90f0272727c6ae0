//! LaTeX → Unicode accent transformer
//!
//! Recognises the fixed accent and letter escapes, collects accents until
//! their letter argument is known and writes `letter + marks` with the
//! outermost mark last. A `{` is held until the escape after it is known:
//! braces around a single accented or special letter are dropped, any other
//! group is written back unchanged. Unknown macros and all other text pass
//! through byte for byte. Output is meant to be recomposed to NFC by the
//! caller.

use super::write::SliceWriter;
use super::{Progress, Status, Transformer};
use crate::data::symbols::{dotted_letter, is_name_byte, lookup_special, LatexSpecial};

/// Result of a scan that may need bytes past the end of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lookahead<T> {
    Ready(T),
    NeedMore,
}

/// What follows a backslash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    /// Not in the table; copied verbatim
    Unknown,
    /// Special letter and the bytes its name (plus gobbled space or `{}`) spans
    Letter(char, usize),
    /// Combining mark and the bytes its trigger (plus gobbled space) spans
    Accent(char, usize),
}

/// Argument of an accent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Argument {
    /// `x`, `{x}` or `{\L}`
    Letter(char, usize),
    /// `{}`: the accent stands alone
    Empty,
    /// Anything else is left in the source
    Absent,
}

/// Classify the escape name at the start of `src` (just after `\`).
///
/// Multi-letter names are matched greedily over the whole `[A-Za-z@]` run, so
/// a run touching the end of `src` is only decided at end of input.
fn scan_escape(src: &[u8], at_eof: bool) -> Lookahead<Escape> {
    let Some(&first) = src.first() else {
        return if at_eof {
            Lookahead::Ready(Escape::Unknown)
        } else {
            Lookahead::NeedMore
        };
    };
    if !is_name_byte(first) {
        return Lookahead::Ready(match lookup_special(&src[..1]) {
            Some(LatexSpecial::SymbolAccent(mark)) => Escape::Accent(mark, 1),
            _ => Escape::Unknown,
        });
    }

    let run = src.iter().take_while(|&&b| is_name_byte(b)).count();
    if run == src.len() && !at_eof {
        return Lookahead::NeedMore;
    }
    let next = src.get(run).copied();
    match lookup_special(&src[..run]) {
        Some(LatexSpecial::Letter(c)) => match next {
            Some(b' ') => Lookahead::Ready(Escape::Letter(c, run + 1)),
            Some(b'{') => match src.get(run + 1) {
                Some(b'}') => Lookahead::Ready(Escape::Letter(c, run + 2)),
                None if !at_eof => Lookahead::NeedMore,
                _ => Lookahead::Ready(Escape::Letter(c, run)),
            },
            _ => Lookahead::Ready(Escape::Letter(c, run)),
        },
        Some(LatexSpecial::LetterAccent(mark)) => match next {
            Some(b' ') => Lookahead::Ready(Escape::Accent(mark, run + 1)),
            _ => Lookahead::Ready(Escape::Accent(mark, run)),
        },
        _ => Lookahead::Ready(Escape::Unknown),
    }
}

/// Read the letter argument of an accent: `x`, `{x}`, `{\L}` or `{}`
fn scan_argument(src: &[u8], at_eof: bool) -> Lookahead<Argument> {
    let need_more = if at_eof {
        Lookahead::Ready(Argument::Absent)
    } else {
        Lookahead::NeedMore
    };
    match src {
        [] => need_more,
        [b'{'] => need_more,
        [b'{', b'}', ..] => Lookahead::Ready(Argument::Empty),
        [b'{', _] => need_more,
        [b'{', c, b'}', ..] if c.is_ascii_alphabetic() => {
            Lookahead::Ready(Argument::Letter(*c as char, 3))
        }
        [b'{', b'\\', rest @ ..] => match scan_escape(rest, at_eof) {
            Lookahead::NeedMore => Lookahead::NeedMore,
            Lookahead::Ready(Escape::Letter(c, n)) => match rest.get(n) {
                Some(b'}') => Lookahead::Ready(Argument::Letter(c, n + 3)),
                None => need_more,
                Some(_) => Lookahead::Ready(Argument::Absent),
            },
            Lookahead::Ready(_) => Lookahead::Ready(Argument::Absent),
        },
        [c, ..] if c.is_ascii_alphabetic() => Lookahead::Ready(Argument::Letter(*c as char, 1)),
        _ => Lookahead::Ready(Argument::Absent),
    }
}

/// Converts LaTeX accent escapes into combining diacritics
#[derive(Debug, Default, Clone)]
pub struct LatexToUnicode {
    /// A `{` opened the item being assembled and has not been closed
    open_group: bool,
    letter: Option<char>,
    /// Combining marks, outermost (first read) first
    accents: Vec<char>,
}

impl LatexToUnicode {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        !self.open_group && self.letter.is_none() && self.accents.is_empty()
    }

    /// Write `{`, the letter and its marks (outermost last), then clear.
    ///
    /// Returns false and leaves `out` untouched when it does not fit.
    fn flush(&mut self, out: &mut SliceWriter<'_>) -> bool {
        if self.is_empty() {
            return true;
        }
        let letter = match (self.letter, self.accents.last()) {
            (Some(letter), Some(&innermost)) => {
                Some(dotted_letter(letter, innermost).unwrap_or(letter))
            }
            (letter, _) => letter,
        };
        let open_group = self.open_group;
        let accents = &self.accents;
        let written = out.atomically(|out| {
            (!open_group || out.write_byte(b'{'))
                && letter.map_or(true, |c| out.write_char(c))
                && accents.iter().rev().all(|&mark| out.write_char(mark))
        });
        if written {
            self.open_group = false;
            self.letter = None;
            self.accents.clear();
        }
        written
    }
}

impl Transformer for LatexToUnicode {
    fn transform(&mut self, dst: &mut [u8], src: &[u8], at_eof: bool) -> Progress {
        let mut out = SliceWriter::new(dst);
        let mut pos = 0;

        while pos < src.len() {
            // a cluster with its letter is complete
            if self.letter.is_some() {
                // closing brace that arrived after a chunk boundary
                if self.open_group && src[pos] == b'}' {
                    self.open_group = false;
                    pos += 1;
                }
                if !self.flush(&mut out) {
                    return Progress::new(out.len(), pos, Status::DestinationFull);
                }
                continue;
            }

            if src[pos] != b'\\' {
                match src[pos] {
                    b'{' => {
                        // held until the next escape shows whether it groups a letter
                        if !self.flush(&mut out) {
                            return Progress::new(out.len(), pos, Status::DestinationFull);
                        }
                        self.open_group = true;
                        pos += 1;
                        continue;
                    }
                    // an empty `{}` is written back by the flush below
                    b'}' if self.open_group && !self.accents.is_empty() => {
                        self.open_group = false;
                        pos += 1;
                    }
                    _ => {}
                }
                if !self.flush(&mut out) {
                    return Progress::new(out.len(), pos, Status::DestinationFull);
                }
                let end = src[pos..]
                    .iter()
                    .position(|&b| b == b'\\' || b == b'{')
                    .map_or(src.len(), |i| pos + i);
                let copied = out.write_partial(&src[pos..end]);
                pos += copied;
                if pos < end {
                    return Progress::new(out.len(), pos, Status::DestinationFull);
                }
                continue;
            }

            let escape = match scan_escape(&src[pos + 1..], at_eof) {
                Lookahead::Ready(escape) => escape,
                Lookahead::NeedMore => return Progress::new(out.len(), pos, Status::NeedMoreSource),
            };
            match escape {
                Escape::Unknown => {
                    if !self.flush(&mut out) {
                        return Progress::new(out.len(), pos, Status::DestinationFull);
                    }
                    // `\` plus the following byte, if any, verbatim
                    let end = (pos + 2).min(src.len());
                    if !out.write_bytes(&src[pos..end]) {
                        return Progress::new(out.len(), pos, Status::DestinationFull);
                    }
                    pos = end;
                    continue;
                }
                Escape::Letter(c, n) => {
                    self.letter = Some(c);
                    pos += 1 + n;
                }
                Escape::Accent(mark, n) => {
                    let arg_start = pos + 1 + n;
                    let argument = match scan_argument(&src[arg_start..], at_eof) {
                        Lookahead::Ready(argument) => argument,
                        Lookahead::NeedMore => {
                            return Progress::new(out.len(), pos, Status::NeedMoreSource)
                        }
                    };
                    self.accents.push(mark);
                    match argument {
                        Argument::Letter(c, m) => {
                            self.letter = Some(c);
                            pos = arg_start + m;
                        }
                        Argument::Empty => {
                            // `{}` ends the cluster: the marks stand alone
                            if !self.flush(&mut out) {
                                self.accents.pop();
                                return Progress::new(out.len(), pos, Status::DestinationFull);
                            }
                            pos = arg_start + 2;
                        }
                        Argument::Absent => pos = arg_start,
                    }
                }
            }

            if self.open_group {
                match src.get(pos) {
                    None if !at_eof => return Progress::new(out.len(), pos, Status::NeedMoreSource),
                    Some(b'}') => {
                        self.open_group = false;
                        pos += 1;
                    }
                    _ => {}
                }
            }
        }

        if !at_eof && self.letter.is_none() && !self.is_empty() {
            // accents or an open group may still combine with what follows
            return Progress::new(out.len(), pos, Status::NeedMoreSource);
        }
        if !self.flush(&mut out) {
            return Progress::new(out.len(), pos, Status::DestinationFull);
        }
        Progress::new(out.len(), pos, Status::Done)
    }

    fn reset(&mut self) {
        self.open_group = false;
        self.letter = None;
        self.accents.clear();
    }
}
