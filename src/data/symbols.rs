//! Accent and special-letter mappings between LaTeX and Unicode
//!
//! All tables are built at compile time with `phf`. The accent set is closed:
//! fifteen diacritics in the U+0300..U+0331 range and thirteen letters that
//! LaTeX spells as argument-less macros.

use phf::phf_map;

/// How a LaTeX escape name (the text after `\`) is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatexSpecial {
    /// Accent triggered by a single punctuation byte (`` \` ``, `\'`, `\"`, ...)
    SymbolAccent(char),
    /// Accent triggered by an ASCII letter (`\c`, `\v`, `\H`, ...).
    /// A bare letter argument would merge into the macro name.
    LetterAccent(char),
    /// Letter macro standing for a single code point (`\L`, `\ss`, ...)
    Letter(char),
}

/// Unicode combining mark → LaTeX accent trigger
pub static COMBINING_TO_ACCENT: phf::Map<char, u8> = phf_map! {
    '\u{0300}' => b'`',  // grave: à
    '\u{0301}' => b'\'', // acute: á
    '\u{0302}' => b'^',  // circumflex: â
    '\u{0303}' => b'~',  // tilde: ã
    '\u{0304}' => b'=',  // macron: ā
    '\u{0306}' => b'u',  // breve: ă
    '\u{0307}' => b'.',  // dot above: ġ
    '\u{0308}' => b'"',  // diaeresis: ä
    '\u{030A}' => b'r',  // ring: å
    '\u{030B}' => b'H',  // double acute: ő
    '\u{030C}' => b'v',  // caron: č
    '\u{0323}' => b'd',  // dot below: ẹ
    '\u{0327}' => b'c',  // cedilla: ç
    '\u{0328}' => b'k',  // ogonek: ą
    '\u{0331}' => b'b',  // macron below: ḵ
};

/// LaTeX escape name → meaning
pub static LATEX_SPECIALS: phf::Map<&'static str, LatexSpecial> = phf_map! {
    "`" => LatexSpecial::SymbolAccent('\u{0300}'),
    "'" => LatexSpecial::SymbolAccent('\u{0301}'),
    "^" => LatexSpecial::SymbolAccent('\u{0302}'),
    "~" => LatexSpecial::SymbolAccent('\u{0303}'),
    "=" => LatexSpecial::SymbolAccent('\u{0304}'),
    "." => LatexSpecial::SymbolAccent('\u{0307}'),
    "\"" => LatexSpecial::SymbolAccent('\u{0308}'),
    "u" => LatexSpecial::LetterAccent('\u{0306}'),
    "r" => LatexSpecial::LetterAccent('\u{030A}'),
    "H" => LatexSpecial::LetterAccent('\u{030B}'),
    "v" => LatexSpecial::LetterAccent('\u{030C}'),
    "d" => LatexSpecial::LetterAccent('\u{0323}'),
    "c" => LatexSpecial::LetterAccent('\u{0327}'),
    "k" => LatexSpecial::LetterAccent('\u{0328}'),
    "b" => LatexSpecial::LetterAccent('\u{0331}'),
    "L" => LatexSpecial::Letter('Ł'),
    "l" => LatexSpecial::Letter('ł'),
    "O" => LatexSpecial::Letter('Ø'),
    "o" => LatexSpecial::Letter('ø'),
    "i" => LatexSpecial::Letter('ı'),
    "j" => LatexSpecial::Letter('ȷ'),
    "AA" => LatexSpecial::Letter('Å'),
    "aa" => LatexSpecial::Letter('å'),
    "AE" => LatexSpecial::Letter('Æ'),
    "ae" => LatexSpecial::Letter('æ'),
    "OE" => LatexSpecial::Letter('Œ'),
    "oe" => LatexSpecial::Letter('œ'),
    "ss" => LatexSpecial::Letter('ß'),
};

/// Special letter → self-delimiting LaTeX spelling
pub static LETTER_MACROS: phf::Map<char, &'static str> = phf_map! {
    'Ł' => "{\\L}",
    'ł' => "{\\l}",
    'Ø' => "{\\O}",
    'ø' => "{\\o}",
    'ı' => "{\\i}",
    'ȷ' => "{\\j}",
    'Å' => "{\\AA}",
    'å' => "{\\aa}",
    'Æ' => "{\\AE}",
    'æ' => "{\\ae}",
    'Œ' => "{\\OE}",
    'œ' => "{\\oe}",
    'ß' => "{\\ss}",
};

/// Rewrite of the innermost accent and its base letter before emitting LaTeX
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub accent: u8,
    pub letter: char,
    /// `None` drops the accent because the replacement letter carries it
    pub replacement_accent: Option<u8>,
    pub replacement_letter: char,
}

const fn adjust(
    accent: u8,
    letter: char,
    replacement_accent: Option<u8>,
    replacement_letter: char,
) -> Adjustment {
    Adjustment {
        accent,
        letter,
        replacement_accent,
        replacement_letter,
    }
}

/// Dotless i/j under accents above the letter, ring over a/A as å/Å.
///
/// Only `` ` ' ^ " `` promote i/j; other accents keep the dotted letter.
pub static ADJUSTMENTS: &[Adjustment] = &[
    adjust(b'`', 'i', Some(b'`'), 'ı'),
    adjust(b'\'', 'i', Some(b'\''), 'ı'),
    adjust(b'^', 'i', Some(b'^'), 'ı'),
    adjust(b'"', 'i', Some(b'"'), 'ı'),
    adjust(b'`', 'j', Some(b'`'), 'ȷ'),
    adjust(b'\'', 'j', Some(b'\''), 'ȷ'),
    adjust(b'^', 'j', Some(b'^'), 'ȷ'),
    adjust(b'"', 'j', Some(b'"'), 'ȷ'),
    adjust(b'r', 'a', None, 'å'),
    adjust(b'r', 'A', None, 'Å'),
];

/// LaTeX accent trigger for a combining mark
#[inline]
pub fn accent_for_mark(mark: char) -> Option<u8> {
    COMBINING_TO_ACCENT.get(&mark).copied()
}

/// Look up an escape name (without the leading backslash)
pub fn lookup_special(name: &[u8]) -> Option<LatexSpecial> {
    std::str::from_utf8(name)
        .ok()
        .and_then(|name| LATEX_SPECIALS.get(name))
        .copied()
}

/// Self-delimiting macro for a special letter, e.g. `ß` → `{\ss}`
#[inline]
pub fn letter_macro(letter: char) -> Option<&'static str> {
    LETTER_MACROS.get(&letter).copied()
}

/// Adjustment rule applying to `accent` written directly over `letter`
pub fn find_adjustment(accent: u8, letter: char) -> Option<&'static Adjustment> {
    ADJUSTMENTS
        .iter()
        .find(|adj| adj.accent == accent && adj.letter == letter)
}

/// Undo dotless-letter promotion: `ı` directly under an acute is `i`.
pub fn dotted_letter(letter: char, mark: char) -> Option<char> {
    let accent = accent_for_mark(mark)?;
    ADJUSTMENTS
        .iter()
        .find(|adj| adj.replacement_letter == letter && adj.replacement_accent == Some(accent))
        .map(|adj| adj.letter)
}

/// Bytes allowed in a multi-letter macro name
#[inline]
pub fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'@'
}
