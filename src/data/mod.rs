//! Data layer - Static accent and letter tables
//!
//! All tables are `phf` maps built at compile time:
//! - Combining mark ↔ accent trigger
//! - LaTeX accent and special-letter macros
//! - Dotless-letter and ring adjustments

pub mod symbols;

// Re-export commonly used items
pub use symbols::{
    accent_for_mark, dotted_letter, find_adjustment, letter_macro, lookup_special, Adjustment,
    LatexSpecial, ADJUSTMENTS, COMBINING_TO_ACCENT, LATEX_SPECIALS, LETTER_MACROS,
};
