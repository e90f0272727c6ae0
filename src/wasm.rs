//! WASM bindings for laxents
//!
//! This module provides JavaScript-accessible functions for LaTeX ↔ Unicode
//! accent conversion.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::Direction;

/// Conversion options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct WasmConvertOptions {
    /// Convert Unicode to LaTeX instead of LaTeX to Unicode
    #[serde(default)]
    pub to_latex: bool,
}

/// Conversion result with additional metadata
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct ConvertResult {
    /// The converted output
    pub output: String,
    /// Whether the conversion was successful
    pub success: bool,
    /// Error message if conversion failed
    pub error: Option<String>,
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Replace LaTeX accent escapes with Unicode characters
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "toUnicode")]
pub fn to_unicode_wasm(input: &str) -> Result<String, JsError> {
    crate::to_unicode(input).map_err(|e| JsError::new(&e.to_string()))
}

/// Replace accented characters with LaTeX accent escapes
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "toLatex")]
pub fn to_latex_wasm(input: &str) -> Result<String, JsError> {
    crate::to_latex(input).map_err(|e| JsError::new(&e.to_string()))
}

/// Convert with options, returning `{ output, success, error }`
///
/// # Arguments
/// * `input` - Text to convert
/// * `options` - `{ to_latex: bool }`, LaTeX → Unicode when omitted
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "convert")]
pub fn convert_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: WasmConvertOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let direction = if opts.to_latex {
        Direction::ToLatex
    } else {
        Direction::ToUnicode
    };

    let result = match crate::convert(input, direction) {
        Ok(output) => ConvertResult {
            output,
            success: true,
            error: None,
        },
        Err(e) => ConvertResult {
            output: String::new(),
            success: false,
            error: Some(e.to_string()),
        },
    };

    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
