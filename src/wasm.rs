//! WASM bindings for in-browser conversion.
//!
//! This module exposes the converter to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::Options;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert an HTML string to Haml.
///
/// The flags mirror the command-line options; when both attribute styles
/// are requested the HTML style wins.
#[wasm_bindgen]
pub fn html_to_haml(
    source: &str,
    erb: bool,
    xhtml: bool,
    html_attributes: bool,
    ruby19_attributes: bool,
) -> Result<String, JsValue> {
    let options = Options::new()
        .with_erb(erb)
        .with_xhtml(xhtml)
        .with_ruby19_style_attributes(ruby19_attributes)
        .with_html_style_attributes(html_attributes);

    crate::convert(source, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}
