//! # hamlize
//!
//! Convert HTML (and ERB-annotated HTML) into Haml templates.
//!
//! ## Features
//!
//! - HTML via html5ever, XHTML via quick-xml (CDATA and `/>` preserved)
//! - `#id`/`.class` shorthand and sorted attribute blocks in three styles
//! - Doctype translation to `!!!` lines
//! - `:javascript`, `:css`, `:cdata` and `:preserve` filters
//! - ERB marker elements (`loud`, `silent`, `block`) rendered as `=`/`-` lines
//!
//! ## Quick Start
//!
//! ```
//! use hamlize::{Options, convert};
//!
//! let haml = convert(
//!     r#"<div id="main"><p class="lead">Hello</p></div>"#,
//!     &Options::default(),
//! )
//! .unwrap();
//! assert_eq!(haml, "#main\n  %p.lead Hello\n");
//! ```
//!
//! ## Working with Trees
//!
//! Parsing and rendering are separate steps, so a tree can be built or
//! inspected before it is rendered:
//!
//! ```
//! use hamlize::Options;
//! use hamlize::dom::parse;
//! use hamlize::haml::render;
//!
//! let options = Options::new().with_xhtml(true);
//! let dom = parse("<br/>", &options).unwrap();
//! assert_eq!(render(&dom, &options).unwrap(), "%br/\n");
//! ```

pub mod dom;
pub mod error;
pub mod haml;
pub mod options;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::Dom;
pub use error::{Error, Result};
pub use options::{AttributeStyle, Options};

/// Convert markup text to Haml.
pub fn convert(source: &str, options: &Options) -> Result<String> {
    let dom = dom::parse(source, options)?;
    haml::render(&dom, options)
}

/// Convert raw bytes to Haml, checking the encoding first.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] when the bytes do not decode, with
/// the line of the first bad sequence.
pub fn convert_bytes(bytes: &[u8], options: &Options) -> Result<String> {
    let source = util::decode_input(bytes)?;
    convert(&source, options)
}

/// Render an already-built tree.
pub fn render(dom: &Dom, options: &Options) -> Result<String> {
    haml::render(dom, options)
}
