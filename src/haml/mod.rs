//! Haml generation from a parsed [`Dom`](crate::dom::Dom).
//!
//! The renderer walks the tree once and delegates to small pure helpers:
//!
//! - `escape`: HTML escaping, `#{` escaping, plain-text line emission
//! - `attributes`: explicit attribute blocks in the three literal styles,
//!   and the `#id`/`.class` shorthand test
//! - `doctype`: DTD public identifiers to `!!!` lines
//! - `filter`: `:javascript`/`:css`/`:cdata`/`:preserve` bodies
//! - `script`: `loud`/`silent` marker lines and `|` alignment
//! - `render`: the tree walk itself
//!
//! ## Design Notes
//!
//! - **Shorthand**: `id` and `class` values made only of `[-:\w]` become
//!   `#id` and `.class`; a `div` carrying one loses its `%div` tag. Class
//!   tokens that do not qualify stay in the attribute block.
//! - **Sorted attributes**: the explicit block is always in ascending name
//!   order, whatever the source order.
//! - **Inline glue**: an element directly followed by a word is either
//!   written with `>` (when it is already glued to the text before it) or
//!   wrapped in `= succeed "<word>" do`.
//! - **Script markers**: with `erb` enabled, `loud`, `silent` and `block`
//!   elements produced by an ERB preprocessor become `=` and `-` lines.
//!   A `loud` marker directly after text is folded into that text as
//!   `#{...}` interpolation.

mod attributes;
mod doctype;
mod escape;
mod filter;
mod render;
mod script;

pub use attributes::{AttributeValue, format_attributes, is_css_identifier, split_classes};
pub use doctype::doctype;
pub use escape::{
    SPECIAL_CHARACTERS, collapse_script, erb_to_interpolation, html_escape, ruby_string,
    tabulate, text_lines, uninterp,
};
pub use filter::{Filter, filter_block, normalize_body, strip_cdata_framing};
pub use render::{MAX_DEPTH, RenderContext, render};
pub use script::{align_loud_lines, loud_source_lines, silent_lines};
