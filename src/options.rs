//! Conversion options.

use crate::haml::MAX_DEPTH;

/// Literal form used for explicit attribute blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeStyle {
    /// `{:name => "value"}`
    #[default]
    Symbol,
    /// `(name="value")`
    Html,
    /// `{name: "value"}`, falling back to `"na-me" => "value"`
    Ruby19,
}

/// Options controlling parsing and rendering.
///
/// # Examples
///
/// ```
/// use hamlize::{AttributeStyle, Options};
///
/// let options = Options::new().with_erb(true).with_ruby19_style_attributes(true);
/// assert!(options.erb);
/// assert_eq!(options.attribute_style, AttributeStyle::Ruby19);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Render `loud`/`silent`/`block` marker elements as script lines.
    pub erb: bool,
    /// Parse the input as XHTML instead of HTML.
    pub xhtml: bool,
    pub attribute_style: AttributeStyle,
    /// Maximum element nesting before rendering fails.
    pub max_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            erb: false,
            xhtml: false,
            attribute_style: AttributeStyle::Symbol,
            max_depth: MAX_DEPTH,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_erb(mut self, erb: bool) -> Self {
        self.erb = erb;
        self
    }

    pub fn with_xhtml(mut self, xhtml: bool) -> Self {
        self.xhtml = xhtml;
        self
    }

    pub fn with_attribute_style(mut self, style: AttributeStyle) -> Self {
        self.attribute_style = style;
        self
    }

    /// Select `(name="value")` attributes. Takes precedence over Ruby 1.9 style.
    pub fn with_html_style_attributes(mut self, enabled: bool) -> Self {
        if enabled {
            self.attribute_style = AttributeStyle::Html;
        } else if self.attribute_style == AttributeStyle::Html {
            self.attribute_style = AttributeStyle::Symbol;
        }
        self
    }

    /// Select `{name: "value"}` attributes unless HTML style is already chosen.
    pub fn with_ruby19_style_attributes(mut self, enabled: bool) -> Self {
        if enabled {
            if self.attribute_style != AttributeStyle::Html {
                self.attribute_style = AttributeStyle::Ruby19;
            }
        } else if self.attribute_style == AttributeStyle::Ruby19 {
            self.attribute_style = AttributeStyle::Symbol;
        }
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
