//! Filter blocks (`:javascript`, `:css`, `:cdata`, `:preserve`).

use std::sync::LazyLock;

use regex_lite::Regex;

use super::escape::tabulate;
use crate::dom::Attribute;

static CDATA_OPEN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*<!\[CDATA\[\n").unwrap());

static CDATA_CLOSE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\]\]>\n").unwrap());

/// Named verbatim block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Javascript,
    Css,
    Cdata,
    Preserve,
}

impl Filter {
    pub fn name(self) -> &'static str {
        match self {
            Filter::Javascript => "javascript",
            Filter::Css => "css",
            Filter::Cdata => "cdata",
            Filter::Preserve => "preserve",
        }
    }

    /// Filter for a `script`/`style` element that carries nothing but an
    /// optional default `type`.
    pub fn for_element(name: &str, attrs: &[Attribute]) -> Option<Filter> {
        let (filter, mime) = match name {
            "script" => (Filter::Javascript, "text/javascript"),
            "style" => (Filter::Css, "text/css"),
            _ => return None,
        };
        attrs
            .iter()
            .all(|a| a.name == "type" && a.value == mime)
            .then_some(filter)
    }
}

/// Check whether the text carries `<![CDATA[`/`]]>` framing lines.
pub fn has_cdata_framing(content: &str) -> bool {
    CDATA_OPEN_LINE_RE.is_match(content) || CDATA_CLOSE_LINE_RE.is_match(content)
}

/// Remove `<![CDATA[` and `]]>` framing lines.
pub fn strip_cdata_framing(content: &str) -> String {
    let content = CDATA_OPEN_LINE_RE.replace_all(content, "");
    CDATA_CLOSE_LINE_RE.replace_all(&content, "").into_owned()
}

/// Emit a filter header at `tabs` followed by the re-indented body.
///
/// # Examples
///
/// ```
/// use hamlize::haml::{Filter, filter_block};
///
/// let out = filter_block(Filter::Javascript, "\n    var x = 1;\n    go(x);\n", 1);
/// assert_eq!(out, "  :javascript\n    var x = 1;\n    go(x);\n");
/// ```
pub fn filter_block(filter: Filter, content: &str, tabs: usize) -> String {
    let mut out = format!("{}:{}\n", tabulate(tabs), filter.name());
    out.push_str(&normalize_body(content, tabs + 1));
    out
}

/// Re-indent a verbatim body to `tabs`.
///
/// The indentation of the first content line is taken as the body's own.
/// If every non-blank line starts with it, it is swapped for the target
/// indentation; otherwise the body is kept as written.
pub fn normalize_body(content: &str, tabs: usize) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let Some(first) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return String::new();
    };
    let last = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .unwrap_or(first);
    let body = &lines[first..=last];

    let original_indent = leading_whitespace(body[0]);
    let consistent = body
        .iter()
        .all(|l| l.trim().is_empty() || l.starts_with(original_indent));

    let indent = tabulate(tabs);
    let mut out = String::with_capacity(content.len() + body.len() * indent.len());
    for line in body {
        if consistent {
            if !line.trim().is_empty() {
                out.push_str(&indent);
                out.push_str(&line[original_indent.len()..]);
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}
