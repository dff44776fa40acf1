//! Text escaping and interpolation helpers.
//!
//! Plain text lines in the output are copied into HTML verbatim, so they
//! carry HTML escapes, and any literal `#{` has to be escaped so it is not
//! read back as interpolation.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use crate::util::unescape_entities;

/// Characters that open a construct when they start a line.
pub const SPECIAL_CHARACTERS: &[char] = &['%', '.', '#', '/', '!', '=', '&', '~', '-', '\\', ':'];

/// A `<loud>` marker embedded in filter or CDATA text.
static LOUD_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<loud>(.*?)</loud>").unwrap());

/// Indentation for a nesting level.
pub fn tabulate(tabs: usize) -> String {
    "  ".repeat(tabs)
}

/// Escape `&`, `<` and `>` for a plain text line.
pub fn html_escape(text: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(text)
}

/// Escape literal `#{` so it survives as text.
///
/// # Examples
///
/// ```
/// use hamlize::haml::uninterp;
///
/// assert_eq!(uninterp("Foo #{bar} baz"), "Foo \\#{bar} baz");
/// ```
pub fn uninterp(text: &str) -> Cow<'_, str> {
    if text.contains("#{") {
        Cow::Owned(text.replace("#{", "\\#{"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Flatten script source into a single interpolation body.
///
/// Each line break and the indentation after it become one space.
pub fn collapse_script(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out.trim().to_string()
}

/// Replace `<loud>` markers inside raw text with `#{...}` interpolation.
///
/// Without script mode the text is returned as is.
pub fn erb_to_interpolation(text: &str, erb: bool) -> String {
    if !erb {
        return text.to_string();
    }
    let text = uninterp(text);
    LOUD_MARKER_RE
        .replace_all(&text, |caps: &Captures<'_>| {
            format!("#{{{}}}", unescape_entities(caps[1].trim()))
        })
        .into_owned()
}

/// Split text into indented plain lines.
///
/// The block is trimmed first; blank input yields an empty string. When
/// `escape_special` is set, a line starting with one of
/// [`SPECIAL_CHARACTERS`] gets a leading `\`.
pub fn text_lines(text: &str, tabs: usize, escape_special: bool) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }

    let indent = tabulate(tabs);
    let mut out = String::with_capacity(text.len() + indent.len() * 4);
    for line in text.split('\n') {
        let line = line.trim();
        out.push_str(&indent);
        if escape_special && needs_escape(line) {
            out.push('\\');
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn needs_escape(line: &str) -> bool {
    if line.starts_with("\\#{") {
        return false;
    }
    line.starts_with(SPECIAL_CHARACTERS)
}

/// Quote a string as a double-quoted Ruby literal.
///
/// # Examples
///
/// ```
/// use hamlize::haml::ruby_string;
///
/// assert_eq!(ruby_string("say \"hi\""), r#""say \"hi\"""#);
/// assert_eq!(ruby_string("#{x}"), r#""\#{x}""#);
/// ```
pub fn ruby_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    push_ruby_escaped(&mut out, value);
    out.push('"');
    out
}

/// Append `value` escaped for the inside of a double-quoted Ruby literal.
pub(crate) fn push_ruby_escaped(out: &mut String, value: &str) {
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
}
