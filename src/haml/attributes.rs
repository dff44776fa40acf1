//! Attribute block formatting and `#id`/`.class` shorthand eligibility.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::escape::{push_ruby_escaped, ruby_string};
use crate::options::AttributeStyle;
use crate::util::unescape_entities;

/// A `<loud>` marker inside an attribute value.
static DYNAMIC_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<loud>\s*(.*?)\s*</loud>").unwrap());

/// Value of one attribute in the explicit block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Literal text, quoted on output.
    Static(String),
    /// Ruby expression, emitted as is.
    Dynamic(String),
}

impl AttributeValue {
    /// Classify a raw attribute value.
    ///
    /// With `erb` set, a value containing `<loud>` markers becomes a
    /// [`AttributeValue::Dynamic`] expression: the bare script when one
    /// marker spans the whole value, otherwise an interpolated string.
    pub fn classify(value: &str, erb: bool) -> Self {
        if erb
            && !value.is_empty()
            && let Some(expression) = dynamic_expression(value)
        {
            return AttributeValue::Dynamic(expression);
        }
        AttributeValue::Static(value.to_string())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, AttributeValue::Dynamic(_))
    }

    /// Ruby source for the value.
    pub fn to_ruby(&self) -> String {
        match self {
            AttributeValue::Static(value) => ruby_string(value),
            AttributeValue::Dynamic(expression) => expression.clone(),
        }
    }
}

fn dynamic_expression(value: &str) -> Option<String> {
    let mut matches = DYNAMIC_VALUE_RE.captures_iter(value).peekable();
    let first = matches.peek()?;
    let whole = first.get(0)?;

    if whole.start() == 0 && whole.end() == value.len() {
        let script = unescape_entities(first.get(1).map_or("", |m| m.as_str())).into_owned();
        if script.is_empty() {
            return Some("\"\"".to_string());
        }
        return Some(script);
    }

    let mut out = String::from("\"");
    let mut last = 0;
    for caps in matches {
        let Some(marker) = caps.get(0) else {
            continue;
        };
        push_ruby_escaped(&mut out, &value[last..marker.start()]);
        let script = caps.get(1).map_or("", |m| m.as_str());
        out.push_str("#{");
        out.push_str(&unescape_entities(script));
        out.push('}');
        last = marker.end();
    }
    push_ruby_escaped(&mut out, &value[last..]);
    out.push('"');
    Some(out)
}

/// Check whether a value can be written as `#value` or `.value`.
///
/// # Examples
///
/// ```
/// use hamlize::haml::is_css_identifier;
///
/// assert!(is_css_identifier("main-nav"));
/// assert!(is_css_identifier("md:flex"));
/// assert!(!is_css_identifier("w-1/2"));
/// assert!(!is_css_identifier(""));
/// ```
pub fn is_css_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'))
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split a class value into shorthand tokens and the residual class value.
pub fn split_classes(value: &str) -> (Vec<&str>, Vec<&str>) {
    value.split_whitespace().partition(|token| is_css_identifier(token))
}

/// Serialize attributes as an explicit block, sorted by name.
///
/// # Examples
///
/// ```
/// use hamlize::AttributeStyle;
/// use hamlize::haml::{AttributeValue, format_attributes};
///
/// let attrs = vec![
///     ("type".to_string(), AttributeValue::Static("text".into())),
///     ("name".to_string(), AttributeValue::Static("login".into())),
/// ];
/// assert_eq!(
///     format_attributes(&attrs, AttributeStyle::Symbol),
///     r#"{:name => "login", :type => "text"}"#
/// );
/// ```
pub fn format_attributes(attrs: &[(String, AttributeValue)], style: AttributeStyle) -> String {
    let mut sorted: Vec<&(String, AttributeValue)> = attrs.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let pairs: Vec<String> = sorted
        .into_iter()
        .map(|(name, value)| format_pair(name, &value.to_ruby(), style))
        .collect();

    match style {
        AttributeStyle::Html => format!("({})", pairs.join(" ")),
        AttributeStyle::Symbol | AttributeStyle::Ruby19 => format!("{{{}}}", pairs.join(", ")),
    }
}

fn format_pair(name: &str, value: &str, style: AttributeStyle) -> String {
    match style {
        AttributeStyle::Html if is_css_identifier(name) => format!("{name}={value}"),
        AttributeStyle::Html => format!("{}={value}", ruby_string(name)),
        AttributeStyle::Symbol if is_word(name) => format!(":{name} => {value}"),
        AttributeStyle::Ruby19 if is_word(name) => format!("{name}: {value}"),
        AttributeStyle::Symbol | AttributeStyle::Ruby19 => {
            format!("{} => {value}", ruby_string(name))
        }
    }
}
