//! Doctype translation (`<!DOCTYPE ...>` to `!!!`).

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::{Error, Result};

static DTD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DTD\s+(\S+)\s*(\S*)\s*(\S*)\s*//").unwrap());

/// Translate a DTD public identifier to a `!!!` line (without indentation).
///
/// # Errors
///
/// Returns [`Error::InvalidDoctype`] if the identifier is not of the form
/// `... DTD <type> <version> <strictness> //...`.
///
/// # Examples
///
/// ```
/// use hamlize::haml::doctype;
///
/// assert_eq!(doctype(None).unwrap(), "!!!");
/// assert_eq!(doctype(Some("-//W3C//DTD XHTML 1.1//EN")).unwrap(), "!!! 1.1");
/// assert_eq!(doctype(Some("-//W3C//DTD HTML 4.01//EN")).unwrap(), "!!! Strict");
/// assert!(doctype(Some("bogus")).is_err());
/// ```
pub fn doctype(external_id: Option<&str>) -> Result<String> {
    let Some(external_id) = external_id else {
        return Ok("!!!".to_string());
    };

    let caps = DTD_RE
        .captures(external_id)
        .ok_or_else(|| Error::InvalidDoctype(external_id.to_string()))?;
    let group = |i: usize| caps.get(i).map_or(String::new(), |m| m.as_str().to_lowercase());
    let (kind, mut version, mut strictness) = (group(1), group(2), group(3));

    if kind == "html" {
        version.clear();
        if strictness.is_empty() {
            strictness = "strict".to_string();
        }
    }

    let mut out = String::from("!!!");
    if !version.is_empty() && version != "1.0" {
        out.push(' ');
        out.push_str(&capitalize(&version));
    }
    if !strictness.is_empty() && strictness != "transitional" {
        out.push(' ');
        out.push_str(&capitalize(&strictness));
    }
    Ok(out)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
