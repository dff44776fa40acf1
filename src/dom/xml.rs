//! XHTML reader built on quick-xml.
//!
//! Unlike the HTML parser this keeps CDATA sections, processing
//! instructions and `/>` self-closing markers exactly as written.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::arena::{Attribute, Dom, NodeId};
use super::tree_sink::is_void_element;
use crate::error::Result;
use crate::util::{resolve_entity, unescape_entities};

/// Parse XHTML (or any XML-ish markup) into a tree.
///
/// Mismatched end tags are tolerated: an end tag closes the nearest open
/// element with the same name, and stray end tags are ignored.
pub fn parse_xhtml(source: &str) -> Result<Dom> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut dom = if super::looks_like_document(source) {
        Dom::new()
    } else {
        Dom::fragment()
    };
    let root = dom.root();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let parent = open.last().copied().unwrap_or(root);
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let (name, attrs) = element_parts(&e);
                let void = is_void_element(&name);
                let id = dom.create_element(name, attrs, void);
                dom.append(parent, id);
                if !void {
                    open.push(id);
                }
            }
            Ok(Event::Empty(e)) => {
                let (name, attrs) = element_parts(&e);
                let id = dom.create_element(name, attrs, true);
                dom.append(parent, id);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(pos) = open
                    .iter()
                    .rposition(|&id| dom.element_name(id) == Some(name.as_str()))
                {
                    open.truncate(pos);
                } else {
                    log::debug!(target: "hamlize::parse", "ignoring stray end tag </{name}>");
                }
            }
            Ok(Event::Text(e)) => {
                dom.append_text(parent, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) => {
                let entity = String::from_utf8_lossy(e.as_ref());
                match resolve_entity(&entity) {
                    Some(text) => dom.append_text(parent, &text),
                    None => dom.append_text(parent, &format!("&{entity};")),
                }
            }
            Ok(Event::CData(e)) => {
                let id = dom.create_cdata(String::from_utf8_lossy(e.as_ref()));
                dom.append(parent, id);
            }
            Ok(Event::Comment(e)) => {
                let id = dom.create_comment(String::from_utf8_lossy(e.as_ref()));
                dom.append(parent, id);
            }
            Ok(Event::Decl(e)) => {
                let id = dom.create_processing_instruction(String::from_utf8_lossy(e.as_ref()));
                dom.append(parent, id);
            }
            Ok(Event::PI(e)) => {
                let id = dom.create_processing_instruction(String::from_utf8_lossy(e.as_ref()));
                dom.append(parent, id);
            }
            Ok(Event::DocType(e)) => {
                let decl = String::from_utf8_lossy(e.as_ref());
                let (name, public_id, system_id) = parse_doctype_decl(&decl);
                let id = dom.create_doctype(name, public_id, system_id);
                dom.append(parent, id);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(dom)
}

fn element_parts(e: &BytesStart<'_>) -> (String, Vec<Attribute>) {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attrs = e
        .html_attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(&attr.value);
            let value = match unescape_entities(&raw) {
                Cow::Borrowed(_) => raw.into_owned(),
                Cow::Owned(decoded) => decoded,
            };
            Attribute::new(key, value)
        })
        .collect();
    (name, attrs)
}

/// Split a `<!DOCTYPE ...>` body into name, public id and system id.
fn parse_doctype_decl(decl: &str) -> (String, Option<String>, Option<String>) {
    let decl = decl.trim();
    let (name, rest) = decl
        .split_once(char::is_whitespace)
        .unwrap_or((decl, ""));
    let rest = rest.trim_start();

    let keyword_len = 6;
    let keyword = rest.get(..keyword_len).unwrap_or("");
    let literals = quoted_literals(rest.get(keyword_len..).unwrap_or(""));

    if keyword.eq_ignore_ascii_case("PUBLIC") {
        (
            name.to_string(),
            literals.first().map(|s| s.to_string()),
            literals.get(1).map(|s| s.to_string()),
        )
    } else if keyword.eq_ignore_ascii_case("SYSTEM") {
        (
            name.to_string(),
            None,
            literals.first().map(|s| s.to_string()),
        )
    } else {
        (name.to_string(), None, None)
    }
}

fn quoted_literals(s: &str) -> Vec<&str> {
    let mut literals = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find(['"', '\'']) {
        let quote = rest[start..].chars().next().unwrap_or('"');
        let body = &rest[start + 1..];
        match body.find(quote) {
            Some(end) => {
                literals.push(&body[..end]);
                rest = &body[end + 1..];
            }
            None => break,
        }
    }
    literals
}
