//! Document tree and the parsers that build it.
//!
//! The renderer only sees [`Dom`]; where the tree came from (html5ever for
//! HTML, quick-xml for XHTML, or hand-built in tests) does not matter.

mod arena;
mod snapshot;
mod tree_sink;
mod xml;

pub use arena::{Attribute, ChildrenIter, Descendants, Dom, Node, NodeData, NodeId};
pub use snapshot::NodeSnapshot;
pub use tree_sink::{DomSink, NodeHandle};
pub use xml::parse_xhtml;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;

use crate::error::Result;
use crate::options::Options;

const CDATA_OPEN: &str = "<![CDATA[";

/// Parse markup into a tree, picking the parser from `options` and the source.
pub fn parse(source: &str, options: &Options) -> Result<Dom> {
    if options.xhtml {
        log::debug!(target: "hamlize::parse", "parsing as XHTML");
        return parse_xhtml(source);
    }

    if source.contains(CDATA_OPEN) {
        match parse_xhtml(source) {
            Ok(dom) => return Ok(dom),
            Err(e) => {
                log::warn!(target: "hamlize::parse", "XHTML parse failed ({e}), falling back to HTML");
            }
        }
    }

    Ok(parse_html(source))
}

/// Parse HTML with html5ever.
///
/// Whole documents keep their Document root. Fragments are parsed inside a
/// synthetic body and re-rooted under a Fragment node, so no `html`/`body`
/// wrapper shows up in the output.
pub fn parse_html(source: &str) -> Dom {
    if looks_like_document(source) {
        log::debug!(target: "hamlize::parse", "parsing as HTML document");
        return parse_html_document(source);
    }

    log::debug!(target: "hamlize::parse", "parsing as HTML fragment");
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{source}</body></html>");
    let dom = parse_html_document(&wrapped);
    match dom.find_by_tag("body") {
        Some(body) => dom.into_fragment(body),
        None => dom,
    }
}

fn parse_html_document(source: &str) -> Dom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(DomSink::new(), opts)
        .from_utf8()
        .one(source.as_bytes())
        .into_dom()
}

/// Check whether the first markup token opens a whole document.
///
/// Leading whitespace, XML declarations and comments are skipped.
pub(crate) fn looks_like_document(source: &str) -> bool {
    let mut rest = source.trim_start();
    loop {
        if rest.starts_with("<?") {
            match rest.find("?>") {
                Some(end) => rest = rest[end + 2..].trim_start(),
                None => return false,
            }
        } else if rest.starts_with("<!--") {
            match rest.find("-->") {
                Some(end) => rest = rest[end + 3..].trim_start(),
                None => return false,
            }
        } else {
            break;
        }
    }

    ["<!doctype", "<html", "<head", "<body"].iter().any(|prefix| {
        rest.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            && rest[prefix.len()..]
                .chars()
                .next()
                .is_none_or(|c| c.is_whitespace() || c == '>' || c == '/')
    })
}
