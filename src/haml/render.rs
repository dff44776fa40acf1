//! Tree → Haml rendering.
//!
//! One depth-first, left-to-right pass over the [`Dom`]. Nodes are never
//! mutated: lookahead that folds a sibling into an earlier construct marks
//! it consumed, and a text node that gives up its leading token to a
//! `succeed` block gets its remainder recorded in the context instead.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;

use super::attributes::{AttributeValue, format_attributes, is_css_identifier, split_classes};
use super::doctype::doctype;
use super::escape::{
    collapse_script, erb_to_interpolation, html_escape, ruby_string, tabulate, text_lines,
    uninterp,
};
use super::filter::{Filter, filter_block, has_cdata_framing, strip_cdata_framing};
use super::script::{align_loud_lines, is_multiline, loud_source_lines, silent_lines};
use crate::dom::{Dom, NodeData, NodeId};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::util::unescape_entities;

/// Default nesting ceiling for [`Options::max_depth`].
pub const MAX_DEPTH: usize = 512;

/// Element names the script preprocessor uses for embedded code.
const MARKERS: [&str; 3] = ["loud", "silent", "block"];

/// `[if IE]>...<![endif]`
static CONDITIONAL_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A(\[[^\]]+\])>(.*)<!\[endif\]\z").unwrap());

/// Render a whole tree.
///
/// # Errors
///
/// Fails with [`Error::InvalidDoctype`] on an unrecognized DTD identifier
/// and [`Error::TooDeep`] when nesting exceeds `options.max_depth`.
///
/// # Examples
///
/// ```
/// use hamlize::Options;
/// use hamlize::dom::{Attribute, Dom};
/// use hamlize::haml::render;
///
/// let mut dom = Dom::fragment();
/// let input = dom.create_element(
///     "input",
///     vec![Attribute::new("type", "text"), Attribute::new("name", "login")],
///     true,
/// );
/// dom.append(dom.root(), input);
///
/// assert_eq!(
///     render(&dom, &Options::default()).unwrap(),
///     "%input{:name => \"login\", :type => \"text\"}/\n"
/// );
/// ```
pub fn render(dom: &Dom, options: &Options) -> Result<String> {
    RenderContext::new(dom, options).render()
}

/// State for a single render pass.
pub struct RenderContext<'a> {
    dom: &'a Dom,
    options: &'a Options,
    /// Nodes already emitted or folded into another node's output.
    consumed: Vec<bool>,
    /// Text left over after a leading token moved into a `succeed` block.
    truncated: HashMap<NodeId, String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(dom: &'a Dom, options: &'a Options) -> Self {
        Self {
            dom,
            options,
            consumed: vec![false; dom.len()],
            truncated: HashMap::new(),
        }
    }

    /// Render from the root, consuming the context.
    pub fn render(mut self) -> Result<String> {
        log::debug!(
            target: "hamlize::render",
            "rendering {} nodes (erb: {}, style: {:?})",
            self.dom.len(),
            self.options.erb,
            self.options.attribute_style
        );
        let root = self.dom.root();
        self.render_node(root, 0, 0)
    }

    fn is_consumed(&self, id: NodeId) -> bool {
        self.consumed.get(id.index()).copied().unwrap_or(true)
    }

    fn consume(&mut self, id: NodeId) {
        if let Some(flag) = self.consumed.get_mut(id.index()) {
            *flag = true;
        }
    }

    fn consume_subtree(&mut self, id: NodeId) {
        let dom = self.dom;
        self.consume(id);
        for node in dom.descendants(id) {
            self.consume(node);
        }
    }

    /// Current content of a text node.
    fn text_of(&self, id: NodeId) -> Option<&str> {
        match self.truncated.get(&id) {
            Some(rest) => Some(rest.as_str()),
            None => self.dom.text_content(id),
        }
    }

    fn render_node(&mut self, id: NodeId, tabs: usize, depth: usize) -> Result<String> {
        if depth > self.options.max_depth {
            return Err(Error::TooDeep {
                depth: self.options.max_depth,
            });
        }

        let dom = self.dom;
        let Some(data) = dom.data(id) else {
            return Ok(String::new());
        };

        match data {
            NodeData::Document | NodeData::Fragment => {
                self.consume(id);
                let mut out = String::new();
                for child in dom.children(id) {
                    out.push_str(&self.render_node(child, 0, depth + 1)?);
                }
                Ok(out)
            }
            NodeData::ProcessingInstruction(_) => {
                self.consume(id);
                Ok(format!("{}!!! XML\n", tabulate(tabs)))
            }
            NodeData::Doctype { external_id, .. } => {
                self.consume(id);
                let token = doctype(external_id.as_deref())?;
                Ok(format!("{}{token}\n", tabulate(tabs)))
            }
            NodeData::Comment(content) => {
                self.consume(id);
                Ok(render_comment(content, tabs))
            }
            NodeData::CData(content) => {
                self.consume(id);
                let content = erb_to_interpolation(&strip_cdata_framing(content), self.options.erb);
                Ok(format!(
                    "{}:cdata\n{}",
                    tabulate(tabs),
                    text_lines(&content, tabs + 1, true)
                ))
            }
            NodeData::Text(_) => Ok(self.render_text(id, tabs, true)),
            NodeData::Element { .. } => self.render_element(id, tabs, depth),
        }
    }

    fn render_text(&mut self, id: NodeId, tabs: usize, escape_special: bool) -> String {
        if self.is_consumed(id) {
            return String::new();
        }
        self.consume(id);

        let Some(content) = self.text_of(id) else {
            return String::new();
        };
        if content.trim().is_empty() {
            return String::new();
        }

        let mut text = uninterp(&html_escape(content)).into_owned();
        if self.options.erb {
            self.splice_loud_markers(id, &mut text);
        }
        text_lines(&text, tabs, escape_special)
    }

    /// Fold `loud` markers following a text node (and the text after each of
    /// them) into `text` as `#{...}` interpolation.
    fn splice_loud_markers(&mut self, text_id: NodeId, text: &mut String) {
        let dom = self.dom;
        let mut next = dom.next_sibling(text_id);

        while let Some(marker) = next.filter(|&n| dom.is_element_named(n, "loud")) {
            self.consume_subtree(marker);
            text.push_str("#{");
            text.push_str(&collapse_script(&unescape_entities(&dom.inner_text(marker))));
            text.push('}');

            let mut last = marker;
            if let Some(following) = dom.next_sibling(marker).filter(|&n| dom.is_text(n)) {
                if let Some(content) = self.text_of(following) {
                    text.push_str(&uninterp(&html_escape(content)));
                }
                self.consume(following);
                last = following;
            }
            next = dom.next_sibling(last);
        }
    }

    fn render_element(&mut self, id: NodeId, tabs: usize, depth: usize) -> Result<String> {
        if self.is_consumed(id) {
            return Ok(String::new());
        }
        self.consume(id);

        let dom = self.dom;
        let Some(NodeData::Element {
            name,
            attrs,
            self_closing,
        }) = dom.data(id)
        else {
            return Ok(String::new());
        };
        let name = name.as_str();

        if let Some(filter) = Filter::for_element(name, attrs) {
            log::trace!(target: "hamlize::render", "<{name}> rendered as :{}", filter.name());
            return Ok(self.render_filter(id, filter, tabs));
        }

        if self.options.erb && MARKERS.contains(&name) {
            return self.render_marker(id, name, tabs, depth);
        }

        let mut tabs = tabs;
        let mut output = tabulate(tabs);
        let nuke_outer_whitespace = self.whitespace_lookahead(id, &mut output, &mut tabs);

        let erb = self.options.erb;
        let mut remaining: Vec<(String, AttributeValue)> = attrs
            .iter()
            .map(|a| (a.name.clone(), AttributeValue::classify(&a.value, erb)))
            .collect();

        let static_id = static_value(&remaining, "id")
            .filter(|v| is_css_identifier(v))
            .map(str::to_string);
        let static_class = static_value(&remaining, "class").map(str::to_string);
        let (class_tokens, class_rest) = static_class
            .as_deref()
            .map(split_classes)
            .unwrap_or_default();

        let elide_div = name == "div" && (static_id.is_some() || !class_tokens.is_empty());
        if !elide_div {
            output.push('%');
            output.push_str(name);
        }
        if let Some(id_value) = &static_id {
            output.push('#');
            output.push_str(id_value);
            remaining.retain(|(n, _)| n != "id");
        }
        if static_class.is_some() {
            for token in &class_tokens {
                output.push('.');
                output.push_str(token);
            }
            remaining.retain(|(n, _)| n != "class");
            if !class_rest.is_empty() {
                remaining.push((
                    "class".to_string(),
                    AttributeValue::Static(class_rest.join(" ")),
                ));
            }
        }
        if !remaining.is_empty() {
            output.push_str(&format_attributes(&remaining, self.options.attribute_style));
        }
        if nuke_outer_whitespace {
            output.push('>');
        }
        if *self_closing {
            output.push('/');
        }

        let children: Vec<NodeId> = dom.children(id).collect();
        if let [child] = children.as_slice() {
            let child = *child;
            if dom.is_text(child) {
                let single_line = self.text_of(child).is_some_and(|t| !t.contains('\n'));
                if single_line {
                    let text = self.render_text(child, tabs + 1, false);
                    let inline = text.trim_start();
                    if inline.is_empty() {
                        output.push('\n');
                    } else if !inline.trim_end_matches('\n').contains('\n') {
                        output.push(' ');
                        output.push_str(inline);
                    } else {
                        output.push('\n');
                        output.push_str(&text);
                    }
                    return Ok(output);
                }
                if self.preserves_whitespace(id, name) {
                    self.consume(child);
                    output.push('\n');
                    output.push_str(&self.render_preserve(id, tabs + 1));
                    return Ok(output);
                }
            } else if erb && dom.is_element_named(child, "loud") {
                let script = self.render_node(child, tabs + 1, depth + 1)?;
                let script = script.trim_start();
                if script.is_empty() {
                    output.push('\n');
                } else {
                    output.push_str(script);
                }
                return Ok(output);
            }
        }

        output.push('\n');
        for child in children {
            output.push_str(&self.render_node(child, tabs + 1, depth + 1)?);
        }
        Ok(output)
    }

    /// Decide how an element glued to the following text is written.
    ///
    /// Returns `true` when the tag should nuke its outer whitespace (`>`).
    /// Otherwise, if the following text starts with a token, opens a
    /// `succeed` block for that token and bumps `tabs`.
    fn whitespace_lookahead(&mut self, id: NodeId, output: &mut String, tabs: &mut usize) -> bool {
        let dom = self.dom;
        let Some(next) = dom.next_sibling(id).filter(|&n| dom.is_text(n)) else {
            return false;
        };
        let Some(next_text) = self.text_of(next) else {
            return false;
        };
        if !next_text.starts_with(|c: char| !c.is_whitespace()) {
            return false;
        }

        let glued = match dom.prev_sibling(id) {
            None => true,
            Some(prev) => self.text_of(prev).is_some_and(|t| {
                t.ends_with(|c: char| !c.is_whitespace())
                    || (t.trim().is_empty() && dom.prev_sibling(prev).is_none())
            }),
        };
        if glued {
            log::trace!(target: "hamlize::render", "nuking outer whitespace of node {}", id.0);
            return true;
        }

        let split = next_text.find(char::is_whitespace).unwrap_or(next_text.len());
        let (token, rest) = next_text.split_at(split);
        output.push_str(&format!("= succeed {} do\n", ruby_string(token)));
        log::trace!(target: "hamlize::render", "wrapping node {} in succeed {token:?}", id.0);

        let rest = rest.to_string();
        self.truncated.insert(next, rest);
        *tabs += 1;
        output.push_str(&tabulate(*tabs));
        false
    }

    fn preserves_whitespace(&self, id: NodeId, name: &str) -> bool {
        match name {
            "pre" | "textarea" => true,
            "code" => self
                .dom
                .parent(id)
                .is_some_and(|p| self.dom.is_element_named(p, "pre")),
            _ => false,
        }
    }

    fn render_preserve(&self, id: NodeId, tabs: usize) -> String {
        let indent = tabulate(tabs + 1);
        let mut out = format!("{}:{}\n", tabulate(tabs), Filter::Preserve.name());
        for line in self.dom.inner_text(id).lines() {
            if !line.is_empty() {
                out.push_str(&indent);
                out.push_str(line);
            }
            out.push('\n');
        }
        out
    }

    fn render_filter(&mut self, id: NodeId, filter: Filter, tabs: usize) -> String {
        let dom = self.dom;
        let has_cdata = dom
            .children(id)
            .any(|c| matches!(dom.data(c), Some(NodeData::CData(_))));
        self.consume_subtree(id);

        let text = dom.inner_text(id);
        let content = if has_cdata || has_cdata_framing(&text) {
            strip_cdata_framing(&text)
        } else {
            unescape_entities(&text).into_owned()
        };
        let content = erb_to_interpolation(&content, self.options.erb);
        filter_block(filter, &content, tabs)
    }

    /// Render a script marker. A `block` has no line of its own; its children
    /// sit one level under the `-` statement that opened it.
    fn render_marker(
        &mut self,
        id: NodeId,
        name: &str,
        tabs: usize,
        depth: usize,
    ) -> Result<String> {
        let dom = self.dom;
        let indent = tabulate(tabs);

        if name == "block" {
            let mut out = String::new();
            for child in dom.children(id) {
                out.push_str(&self.render_node(child, tabs + 1, depth + 1)?);
            }
            return Ok(out);
        }

        self.consume_subtree(id);
        let source = dom.inner_text(id);

        let lines = if name == "silent" {
            silent_lines(&source)
        } else {
            let lines = loud_source_lines(&source);
            if lines.is_empty() {
                log::warn!(target: "hamlize::render", "skipping loud marker with no script");
                return Ok(String::new());
            }
            let multiline = lines.len() > 1;
            let mut lines = align_loud_lines(lines);
            if multiline
                && dom.next_sibling(id).is_some_and(|n| {
                    dom.is_element_named(n, "loud") && is_multiline(&dom.inner_text(n))
                })
            {
                lines.push("-#".to_string());
            }
            lines
        };

        Ok(lines
            .iter()
            .map(|line| format!("{indent}{line}\n"))
            .collect())
    }
}

fn static_value<'v>(attrs: &'v [(String, AttributeValue)], name: &str) -> Option<&'v str> {
    attrs.iter().find(|(n, _)| n == name).and_then(|(_, v)| match v {
        AttributeValue::Static(s) => Some(s.as_str()),
        AttributeValue::Dynamic(_) => None,
    })
}

fn render_comment(content: &str, tabs: usize) -> String {
    let (condition, body) = match CONDITIONAL_COMMENT_RE.captures(content) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map_or("", |m| m.as_str()),
        ),
        None => ("", content),
    };

    let indent = tabulate(tabs);
    if body.contains('\n') {
        format!(
            "{indent}/{condition}\n{}",
            text_lines(&uninterp(body), tabs + 1, true)
        )
    } else if body.trim().is_empty() {
        format!("{indent}/{condition}\n")
    } else {
        format!("{indent}/{condition} {}\n", body.trim())
    }
}
