//! Owned, serializable view of a parsed tree for debugging.

use super::arena::{Dom, NodeData, NodeId};
use crate::error::{Error, Result};

/// Recursive copy of a subtree, as printed by `hamlize --dump-tree`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(tag = "type", rename_all = "snake_case"))]
pub enum NodeSnapshot {
    Document {
        children: Vec<NodeSnapshot>,
    },
    Fragment {
        children: Vec<NodeSnapshot>,
    },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
        children: Vec<NodeSnapshot>,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
    Cdata {
        content: String,
    },
    Doctype {
        name: String,
        external_id: Option<String>,
        system_id: Option<String>,
    },
    ProcessingInstruction {
        content: String,
    },
}

impl NodeSnapshot {
    /// Snapshot the whole tree from its root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooDeep`] when the tree nests deeper than
    /// `max_depth`.
    pub fn of(dom: &Dom, max_depth: usize) -> Result<Self> {
        Self::of_node(dom, dom.root(), 0, max_depth)
    }

    fn of_node(dom: &Dom, id: NodeId, depth: usize, max_depth: usize) -> Result<Self> {
        if depth > max_depth {
            return Err(Error::TooDeep { depth: max_depth });
        }
        let children = || -> Result<Vec<NodeSnapshot>> {
            dom.children(id)
                .map(|c| Self::of_node(dom, c, depth + 1, max_depth))
                .collect()
        };
        Ok(match dom.data(id) {
            Some(NodeData::Document) | None => NodeSnapshot::Document {
                children: children()?,
            },
            Some(NodeData::Fragment) => NodeSnapshot::Fragment {
                children: children()?,
            },
            Some(NodeData::Element {
                name,
                attrs,
                self_closing,
            }) => NodeSnapshot::Element {
                name: name.clone(),
                attributes: attrs
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect(),
                self_closing: *self_closing,
                children: children()?,
            },
            Some(NodeData::Text(s)) => NodeSnapshot::Text { content: s.clone() },
            Some(NodeData::Comment(s)) => NodeSnapshot::Comment { content: s.clone() },
            Some(NodeData::CData(s)) => NodeSnapshot::Cdata { content: s.clone() },
            Some(NodeData::Doctype {
                name,
                external_id,
                system_id,
            }) => NodeSnapshot::Doctype {
                name: name.clone(),
                external_id: external_id.clone(),
                system_id: system_id.clone(),
            },
            Some(NodeData::ProcessingInstruction(s)) => {
                NodeSnapshot::ProcessingInstruction { content: s.clone() }
            }
        })
    }
}
