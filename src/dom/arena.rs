//! Arena-based document tree.
//!
//! All nodes live in one vector and refer to each other by index, so the
//! renderer can look at parents and siblings without reference cycles.
//! Children are owned through the `first_child`/`next_sibling` chain; the
//! `parent` and `prev_sibling` links are lookup-only.

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    /// Convert to `Option`, mapping the sentinel to `None`.
    pub fn get(self) -> Option<NodeId> {
        self.is_some().then_some(self)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node type in the arena.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Whole-document root.
    Document,
    /// Fragment root (input without a document shell).
    Fragment,
    Element {
        name: String,
        /// Attributes in source order.
        attrs: Vec<Attribute>,
        /// The element serializes as `<name ... />`.
        self_closing: bool,
    },
    Text(String),
    Comment(String),
    /// CDATA section content. May still carry `<![CDATA[`/`]]>` framing.
    CData(String),
    Doctype {
        name: String,
        /// DTD external (public) identifier.
        external_id: Option<String>,
        system_id: Option<String>,
    },
    ProcessingInstruction(String),
}

/// Element attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A node in the arena.
#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena-allocated document tree.
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Dom {
    /// Create a tree rooted at a Document node.
    pub fn new() -> Self {
        Self::with_root(NodeData::Document)
    }

    /// Create a tree rooted at a Fragment node.
    pub fn fragment() -> Self {
        Self::with_root(NodeData::Fragment)
    }

    fn with_root(data: NodeData) -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId::NONE,
        };
        dom.root = dom.alloc(Node::new(data));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Root node (Document or Fragment).
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.get(id).map(|n| &n.data)
    }

    pub fn create_element(
        &mut self,
        name: impl Into<String>,
        attrs: Vec<Attribute>,
        self_closing: bool,
    ) -> NodeId {
        self.alloc(Node::new(NodeData::Element {
            name: name.into(),
            attrs,
            self_closing,
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text.into())))
    }

    pub fn create_cdata(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::CData(text.into())))
    }

    pub fn create_doctype(
        &mut self,
        name: impl Into<String>,
        external_id: Option<String>,
        system_id: Option<String>,
    ) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name: name.into(),
            external_id: external_id.filter(|id| !id.is_empty()),
            system_id: system_id.filter(|id| !id.is_empty()),
        }))
    }

    pub fn create_processing_instruction(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::ProcessingInstruction(data.into())))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = self
            .get(sibling)
            .map(|n| (n.parent, n.prev_sibling))
            .unwrap_or((NodeId::NONE, NodeId::NONE));

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to the last child if it is a text node, or add a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, target: NodeId) {
        let Some((parent, prev, next)) = self
            .get(target)
            .map(|n| (n.parent, n.prev_sibling, n.next_sibling))
        else {
            return;
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Move every child of `node` to the end of `new_parent`.
    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            self.detach(child);
            self.append(new_parent, child);
        }
    }

    /// Re-root the tree at a new Fragment node holding the children of
    /// `container`. Everything else becomes unreachable.
    pub fn into_fragment(mut self, container: NodeId) -> Dom {
        let fragment = self.alloc(Node::new(NodeData::Fragment));
        self.reparent_children(container, fragment);
        self.root = fragment;
        self
    }

    /// Number of nodes in the arena (including detached ones).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.get(self.root).is_none_or(|n| n.first_child.is_none())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).count()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.get())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling.get())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling.get())
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.get())
    }

    /// All nodes below `id` in document order, not including `id` itself.
    ///
    /// Walks with an explicit stack, so arbitrarily deep trees are fine.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { dom: self, stack }
    }

    /// Find the first node matching a predicate (document order).
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find(|node| matches!(&node.data, NodeData::Element { name, .. } if name == tag))
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(self.dom.children(id));
        self.stack[start..].reverse();
        Some(id)
    }
}

/// Convenience accessors.
impl Dom {
    /// Get element's tag name.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Check if node is an element with the given tag name.
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id) == Some(tag)
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match self.data(id) {
            Some(NodeData::Element { attrs, .. }) => attrs.as_slice(),
            _ => &[],
        }
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name == attr_name)
            .map(|a| a.value.as_str())
    }

    pub fn is_self_closing(&self, id: NodeId) -> bool {
        matches!(
            self.data(id),
            Some(NodeData::Element {
                self_closing: true,
                ..
            })
        )
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(s) | NodeData::CData(s)) = self.data(node) {
                out.push_str(s);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_elements() {
        let mut dom = Dom::fragment();

        let div = dom.create_element("div", vec![Attribute::new("id", "main")], false);
        dom.append(dom.root(), div);

        assert_eq!(dom.element_name(div), Some("div"));
        assert_eq!(dom.get_attr(div, "id"), Some("main"));
        assert_eq!(dom.parent(div), Some(dom.root()));
        assert!(!dom.is_self_closing(div));
    }

    #[test]
    fn test_append_children() {
        let mut dom = Dom::new();

        let parent = dom.create_element("div", vec![], false);
        let child1 = dom.create_element("p", vec![], false);
        let child2 = dom.create_element("p", vec![], false);

        dom.append(dom.root(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
        assert_eq!(dom.next_sibling(child1), Some(child2));
        assert_eq!(dom.prev_sibling(child2), Some(child1));
        assert_eq!(dom.prev_sibling(child1), None);
        assert_eq!(dom.next_sibling(child2), None);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = Dom::new();

        let p = dom.create_element("p", vec![], false);
        dom.append(dom.root(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_insert_before_first_child() {
        let mut dom = Dom::fragment();
        let p = dom.create_element("p", vec![], false);
        dom.append(dom.root(), p);
        let comment = dom.create_comment("note");
        dom.insert_before(p, comment);

        let children: Vec<_> = dom.children(dom.root()).collect();
        assert_eq!(children, vec![comment, p]);
    }

    #[test]
    fn test_detach_middle_child() {
        let mut dom = Dom::fragment();
        let a = dom.create_text("a");
        let b = dom.create_text("b");
        let c = dom.create_text("c");
        for id in [a, b, c] {
            dom.append(dom.root(), id);
        }

        dom.detach(b);

        assert_eq!(dom.children(dom.root()).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(dom.next_sibling(a), Some(c));
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_reparent_children() {
        let mut dom = Dom::new();
        let body = dom.create_element("body", vec![], false);
        dom.append(dom.root(), body);
        let p = dom.create_element("p", vec![], false);
        dom.append(body, p);
        dom.append_text(body, "tail");

        let section = dom.create_element("section", Vec::new(), false);
        dom.append(dom.root(), section);
        dom.reparent_children(body, section);

        assert_eq!(dom.child_count(section), 2);
        assert_eq!(dom.child_count(body), 0);
        assert_eq!(dom.parent(p), Some(section));
    }

    #[test]
    fn test_into_fragment() {
        let mut dom = Dom::new();
        let html = dom.create_element("html", vec![], false);
        dom.append(dom.root(), html);
        let body = dom.create_element("body", vec![], false);
        dom.append(html, body);
        let p = dom.create_element("p", vec![], false);
        dom.append(body, p);

        let dom = dom.into_fragment(body);

        assert!(matches!(dom.data(dom.root()), Some(NodeData::Fragment)));
        assert_eq!(dom.children(dom.root()).collect::<Vec<_>>(), vec![p]);
        assert_eq!(dom.find_by_tag("html"), None);
    }

    #[test]
    fn test_empty_doctype_ids_are_absent() {
        let mut dom = Dom::new();
        let doctype = dom.create_doctype("html", Some(String::new()), None);
        match dom.data(doctype) {
            Some(NodeData::Doctype { external_id, .. }) => assert!(external_id.is_none()),
            other => panic!("Expected doctype, got {other:?}"),
        }
    }

    #[test]
    fn test_inner_text_includes_cdata() {
        let mut dom = Dom::fragment();
        let script = dom.create_element("script", vec![], false);
        dom.append(dom.root(), script);
        dom.append_text(script, "a");
        let cdata = dom.create_cdata("b");
        dom.append(script, cdata);

        assert_eq!(dom.inner_text(script), "ab");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let mut dom = Dom::fragment();
        let ul = dom.create_element("ul", vec![], false);
        dom.append(dom.root(), ul);
        let first = dom.create_element("li", vec![], false);
        dom.append(ul, first);
        let text = dom.create_text("one");
        dom.append(first, text);
        let second = dom.create_element("li", vec![], false);
        dom.append(ul, second);

        let order: Vec<_> = dom.descendants(dom.root()).collect();
        assert_eq!(order, vec![ul, first, text, second]);
        assert_eq!(dom.descendants(second).count(), 0);
    }

    #[test]
    fn test_inner_text_of_very_deep_tree() {
        let mut dom = Dom::fragment();
        let mut parent = dom.root();
        for _ in 0..200_000 {
            let b = dom.create_element("b", vec![], false);
            dom.append(parent, b);
            parent = b;
        }
        dom.append_text(parent, "deep");

        assert_eq!(dom.inner_text(dom.root()), "deep");
        assert_eq!(dom.descendants(dom.root()).count(), 200_001);
    }
}
