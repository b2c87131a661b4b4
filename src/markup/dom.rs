//! Arena DOM for one entry's markup.
//!
//! html5ever parses into this arena; the transpiler walks it by id. A DOM
//! lives only as long as the conversion of its entry.

use html5ever::{LocalName, QualName};

use crate::error::{Error, Result};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Raw node payload as produced by the parser.
#[derive(Debug, Clone)]
pub enum MarkupData {
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-split class list.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

/// Markup attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// The categories the transpiler has rules for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Element,
    /// Script and style elements; their content never reaches the output.
    Ignorable,
}

/// A node in the arena.
#[derive(Debug)]
pub struct MarkupNode {
    pub data: MarkupData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl MarkupNode {
    fn new(data: MarkupData) -> Self {
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

/// Arena-based markup tree.
///
/// Parent/child/sibling links are indices into one node vector.
pub struct MarkupDom {
    nodes: Vec<MarkupNode>,
    document: NodeId,
}

impl MarkupDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(MarkupNode::new(MarkupData::Document));
        dom
    }

    fn alloc(&mut self, node: MarkupNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&MarkupNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut MarkupNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let classes = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "class")
            .map(|a| a.value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        self.alloc(MarkupNode::new(MarkupData::Element {
            name,
            attrs,
            classes,
        }))
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(MarkupNode::new(MarkupData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(MarkupNode::new(MarkupData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(MarkupNode::new(MarkupData::Doctype(name)))
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
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

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

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.get(id) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
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

        if let Some(node) = self.get_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Append text to the last child if it is a text node, else add one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let MarkupData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
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

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .map(|n| n.next_sibling)
            .filter(|next| next.is_some())
    }

    /// Find the first node below `root` (inclusive) matching a predicate,
    /// in document order.
    pub fn find_from<F>(&self, root: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&MarkupNode) -> bool,
    {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// First element carrying `class` in document order.
    pub fn find_by_class(&self, class: &str) -> Option<NodeId> {
        self.find_from(self.document, |node| match &node.data {
            MarkupData::Element { classes, .. } => classes.iter().any(|c| c == class),
            _ => false,
        })
    }

    /// First element named `tag` in document order.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_from(self.document, |node| match &node.data {
            MarkupData::Element { name, .. } => name.local.as_ref() == tag,
            _ => false,
        })
    }
}

impl Default for MarkupDom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a MarkupDom,
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

/// Convenience methods for element and text nodes.
impl MarkupDom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            MarkupData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Whether `id` is an element named `tag`.
    pub fn is_tag(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            MarkupData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            MarkupData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn flat_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(MarkupData::Text(s)) => out.push_str(s),
            Some(MarkupData::Element { .. }) | Some(MarkupData::Document) => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// Classify a node for the transpiler.
    pub fn kind(&self, id: NodeId) -> Result<NodeKind> {
        let node = self.get(id).ok_or(Error::UnknownNodeKind { kind: "missing" })?;
        match &node.data {
            MarkupData::Text(_) => Ok(NodeKind::Text),
            MarkupData::Element { name, .. } => match name.local.as_ref() {
                "script" | "style" => Ok(NodeKind::Ignorable),
                _ => Ok(NodeKind::Element),
            },
            MarkupData::Comment(_) => Err(Error::UnknownNodeKind { kind: "comment" }),
            MarkupData::Doctype(_) => Err(Error::UnknownNodeKind { kind: "doctype" }),
            MarkupData::Document => Err(Error::UnknownNodeKind { kind: "document" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use html5ever::ns;

    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: make_qname(name),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_append_children() {
        let mut dom = MarkupDom::new();

        let parent = dom.create_element(make_qname("div"), vec![]);
        let child1 = dom.create_element(make_qname("x-pr"), vec![]);
        let child2 = dom.create_element(make_qname("hr"), vec![]);

        dom.append(dom.document(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![child1, child2]);
        assert_eq!(dom.next_sibling(child1), Some(child2));
        assert_eq!(dom.next_sibling(child2), None);
    }

    #[test]
    fn test_text_merging() {
        let mut dom = MarkupDom::new();

        let p = dom.create_element(make_qname("p"), vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "ā");
        dom.append_text(p, "yí");

        let children: Vec<_> = dom.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("āyí"));
    }

    #[test]
    fn test_detach_middle_child() {
        let mut dom = MarkupDom::new();
        let parent = dom.create_element(make_qname("div"), vec![]);
        let a = dom.create_text("a".into());
        let b = dom.create_text("b".into());
        let c = dom.create_text("c".into());
        dom.append(parent, a);
        dom.append(parent, b);
        dom.append(parent, c);

        dom.detach(b);

        let children: Vec<_> = dom.children(parent).collect();
        assert_eq!(children, vec![a, c]);
        assert_eq!(dom.flat_text(parent), "ac");
    }

    #[test]
    fn test_find_by_class() {
        let mut dom = MarkupDom::new();
        let outer = dom.create_element(make_qname("div"), vec![attr("class", "wrap")]);
        let inner = dom.create_element(make_qname("div"), vec![attr("class", "x HYGF2")]);
        dom.append(dom.document(), outer);
        dom.append(outer, inner);

        assert_eq!(dom.find_by_class("HYGF2"), Some(inner));
        assert_eq!(dom.find_by_class("missing"), None);
    }

    #[test]
    fn test_kind_classification() {
        let mut dom = MarkupDom::new();
        let script = dom.create_element(make_qname("script"), vec![]);
        let span = dom.create_element(make_qname("span"), vec![]);
        let text = dom.create_text("t".into());
        let comment = dom.create_comment("c".into());

        assert_eq!(dom.kind(script).unwrap(), NodeKind::Ignorable);
        assert_eq!(dom.kind(span).unwrap(), NodeKind::Element);
        assert_eq!(dom.kind(text).unwrap(), NodeKind::Text);
        assert!(matches!(
            dom.kind(comment),
            Err(Error::UnknownNodeKind { kind: "comment" })
        ));
    }
}
