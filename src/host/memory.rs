//! In-memory host document.
//!
//! Nodes live in a slab and link to their parent and children by [`NodeId`].
//! Inner markup written by the runtime is stored verbatim as an opaque markup
//! node, the way a browser would keep it after parsing `innerHTML`.
//!
//! Removed subtrees are freed. Subtrees dropped by `set_inner_markup` are
//! freed too, unless a node in them carries an owner back-reference: the
//! runtime still holds those and removes them itself.

use std::any::Any;

use indexmap::IndexMap;
use slab::Slab;

use super::{HostTree, NodeId, Owner};

const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "wbr"];

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Document,
    Element(String),
    Markup(String),
    Fragment,
    ShadowRoot,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: IndexMap<String, String>,
    owner: Option<Owner>,
    shadow: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            attrs: IndexMap::new(),
            owner: None,
            shadow: None,
        }
    }
}

/// Host tree kept entirely in memory.
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Slab<Node>,
    document: NodeId,
    body: NodeId,
    shadow_roots_created: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// A document containing an empty `<body>`.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let document = NodeId(nodes.insert(Node::new(NodeKind::Document)));
        let body = NodeId(nodes.insert(Node::new(NodeKind::Element("body".into()))));
        nodes[body.0].parent = Some(document);
        nodes[document.0].children.push(body);
        Self {
            nodes,
            document,
            body,
            shadow_roots_created: 0,
        }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Child nodes of `node` (light tree only).
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.get(node.0).map(|n| n.children.clone()).unwrap_or_default()
    }

    /// Element children of `node`.
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|c| matches!(self.nodes[c.0].kind, NodeKind::Element(_)))
            .collect()
    }

    pub fn outer_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    /// Content of the isolated subtree attached to `host`, if any.
    pub fn shadow_markup(&self, host: NodeId) -> Option<String> {
        let root = self.nodes.get(host.0)?.shadow?;
        Some(self.inner_markup(root))
    }

    /// Number of isolated subtree roots ever attached.
    pub fn shadow_roots_created(&self) -> usize {
        self.shadow_roots_created
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            if let Some(p) = self.nodes.get_mut(parent.0) {
                p.children.retain(|c| *c != child);
            }
        }
    }

    /// Free `node`, its children and its isolated root.
    fn free(&mut self, node: NodeId) {
        let Some(n) = self.nodes.try_remove(node.0) else { return };
        for child in n.children {
            self.free(child);
        }
        if let Some(shadow) = n.shadow {
            self.free(shadow);
        }
    }

    fn has_owner(&self, node: NodeId) -> bool {
        let Some(n) = self.nodes.get(node.0) else { return false };
        n.owner.is_some()
            || n.children.iter().any(|c| self.has_owner(*c))
            || n.shadow.is_some_and(|s| self.has_owner(s))
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        match index {
            Some(i) if i < children.len() => children.insert(i, child),
            _ => children.push(child),
        }
    }

    fn serialize(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else { return };
        match &n.kind {
            NodeKind::Element(tag) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in &n.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_attribute(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in &n.children {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Markup(markup) => out.push_str(markup),
            NodeKind::Document | NodeKind::Fragment | NodeKind::ShadowRoot => {
                for child in &n.children {
                    self.serialize(*child, out);
                }
            }
        }
    }
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl HostTree for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> NodeId {
        NodeId(self.nodes.insert(Node::new(NodeKind::Element(tag.to_ascii_lowercase()))))
    }

    fn create_fragment(&mut self) -> NodeId {
        NodeId(self.nodes.insert(Node::new(NodeKind::Fragment)))
    }

    fn create_markup(&mut self, markup: &str) -> NodeId {
        NodeId(self.nodes.insert(Node::new(NodeKind::Markup(markup.to_string()))))
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        if !self.nodes.contains(parent.0) || !self.nodes.contains(child.0) || parent == child {
            return;
        }
        if self.nodes[child.0].kind == NodeKind::Fragment {
            let moved = std::mem::take(&mut self.nodes[child.0].children);
            for (offset, node) in moved.into_iter().enumerate() {
                self.insert_at(parent, node, index.map(|i| i + offset));
            }
            return;
        }
        self.detach(child);
        self.insert_at(parent, child, index);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.nodes.get(child.0) {
            Some(node) if node.parent == Some(parent) => {
                self.detach(child);
                self.free(child);
                true
            }
            _ => false,
        }
    }

    fn release(&mut self, node: NodeId) {
        if self.nodes.get(node.0).is_some_and(|n| n.parent.is_none()) && node != self.document {
            self.free(node);
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0)?.parent
    }

    fn index_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.nodes.get(node.0)?.parent?;
        self.nodes.get(parent.0)?.children.iter().position(|c| *c == node)
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(tag) => Some(tag.clone()),
            _ => None,
        }
    }

    fn set_inner_markup(&mut self, node: NodeId, markup: &str) {
        let Some(n) = self.nodes.get_mut(node.0) else { return };
        if let NodeKind::Markup(own) = &mut n.kind {
            *own = markup.to_string();
            return;
        }
        let old = std::mem::take(&mut n.children);
        for child in old {
            if self.has_owner(child) {
                self.nodes[child.0].parent = None;
            } else {
                self.free(child);
            }
        }
        if !markup.is_empty() {
            let text = NodeId(self.nodes.insert(Node::new(NodeKind::Markup(markup.to_string()))));
            self.insert_at(node, text, None);
        }
    }

    fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(n) = self.nodes.get(node.0) {
            if let NodeKind::Markup(markup) = &n.kind {
                return markup.clone();
            }
            for child in &n.children {
                self.serialize(*child, &mut out);
            }
        }
        out
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) {
        let Some(n) = self.nodes.get_mut(node.0) else { return };
        match value {
            Some(v) => {
                n.attrs.insert(name.to_string(), v.to_string());
            }
            None => {
                n.attrs.shift_remove(name);
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(node.0)?.attrs.get(name).cloned()
    }

    fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        let mut root = Node::new(NodeKind::ShadowRoot);
        // Parent link only: the root is not part of the light tree.
        root.parent = Some(host);
        let root = NodeId(self.nodes.insert(root));
        if let Some(h) = self.nodes.get_mut(host.0) {
            h.shadow = Some(root);
        }
        self.shadow_roots_created += 1;
        root
    }

    fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.get(host.0)?.shadow
    }

    fn set_owner(&mut self, node: NodeId, owner: Owner) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.owner = Some(owner);
        }
    }

    fn owner(&self, node: NodeId) -> Option<Owner> {
        self.nodes.get(node.0)?.owner
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_serialize() {
        let mut doc = MemoryDocument::new();
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        doc.insert_child(doc.body(), ul, None);
        doc.insert_child(ul, li, None);
        doc.set_inner_markup(li, "one");
        doc.set_attribute(li, "completed", Some(""));
        assert_eq!(doc.inner_markup(doc.body()), "<ul><li completed>one</li></ul>");
    }

    #[test]
    fn test_insert_at_index() {
        let mut doc = MemoryDocument::new();
        let a = doc.create_element("a");
        let b = doc.create_element("b");
        doc.insert_child(doc.body(), a, None);
        doc.insert_child(doc.body(), b, Some(0));
        assert_eq!(doc.inner_markup(doc.body()), "<b></b><a></a>");
    }

    #[test]
    fn test_fragment_moves_children() {
        let mut doc = MemoryDocument::new();
        let frag = doc.create_fragment();
        let span = doc.create_element("span");
        doc.insert_child(frag, span, None);
        doc.insert_child(doc.body(), frag, None);
        assert_eq!(doc.children(frag), vec![]);
        assert_eq!(doc.parent(span), Some(doc.body()));
        assert_eq!(doc.parent(frag), None);
    }

    #[test]
    fn test_remove_child_is_safe() {
        let mut doc = MemoryDocument::new();
        let p = doc.create_element("p");
        assert!(!doc.remove_child(doc.body(), p));
        doc.insert_child(doc.body(), p, None);
        assert!(doc.remove_child(doc.body(), p));
        assert_eq!(doc.inner_markup(doc.body()), "");
    }

    #[test]
    fn test_removed_subtree_is_freed() {
        let mut doc = MemoryDocument::new();
        let ul = doc.create_element("ul");
        let li = doc.create_element("li");
        doc.insert_child(doc.body(), ul, None);
        doc.insert_child(ul, li, None);
        let root = doc.attach_shadow(ul);

        assert!(doc.remove_child(doc.body(), ul));
        assert!(!doc.contains(ul));
        assert!(!doc.contains(li));
        assert!(!doc.contains(root));
    }

    #[test]
    fn test_overwritten_nodes_are_freed_unless_owned() {
        let mut doc = MemoryDocument::new();
        let plain = doc.create_element("b");
        let owned = doc.create_element("i");
        doc.set_owner(owned, Owner::Component(crate::types::ComponentId(0)));
        doc.insert_child(doc.body(), plain, None);
        doc.insert_child(doc.body(), owned, None);

        doc.set_inner_markup(doc.body(), "text");
        assert!(!doc.contains(plain));
        assert!(doc.contains(owned));
        assert_eq!(doc.parent(owned), None);
        assert_eq!(doc.inner_markup(doc.body()), "text");
    }

    #[test]
    fn test_markup_node() {
        let mut doc = MemoryDocument::new();
        let p = doc.create_element("p");
        let text = doc.create_markup("one");
        doc.insert_child(doc.body(), p, None);
        doc.insert_child(doc.body(), text, Some(0));
        assert_eq!(doc.index_of(text), Some(0));
        assert_eq!(doc.index_of(p), Some(1));

        doc.set_inner_markup(text, "two");
        assert_eq!(doc.inner_markup(text), "two");
        assert_eq!(doc.inner_markup(doc.body()), "two<p></p>");
    }

    #[test]
    fn test_release_only_detached() {
        let mut doc = MemoryDocument::new();
        let frag = doc.create_fragment();
        let p = doc.create_element("p");
        doc.insert_child(doc.body(), p, None);

        doc.release(p);
        assert!(doc.contains(p));
        doc.release(frag);
        assert!(!doc.contains(frag));
    }

    #[test]
    fn test_shadow_content_is_hidden() {
        let mut doc = MemoryDocument::new();
        let section = doc.create_element("section");
        doc.insert_child(doc.body(), section, None);
        let root = doc.attach_shadow(section);
        doc.set_inner_markup(root, "<b>hidden</b>");
        assert_eq!(doc.inner_markup(doc.body()), "<section></section>");
        assert_eq!(doc.shadow_markup(section).as_deref(), Some("<b>hidden</b>"));
        assert_eq!(doc.parent(root), Some(section));
        assert_eq!(doc.shadow_roots_created(), 1);
    }

    #[test]
    fn test_void_elements() {
        let mut doc = MemoryDocument::new();
        let br = doc.create_element("BR");
        doc.insert_child(doc.body(), br, None);
        assert_eq!(doc.inner_markup(doc.body()), "<br>");
        assert_eq!(doc.tag_name(br).as_deref(), Some("br"));
    }
}
