//! The document object model.
//!
//! All nodes live in an arena owned by the `Document`; handles are
//! indices into it.  Nodes are never freed individually, and node
//! identity is stable from creation to document destruction.

use std::borrow::Cow;

use crate::tokenizer::Attribute;
use crate::tree_builder::{NodeOrText, QuirksMode, TreeSink};
use crate::Atom;

mod item;
pub mod serialize;

pub use self::item::{Item, ItemType};

/// Handle to a node in a `Document`'s arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// The document root.
    Document,

    /// An element, with interned tag name and ordered attributes.
    Element { name: Atom, attrs: Vec<Attribute> },

    /// Character data.
    Text(String),

    /// A comment.
    Comment(String),

    /// A bare symbol, as produced by e.g. Markdown emoji shortcodes.
    Symbol(Atom),
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Doctype information recorded as document-level metadata rather than
/// as a child node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DoctypeData {
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

/// A parsed document and the arena that owns its nodes.
pub struct Document {
    nodes: Vec<Node>,
    pub doctype: Option<DoctypeData>,
    pub quirks_mode: QuirksMode,
    pub errors: Vec<Cow<'static, str>>,
}

impl Default for Document {
    fn default() -> Document {
        Document::new()
    }
}

impl Document {
    pub fn new() -> Document {
        Document {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: vec![],
            }],
            doctype: None,
            quirks_mode: QuirksMode::NoQuirks,
            errors: vec![],
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn new_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            data,
            parent: None,
            children: vec![],
        });
        id
    }

    pub fn create_element(&mut self, name: Atom, attrs: Vec<Attribute>) -> NodeId {
        self.new_node(NodeData::Element { name, attrs })
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Text(text))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.new_node(NodeData::Comment(text))
    }

    pub fn create_symbol(&mut self, name: Atom) -> NodeId {
        self.new_node(NodeData::Symbol(name))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.idx()]
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.idx()].data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.idx()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.idx()].children
    }

    /// Interned tag name, for element nodes.
    pub fn tag_name(&self, id: NodeId) -> Option<&Atom> {
        match &self.nodes[id.idx()].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id).map_or(false, |t| t.as_ref() == name)
    }

    /// Attribute lookup by name.  Names are interned, so this is a
    /// pointer comparison when the query string is already an atom.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.idx()].data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.as_ref() == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Set an attribute; the last write wins.
    pub fn set_attr(&mut self, id: NodeId, name: Atom, value: String) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.idx()].data {
            match attrs.iter_mut().find(|a| a.name == name) {
                Some(existing) => existing.value = value,
                None => attrs.push(Attribute { name, value }),
            }
        }
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.idx()].parent.is_none());
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[parent.idx()].children.push(child);
    }

    /// Insert `child` immediately before `sibling`.
    pub fn insert_before(&mut self, sibling: NodeId, child: NodeId) {
        let parent = self.nodes[sibling.idx()].parent.expect("sibling has no parent");
        let i = self.nodes[parent.idx()]
            .children
            .iter()
            .position(|&c| c == sibling)
            .expect("sibling not found in parent");
        self.nodes[child.idx()].parent = Some(parent);
        self.nodes[parent.idx()].children.insert(i, child);
    }

    pub fn remove_from_parent(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.idx()].parent.take() {
            self.nodes[parent.idx()].children.retain(|&c| c != id);
        }
    }

    /// Move all children of `from` to the end of `to`'s child list.
    pub fn reparent_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.idx()].children);
        for &child in &children {
            self.nodes[child.idx()].parent = Some(to);
        }
        self.nodes[to.idx()].children.extend(children);
    }

    /// Append a loosely typed item under `parent`, converting it to the
    /// matching node shape.  Strings become text nodes (merging into a
    /// trailing text sibling), symbols become symbol nodes, elements
    /// attach directly.  Everything else is stringified.
    pub fn append_item(&mut self, parent: NodeId, item: Item) {
        match item {
            Item::Null => (),
            Item::Str(s) => self.append_text(parent, &s),
            Item::Symbol(name) => {
                let node = self.create_symbol(name);
                self.append(parent, node);
            }
            Item::Element(id) => self.append(parent, id),
            Item::List(items) | Item::Array(items) => {
                for item in items {
                    self.append_item(parent, item);
                }
            }
            Item::Bool(b) => self.append_text(parent, if b { "true" } else { "false" }),
            other => {
                if let Some(n) = other.as_int() {
                    self.append_text(parent, &n.to_string());
                } else if let Some(f) = other.as_float() {
                    self.append_text(parent, &f.to_string());
                }
            }
        }
    }

    /// Append character data, merging with a trailing text node so a
    /// contiguous run yields a single text child.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.nodes[parent.idx()].children.last() {
            if let NodeData::Text(existing) = &mut self.nodes[last.idx()].data {
                existing.push_str(text);
                return;
            }
        }
        let node = self.create_text(text.to_string());
        self.append(parent, node);
    }

    /// The `<html>` element, if the document has one.
    pub fn html(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&c| self.is_element_named(c, "html"))
    }

    pub fn head(&self) -> Option<NodeId> {
        let html = self.html()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.is_element_named(c, "head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        let html = self.html()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&c| self.is_element_named(c, "body"))
    }

    /// Concatenated text of the subtree rooted at `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.idx()].data {
            NodeData::Text(text) => out.push_str(text),
            _ => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Pre-order traversal of element nodes.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            for &child in self.children(node).iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

impl TreeSink for Document {
    type Handle = NodeId;

    fn parse_error(&mut self, msg: Cow<'static, str>) {
        self.errors.push(msg);
    }

    fn get_document(&mut self) -> NodeId {
        self.root()
    }

    fn elem_name(&self, target: &NodeId) -> Atom {
        self.tag_name(*target).expect("not an element").clone()
    }

    fn create_element(&mut self, name: Atom, attrs: Vec<Attribute>) -> NodeId {
        Document::create_element(self, name, attrs)
    }

    fn create_comment(&mut self, text: String) -> NodeId {
        Document::create_comment(self, text)
    }

    fn append(&mut self, parent: &NodeId, child: NodeOrText<NodeId>) {
        match child {
            NodeOrText::AppendText(text) => self.append_text(*parent, &text),
            NodeOrText::AppendNode(node) => Document::append(self, *parent, node),
        }
    }

    fn append_before_sibling(
        &mut self,
        sibling: &NodeId,
        child: NodeOrText<NodeId>,
    ) -> Result<(), NodeOrText<NodeId>> {
        let parent = match self.parent(*sibling) {
            Some(parent) => parent,
            None => return Err(child),
        };
        let i = self
            .children(parent)
            .iter()
            .position(|c| c == sibling)
            .expect("sibling not found in parent");

        let node = match child {
            NodeOrText::AppendText(text) => {
                // Merge into a preceding text node if there is one.
                if i > 0 {
                    let prev = self.children(parent)[i - 1];
                    if let NodeData::Text(existing) = &mut self.nodes[prev.idx()].data {
                        existing.push_str(&text);
                        return Ok(());
                    }
                }
                self.create_text(text)
            }
            NodeOrText::AppendNode(node) => {
                if self.parent(node).is_some() {
                    Document::remove_from_parent(self, node);
                }
                node
            }
        };

        self.insert_before(*sibling, node);
        Ok(())
    }

    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String) {
        self.doctype = Some(DoctypeData {
            name,
            public_id,
            system_id,
        });
    }

    fn add_attrs_if_missing(&mut self, target: &NodeId, attrs: Vec<Attribute>) {
        if let NodeData::Element {
            attrs: existing, ..
        } = &mut self.nodes[target.idx()].data
        {
            for attr in attrs {
                if !existing.iter().any(|e| e.name == attr.name) {
                    existing.push(attr);
                }
            }
        }
    }

    fn remove_from_parent(&mut self, target: &NodeId) {
        Document::remove_from_parent(self, *target);
    }

    fn reparent_children(&mut self, node: &NodeId, new_parent: &NodeId) {
        Document::reparent_children(self, *node, *new_parent);
    }

    fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }
}

#[cfg(test)]
mod test {
    use super::{Document, NodeData};
    use crate::Atom;

    #[test]
    fn append_text_coalesces() {
        let mut doc = Document::new();
        let p = doc.create_element(Atom::from("p"), vec![]);
        let root = doc.root();
        doc.append(root, p);
        doc.append_text(p, "one");
        doc.append_text(p, " two");
        assert_eq!(doc.children(p).len(), 1);
        assert_eq!(doc.text_content(p), "one two");
    }

    #[test]
    fn set_attr_last_wins() {
        let mut doc = Document::new();
        let a = doc.create_element(Atom::from("a"), vec![]);
        doc.set_attr(a, Atom::from("href"), "one".to_string());
        doc.set_attr(a, Atom::from("href"), "two".to_string());
        assert_eq!(doc.attr(a, "href"), Some("two"));
        match doc.data(a) {
            NodeData::Element { attrs, .. } => assert_eq!(attrs.len(), 1),
            _ => unreachable!(),
        }
    }

    #[test]
    fn interned_names_compare_by_content() {
        let a = Atom::from("div");
        let b = Atom::from(String::from("d") + "iv");
        assert_eq!(a, b);
    }
}
