use std::borrow::Cow;

use crate::tokenizer::Attribute;
use crate::Atom;

pub use self::NodeOrText::{AppendNode, AppendText};
pub use self::QuirksMode::{LimitedQuirks, NoQuirks, Quirks};

/// A document's quirks mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuirksMode {
    Quirks,
    LimitedQuirks,
    NoQuirks,
}

/// Something which can be inserted into the DOM.
///
/// Adjacent sibling text nodes are merged into a single node, so
/// the sink may not assume that a text insertion produces a new node.
pub enum NodeOrText<Handle> {
    AppendNode(Handle),
    AppendText(String),
}

/// Types which can process the tree modifications requested by the
/// tree builder.
pub trait TreeSink {
    /// Reference to a DOM node, copied around freely by the builder.
    type Handle: Clone + PartialEq;

    /// Signal a parse error.
    fn parse_error(&mut self, msg: Cow<'static, str>);

    /// Get a handle to the `Document` node.
    fn get_document(&mut self) -> Self::Handle;

    /// What is the name of this element?  Only called on handles the
    /// tree builder created as elements.
    fn elem_name(&self, target: &Self::Handle) -> Atom;

    /// Create an element.
    fn create_element(&mut self, name: Atom, attrs: Vec<Attribute>) -> Self::Handle;

    /// Create a comment node.
    fn create_comment(&mut self, text: String) -> Self::Handle;

    /// Append a node as the last child of the given node.  If this
    /// would produce adjacent sibling text nodes, it instead
    /// concatenates the text onto the existing node.
    fn append(&mut self, parent: &Self::Handle, child: NodeOrText<Self::Handle>);

    /// Append a node as the sibling immediately before the given node.
    /// Returns `Err(child)` when the sibling has no parent, in which
    /// case the caller falls back to a plain append.
    fn append_before_sibling(
        &mut self,
        sibling: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) -> Result<(), NodeOrText<Self::Handle>>;

    /// Record the doctype as document metadata.
    fn append_doctype_to_document(&mut self, name: String, public_id: String, system_id: String);

    /// Add each attribute to the given element, if no attribute
    /// with that name already exists.
    fn add_attrs_if_missing(&mut self, target: &Self::Handle, attrs: Vec<Attribute>);

    /// Detach the given node from its parent.
    fn remove_from_parent(&mut self, target: &Self::Handle);

    /// Remove all of `node`'s children and re-append them under
    /// `new_parent`, preserving order.
    fn reparent_children(&mut self, node: &Self::Handle, new_parent: &Self::Handle);

    /// Set the document's quirks mode.
    fn set_quirks_mode(&mut self, mode: QuirksMode);

    /// Do two handles refer to the same node?
    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool;
}
