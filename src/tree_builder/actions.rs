//! Helper operations shared by the insertion-mode rules: the stack of
//! open elements, scope checks, the list of active formatting elements,
//! the pending text buffer, and the adoption agency algorithm.

use std::borrow::Cow;

use crate::tokenizer::states::{RawKind, State};
use crate::tokenizer::{Attribute, Tag};
use crate::util::str::is_ascii_whitespace;
use crate::Atom;

use super::interface::{AppendNode, AppendText, NodeOrText, QuirksMode, TreeSink};
use super::tag_sets::*;
use super::types::*;
use super::{FormatEntry, TreeBuilder};

/// Which scope-check marker set to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    Default,
    Button,
    ListItem,
    Table,
    Select,
}

impl<'sink, Sink: TreeSink> TreeBuilder<'sink, Sink> {
    pub(crate) fn unexpected<T: std::fmt::Debug>(&mut self, what: &T) {
        let msg = if self.opts.exact_errors {
            Cow::Owned(format!("Unexpected {:?} in insertion mode {:?}", what, self.mode))
        } else {
            Cow::Borrowed("Unexpected token")
        };
        self.sink.parse_error(msg);
    }

    pub(crate) fn set_quirks_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
        self.sink.set_quirks_mode(mode);
    }

    //§ the-stack-of-open-elements
    pub(crate) fn current_node(&self) -> Sink::Handle {
        self.open_elems.last().expect("no current node").clone()
    }

    pub(crate) fn current_node_named(&self, name: &str) -> bool {
        !self.open_elems.is_empty() && self.current_node_name().as_ref() == name
    }

    pub(crate) fn current_node_name(&self) -> Atom {
        self.sink.elem_name(self.open_elems.last().expect("no current node"))
    }

    pub(crate) fn html_elem(&self) -> Sink::Handle {
        self.open_elems.first().expect("no html element").clone()
    }

    pub(crate) fn push(&mut self, elem: &Sink::Handle) {
        self.open_elems.push(elem.clone());
    }

    pub(crate) fn pop(&mut self) -> Sink::Handle {
        self.open_elems.pop().expect("no element to pop")
    }

    pub(crate) fn position_in_stack(&self, elem: &Sink::Handle) -> Option<usize> {
        self.open_elems
            .iter()
            .position(|n| self.sink.same_node(n, elem))
    }

    pub(crate) fn remove_from_stack(&mut self, elem: &Sink::Handle) {
        if let Some(i) = self.position_in_stack(elem) {
            self.open_elems.remove(i);
        }
    }

    /// Pop elements until one named `name` has been popped.
    pub(crate) fn pop_until_named(&mut self, name: &str) {
        while !self.open_elems.is_empty() {
            let popped = self.pop();
            if self.sink.elem_name(&popped).as_ref() == name {
                break;
            }
        }
    }

    /// Pop elements until one whose name is in `set` has been popped.
    pub(crate) fn pop_until_one_of(&mut self, set: &phf::Set<&'static str>) {
        while !self.open_elems.is_empty() {
            let popped = self.pop();
            if set.contains(self.sink.elem_name(&popped).as_ref()) {
                break;
            }
        }
    }

    /// Pop elements above the given context set, leaving the context
    /// element as the current node.
    pub(crate) fn clear_stack_to_context(&mut self, context: &phf::Set<&'static str>) {
        while !self.open_elems.is_empty()
            && !context.contains(self.current_node_name().as_ref())
        {
            self.pop();
        }
    }

    //§ has-an-element-in-scope
    fn scope_markers(scope: Scope, name: &str) -> bool {
        match scope {
            Scope::Default => DEFAULT_SCOPE.contains(name),
            Scope::Button => DEFAULT_SCOPE.contains(name) || BUTTON_SCOPE_EXTRA.contains(name),
            Scope::ListItem => {
                DEFAULT_SCOPE.contains(name) || LIST_ITEM_SCOPE_EXTRA.contains(name)
            }
            Scope::Table => TABLE_SCOPE.contains(name),
            // Everything is a marker except optgroup and option.
            Scope::Select => !SELECT_SCOPE_TRANSPARENT.contains(name),
        }
    }

    /// Walk the stack top to bottom: true on a tag-name match, false on
    /// reaching one of the scope's markers.
    pub(crate) fn in_scope_named(&self, scope: Scope, name: &str) -> bool {
        for elem in self.open_elems.iter().rev() {
            let elem_name = self.sink.elem_name(elem);
            if elem_name.as_ref() == name {
                return true;
            }
            if Self::scope_markers(scope, elem_name.as_ref()) {
                return false;
            }
        }
        false
    }

    /// Like `in_scope_named` but matches any name in `set`.
    pub(crate) fn in_scope_any(&self, scope: Scope, set: &phf::Set<&'static str>) -> bool {
        for elem in self.open_elems.iter().rev() {
            let elem_name = self.sink.elem_name(elem);
            if set.contains(elem_name.as_ref()) {
                return true;
            }
            if Self::scope_markers(scope, elem_name.as_ref()) {
                return false;
            }
        }
        false
    }

    /// Is this specific element in the default scope?
    pub(crate) fn elem_in_default_scope(&self, elem: &Sink::Handle) -> bool {
        for node in self.open_elems.iter().rev() {
            if self.sink.same_node(node, elem) {
                return true;
            }
            if Self::scope_markers(Scope::Default, self.sink.elem_name(node).as_ref()) {
                return false;
            }
        }
        false
    }

    //§ closing-elements-that-have-implied-end-tags
    pub(crate) fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_except(None);
    }

    pub(crate) fn generate_implied_end_except(&mut self, except: Option<&str>) {
        while !self.open_elems.is_empty() {
            let name = self.current_node_name();
            if !IMPLIED_END.contains(name.as_ref()) || except == Some(name.as_ref()) {
                break;
            }
            self.pop();
        }
    }

    /// Generate implied end tags except `name`, check that the current
    /// node is `name`, and pop through it.
    pub(crate) fn expect_to_close(&mut self, name: &str) {
        self.generate_implied_end_except(Some(name));
        if !self.current_node_named(name) {
            self.sink
                .parse_error(Cow::Borrowed("Unexpected open element while closing"));
        }
        self.pop_until_named(name);
    }

    pub(crate) fn close_p_element(&mut self) {
        self.generate_implied_end_except(Some("p"));
        if !self.current_node_named("p") {
            self.sink.parse_error(Cow::Borrowed("No <p> to close"));
        }
        self.pop_until_named("p");
    }

    pub(crate) fn close_p_element_in_button_scope(&mut self) {
        if self.in_scope_named(Scope::Button, "p") {
            self.close_p_element();
        }
    }

    //§ the-list-of-active-formatting-elements
    pub(crate) fn position_in_formatting(&self, elem: &Sink::Handle) -> Option<usize> {
        self.active_formatting.iter().position(|entry| match entry {
            FormatEntry::Element(h, _, _) => self.sink.same_node(h, elem),
            FormatEntry::Marker => false,
        })
    }

    /// Last matching entry after the last marker.
    pub(crate) fn formatting_element_position(
        &self,
        name: &str,
    ) -> Option<(usize, Sink::Handle)> {
        for (i, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => return None,
                FormatEntry::Element(h, n, _) if n.as_ref() == name => {
                    return Some((i, h.clone()))
                }
                _ => (),
            }
        }
        None
    }

    /// Push an element entry, applying the Noah's Ark clause: at most
    /// three entries with identical name and attributes since the last
    /// marker.
    pub(crate) fn push_formatting(
        &mut self,
        elem: Sink::Handle,
        name: Atom,
        attrs: Vec<Attribute>,
    ) {
        let mut matching = vec![];
        for (i, entry) in self.active_formatting.iter().enumerate().rev() {
            match entry {
                FormatEntry::Marker => break,
                FormatEntry::Element(_, n, a) => {
                    if *n == name && *a == attrs {
                        matching.push(i);
                    }
                }
            }
        }
        if matching.len() >= 3 {
            self.active_formatting.remove(*matching.last().unwrap());
        }
        self.active_formatting
            .push(FormatEntry::Element(elem, name, attrs));
    }

    pub(crate) fn push_formatting_marker(&mut self) {
        self.active_formatting.push(FormatEntry::Marker);
    }

    pub(crate) fn clear_active_formatting_to_marker(&mut self) {
        while let Some(entry) = self.active_formatting.pop() {
            if matches!(entry, FormatEntry::Marker) {
                break;
            }
        }
    }

    //§ reconstruct-the-active-formatting-elements
    pub(crate) fn reconstruct_formatting(&mut self) {
        let mut entry_index = match self.active_formatting.len().checked_sub(1) {
            None => return,
            Some(i) => i,
        };
        match &self.active_formatting[entry_index] {
            FormatEntry::Marker => return,
            FormatEntry::Element(h, _, _) => {
                let h = h.clone();
                if self.position_in_stack(&h).is_some() {
                    return;
                }
            }
        }

        // Rewind to the first entry that needs recreating.
        while entry_index > 0 {
            entry_index -= 1;
            let stop = match &self.active_formatting[entry_index] {
                FormatEntry::Marker => true,
                FormatEntry::Element(h, _, _) => {
                    let h = h.clone();
                    self.position_in_stack(&h).is_some()
                }
            };
            if stop {
                entry_index += 1;
                break;
            }
        }

        // Walk forward, making fresh elements.
        loop {
            let (name, attrs) = match &self.active_formatting[entry_index] {
                FormatEntry::Element(_, n, a) => (n.clone(), a.clone()),
                FormatEntry::Marker => unreachable!("marker while reconstructing"),
            };
            let new_elem = self.insert_element(true, name.clone(), attrs.clone());
            self.active_formatting[entry_index] = FormatEntry::Element(new_elem, name, attrs);
            if entry_index == self.active_formatting.len() - 1 {
                break;
            }
            entry_index += 1;
        }
    }

    //§ appropriate-place-for-inserting-a-node
    pub(crate) fn insert_appropriately(
        &mut self,
        child: NodeOrText<Sink::Handle>,
        override_target: Option<Sink::Handle>,
    ) {
        let target = override_target.unwrap_or_else(|| self.current_node());
        if self.foster_parenting
            && TABLE_FOSTER.contains(self.sink.elem_name(&target).as_ref())
        {
            if let Some(table_index) = self
                .open_elems
                .iter()
                .rposition(|e| self.sink.elem_name(e).as_ref() == "table")
            {
                let table = self.open_elems[table_index].clone();
                match self.sink.append_before_sibling(&table, child) {
                    Ok(()) => return,
                    Err(child) => {
                        // The table has no parent; insert below it.
                        let prev = self.open_elems[table_index - 1].clone();
                        self.sink.append(&prev, child);
                        return;
                    }
                }
            }
            let html = self.html_elem();
            self.sink.append(&html, child);
            return;
        }
        self.sink.append(&target, child);
    }

    //§ insert-an-html-element
    pub(crate) fn insert_element(
        &mut self,
        push: bool,
        name: Atom,
        attrs: Vec<Attribute>,
    ) -> Sink::Handle {
        self.flush_text();
        let elem = self.sink.create_element(name, attrs);
        self.insert_appropriately(AppendNode(elem.clone()), None);
        if push {
            self.push(&elem);
        }
        elem
    }

    pub(crate) fn insert_element_for(&mut self, tag: &Tag) -> Sink::Handle {
        self.insert_element(true, tag.name.clone(), tag.attrs.clone())
    }

    /// Void elements are pushed and immediately popped.
    pub(crate) fn insert_and_pop_element_for(&mut self, tag: &Tag) -> Sink::Handle {
        let elem = self.insert_element_for(tag);
        self.pop();
        elem
    }

    /// Insert a synthesized element with no attributes.
    pub(crate) fn insert_phantom(&mut self, name: &str) -> Sink::Handle {
        self.insert_element(true, Atom::from(name), vec![])
    }

    pub(crate) fn insert_comment(&mut self, text: String) {
        self.flush_text();
        let comment = self.sink.create_comment(text);
        self.insert_appropriately(AppendNode(comment), None);
    }

    pub(crate) fn insert_comment_to_doc(&mut self, text: String) {
        self.flush_text();
        let comment = self.sink.create_comment(text);
        let doc = self.doc_handle.clone();
        self.sink.append(&doc, AppendNode(comment));
    }

    pub(crate) fn insert_comment_to_html(&mut self, text: String) {
        self.flush_text();
        let comment = self.sink.create_comment(text);
        let html = self.html_elem();
        self.sink.append(&html, AppendNode(comment));
    }

    //§ the-pending-text-buffer
    pub(crate) fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.foster_parenting
            && TABLE_FOSTER.contains(self.current_node_name().as_ref())
        {
            self.flush_text();
            self.insert_appropriately(AppendText(text.to_string()), None);
            return;
        }
        let target = self.current_node();
        let same_parent = self
            .pending_text_parent
            .as_ref()
            .map_or(false, |p| self.sink.same_node(p, &target));
        if !same_parent {
            self.flush_text();
            self.pending_text_parent = Some(target);
        }
        self.pending_text.push_str(text);
    }

    pub(crate) fn flush_text(&mut self) {
        let parent = match self.pending_text_parent.take() {
            None => return,
            Some(p) => p,
        };
        if self.pending_text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending_text);
        self.sink.append(&parent, AppendText(text));
    }

    //§ parsing-elements-that-contain-only-text
    pub(crate) fn parse_raw_data(&mut self, tag: &Tag, kind: RawKind) {
        self.insert_element_for(tag);
        self.orig_mode = Some(self.mode);
        self.mode = Text;
        self.next_tokenizer_state = Some(State::RawData(kind));
    }

    //§ the-adoption-agency-algorithm
    /// Returns false when the caller should fall back to the "any other
    /// end tag" steps.
    pub(crate) fn adoption_agency(&mut self, subject: &Atom) -> bool {
        self.flush_text();

        // If the current node is the subject and not an active
        // formatting entry, just pop it.
        if !self.open_elems.is_empty() && self.current_node_name() == *subject {
            let current = self.current_node();
            if self.position_in_formatting(&current).is_none() {
                self.pop();
                return true;
            }
        }

        for _ in 0..8 {
            let (fmt_index, fmt_elem) = match self.formatting_element_position(subject.as_ref()) {
                None => return false,
                Some(x) => x,
            };

            let stack_index = match self.position_in_stack(&fmt_elem) {
                None => {
                    self.sink
                        .parse_error(Cow::Borrowed("Formatting element not open"));
                    self.active_formatting.remove(fmt_index);
                    return true;
                }
                Some(i) => i,
            };

            if !self.elem_in_default_scope(&fmt_elem) {
                self.sink
                    .parse_error(Cow::Borrowed("Formatting element not in scope"));
                return true;
            }

            if !self.sink.same_node(&fmt_elem, &self.current_node()) {
                self.sink
                    .parse_error(Cow::Borrowed("Formatting element not current node"));
            }

            // The furthest block: the lowest special element above the
            // formatting element.
            let furthest = self.open_elems[stack_index + 1..]
                .iter()
                .position(|n| SPECIAL.contains(self.sink.elem_name(n).as_ref()))
                .map(|off| stack_index + 1 + off);

            let fb_index = match furthest {
                None => {
                    self.open_elems.truncate(stack_index);
                    self.active_formatting.remove(fmt_index);
                    return true;
                }
                Some(i) => i,
            };
            let furthest_block = self.open_elems[fb_index].clone();
            let common_ancestor = self.open_elems[stack_index - 1].clone();
            let mut bookmark = fmt_index;

            let mut node_index = fb_index;
            let mut last_node = furthest_block.clone();
            let mut inner = 0usize;
            loop {
                node_index -= 1;
                let node = self.open_elems[node_index].clone();
                if self.sink.same_node(&node, &fmt_elem) {
                    break;
                }
                inner += 1;

                let node_fmt = self.position_in_formatting(&node);
                if inner > 3 {
                    if let Some(i) = node_fmt {
                        self.active_formatting.remove(i);
                        if i < bookmark {
                            bookmark -= 1;
                        }
                    }
                    self.open_elems.remove(node_index);
                    continue;
                }
                let i = match node_fmt {
                    None => {
                        self.open_elems.remove(node_index);
                        continue;
                    }
                    Some(i) => i,
                };

                let (name, attrs) = match &self.active_formatting[i] {
                    FormatEntry::Element(_, n, a) => (n.clone(), a.clone()),
                    FormatEntry::Marker => unreachable!("marker in formatting position"),
                };
                let new_node = self.sink.create_element(name.clone(), attrs.clone());
                self.active_formatting[i] = FormatEntry::Element(new_node.clone(), name, attrs);
                self.open_elems[node_index] = new_node.clone();

                if self.sink.same_node(&last_node, &furthest_block) {
                    bookmark = i + 1;
                }

                self.sink.remove_from_parent(&last_node);
                self.sink.append(&new_node, AppendNode(last_node));
                last_node = new_node;
            }

            self.sink.remove_from_parent(&last_node);
            self.insert_appropriately(AppendNode(last_node), Some(common_ancestor));

            let fmt_index = self
                .position_in_formatting(&fmt_elem)
                .expect("formatting entry vanished");
            let (name, attrs) = match &self.active_formatting[fmt_index] {
                FormatEntry::Element(_, n, a) => (n.clone(), a.clone()),
                FormatEntry::Marker => unreachable!("marker in formatting position"),
            };
            let new_fmt = self.sink.create_element(name.clone(), attrs.clone());
            self.sink.reparent_children(&furthest_block, &new_fmt);
            self.sink.append(&furthest_block, AppendNode(new_fmt.clone()));

            self.active_formatting.remove(fmt_index);
            if fmt_index < bookmark {
                bookmark -= 1;
            }
            let bookmark = bookmark.min(self.active_formatting.len());
            self.active_formatting
                .insert(bookmark, FormatEntry::Element(new_fmt.clone(), name, attrs));

            self.remove_from_stack(&fmt_elem);
            let fb_index = self
                .position_in_stack(&furthest_block)
                .expect("furthest block vanished");
            self.open_elems.insert(fb_index + 1, new_fmt);
        }
        true
    }

    //§ closing-misnested-tags
    /// The "any other end tag" steps for the in-body mode.
    pub(crate) fn any_other_end_tag(&mut self, name: &Atom) {
        for i in (0..self.open_elems.len()).rev() {
            let node = self.open_elems[i].clone();
            let node_name = self.sink.elem_name(&node);
            if node_name == *name {
                self.generate_implied_end_except(Some(name.as_ref()));
                if !self.sink.same_node(&node, &self.current_node()) {
                    self.sink
                        .parse_error(Cow::Borrowed("Unexpected open element while closing"));
                }
                while let Some(popped) = self.open_elems.pop() {
                    if self.sink.same_node(&popped, &node) {
                        break;
                    }
                }
                return;
            }
            if SPECIAL.contains(node_name.as_ref()) {
                self.sink.parse_error(Cow::Borrowed("Unexpected end tag"));
                return;
            }
        }
    }

    //§ resetting-the-insertion-mode-appropriately
    pub(crate) fn reset_insertion_mode(&mut self) {
        for (i, node) in self.open_elems.iter().enumerate().rev() {
            let last = i == 0;
            let name = self.sink.elem_name(node);
            self.mode = match name.as_ref() {
                "select" => InSelect,
                "td" | "th" if !last => InCell,
                "tr" => InRow,
                "tbody" | "thead" | "tfoot" => InTableBody,
                "caption" => InCaption,
                "colgroup" => InColumnGroup,
                "table" => InTable,
                "template" => *self.template_modes.last().unwrap_or(&InBody),
                "body" => InBody,
                "frameset" => InFrameset,
                "html" => {
                    if self.head_elem.is_none() {
                        BeforeHead
                    } else {
                        AfterHead
                    }
                }
                _ if last => InBody,
                _ => continue,
            };
            return;
        }
        self.mode = InBody;
    }

    //§ closing-a-table-cell
    pub(crate) fn close_the_cell(&mut self) {
        self.generate_implied_end_tags();
        if self.in_scope_named(Scope::Table, "td") {
            self.expect_to_close("td");
        } else if self.in_scope_named(Scope::Table, "th") {
            self.expect_to_close("th");
        }
        self.clear_active_formatting_to_marker();
        self.mode = InRow;
    }

    //§ stopping-parsing
    pub(crate) fn stop_parsing(&mut self) -> ProcessResult {
        self.flush_text();
        self.open_elems.clear();
        self.mode = AfterAfterBody;
        Done
    }

    pub(crate) fn is_all_whitespace(text: &str) -> bool {
        text.chars().all(is_ascii_whitespace)
    }
}

impl<'sink, Sink: TreeSink> TreeBuilder<'sink, Sink> {
    /// Append a new element directly under the document node; used for
    /// the root `<html>` element when the stack is still empty.
    pub(crate) fn create_root(&mut self, name: Atom, attrs: Vec<Attribute>) -> Sink::Handle {
        let elem = self.sink.create_element(name, attrs);
        let doc = self.doc_handle.clone();
        self.sink.append(&doc, AppendNode(elem.clone()));
        self.push(&elem);
        elem
    }
}
