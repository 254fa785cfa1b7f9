//! The insertion-mode rules: one step function per mode, dispatching
//! on token kind and then tag name.

use crate::tokenizer::states::{Plaintext, RawKind, ScriptData};
use crate::tokenizer::{EndTag, StartTag, Tag};
use crate::Atom;

use super::actions::Scope;
use super::interface::TreeSink;
use super::tag_sets::*;
use super::types::*;
use super::TreeBuilder;

impl<'sink, Sink: TreeSink> TreeBuilder<'sink, Sink> {
    pub(crate) fn step(&mut self, mode: InsertionMode, token: Token) -> ProcessResult {
        match mode {
            Initial => self.step_initial(token),
            BeforeHtml => self.step_before_html(token),
            BeforeHead => self.step_before_head(token),
            InHead => self.step_in_head(token),
            InHeadNoscript => self.step_in_head_noscript(token),
            AfterHead => self.step_after_head(token),
            InBody => self.step_in_body(token),
            Text => self.step_text(token),
            InTable | InTableText => self.step_in_table(token),
            InCaption => self.step_in_caption(token),
            InColumnGroup => self.step_in_column_group(token),
            InTableBody => self.step_in_table_body(token),
            InRow => self.step_in_row(token),
            InCell => self.step_in_cell(token),
            InSelect | InSelectInTable => self.step_in_select(token),
            InTemplate => self.step_in_template(token),
            AfterBody => self.step_after_body(token),
            InFrameset => self.step_in_frameset(token),
            AfterFrameset => self.step_after_frameset(token),
            AfterAfterBody => self.step_after_after_body(token),
            AfterAfterFrameset => self.step_after_after_frameset(token),
        }
    }

    //§ the-initial-insertion-mode
    fn step_initial(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, _) => Done,
            CommentToken(text) => {
                self.insert_comment_to_doc(text);
                Done
            }
            token => {
                if !self.opts.iframe_srcdoc {
                    self.unexpected(&token);
                    self.set_quirks_mode(super::Quirks);
                }
                Reprocess(BeforeHtml, token)
            }
        }
    }

    //§ the-before-html-insertion-mode
    fn step_before_html(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, _) => Done,
            CommentToken(text) => {
                self.insert_comment_to_doc(text);
                Done
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => {
                    self.create_root(tag.name.clone(), tag.attrs.clone());
                    self.mode = BeforeHead;
                    Done
                }
                (EndTag, "head") | (EndTag, "body") | (EndTag, "html") | (EndTag, "br") => {
                    self.step_before_html_anything_else(TagToken(tag.clone()))
                }
                (EndTag, _) => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_before_html_anything_else(TagToken(tag.clone())),
            },
            token => self.step_before_html_anything_else(token),
        }
    }

    fn step_before_html_anything_else(&mut self, token: Token) -> ProcessResult {
        self.create_root(Atom::from("html"), vec![]);
        Reprocess(BeforeHead, token)
    }

    //§ the-before-head-insertion-mode
    fn step_before_head(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, _) => Done,
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "head") => {
                    let head = self.insert_element_for(&tag);
                    self.head_elem = Some(head);
                    self.mode = InHead;
                    Done
                }
                (EndTag, "head") | (EndTag, "body") | (EndTag, "html") | (EndTag, "br") => {
                    self.step_before_head_anything_else(TagToken(tag.clone()))
                }
                (EndTag, _) => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_before_head_anything_else(TagToken(tag.clone())),
            },
            token => self.step_before_head_anything_else(token),
        }
    }

    fn step_before_head_anything_else(&mut self, token: Token) -> ProcessResult {
        let head = self.insert_phantom("head");
        self.head_elem = Some(head);
        Reprocess(InHead, token)
    }

    //§ parsing-main-inhead
    fn step_in_head(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "base")
                | (StartTag, "basefont")
                | (StartTag, "bgsound")
                | (StartTag, "link")
                | (StartTag, "meta") => {
                    self.insert_and_pop_element_for(&tag);
                    DoneAckSelfClosing
                }
                (StartTag, "title") => {
                    self.parse_raw_data(&tag, RawKind::Rcdata);
                    Done
                }
                (StartTag, "noscript") => {
                    if self.opts.scripting_enabled {
                        self.parse_raw_data(&tag, RawKind::Rawtext);
                    } else {
                        self.insert_element_for(&tag);
                        self.mode = InHeadNoscript;
                    }
                    Done
                }
                (StartTag, "noframes") | (StartTag, "style") => {
                    self.parse_raw_data(&tag, RawKind::Rawtext);
                    Done
                }
                (StartTag, "script") => {
                    self.parse_raw_data(&tag, ScriptData);
                    Done
                }
                (StartTag, "template") => {
                    self.insert_element_for(&tag);
                    self.push_formatting_marker();
                    self.frameset_ok = false;
                    self.mode = InTemplate;
                    self.template_modes.push(InTemplate);
                    Done
                }
                (EndTag, "template") => {
                    if !self
                        .open_elems
                        .iter()
                        .any(|e| self.sink.elem_name(e).as_ref() == "template")
                    {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.generate_implied_end_tags();
                    if !self.current_node_named("template") {
                        self.unexpected(&tag);
                    }
                    self.pop_until_named("template");
                    self.clear_active_formatting_to_marker();
                    self.template_modes.pop();
                    self.reset_insertion_mode();
                    Done
                }
                (EndTag, "head") => {
                    self.flush_text();
                    self.pop();
                    self.mode = AfterHead;
                    Done
                }
                (EndTag, "body") | (EndTag, "html") | (EndTag, "br") => {
                    self.step_in_head_anything_else(TagToken(tag.clone()))
                }
                (StartTag, "head") | (EndTag, _) => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_in_head_anything_else(TagToken(tag.clone())),
            },
            token => self.step_in_head_anything_else(token),
        }
    }

    fn step_in_head_anything_else(&mut self, token: Token) -> ProcessResult {
        self.flush_text();
        self.pop();
        Reprocess(AfterHead, token)
    }

    //§ parsing-main-inheadnoscript
    fn step_in_head_noscript(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "basefont")
                | (StartTag, "bgsound")
                | (StartTag, "link")
                | (StartTag, "meta")
                | (StartTag, "noframes")
                | (StartTag, "style") => self.step_in_head(TagToken(tag.clone())),
                (EndTag, "noscript") => {
                    self.flush_text();
                    self.pop();
                    self.mode = InHead;
                    Done
                }
                (EndTag, "br") => {
                    self.unexpected(&tag);
                    self.flush_text();
                    self.pop();
                    Reprocess(InHead, TagToken(tag.clone()))
                }
                (StartTag, "head") | (StartTag, "noscript") | (EndTag, _) => {
                    self.unexpected(&tag);
                    Done
                }
                _ => {
                    self.unexpected(&tag);
                    self.flush_text();
                    self.pop();
                    Reprocess(InHead, TagToken(tag.clone()))
                }
            },
            token => {
                self.unexpected(&token);
                self.flush_text();
                self.pop();
                Reprocess(InHead, token)
            }
        }
    }

    //§ the-after-head-insertion-mode
    fn step_after_head(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "body") => {
                    self.insert_element_for(&tag);
                    self.frameset_ok = false;
                    self.mode = InBody;
                    Done
                }
                (StartTag, "frameset") => {
                    self.insert_element_for(&tag);
                    self.mode = InFrameset;
                    Done
                }
                (StartTag, "base")
                | (StartTag, "basefont")
                | (StartTag, "bgsound")
                | (StartTag, "link")
                | (StartTag, "meta") => {
                    // These belong in the head we already closed.
                    self.unexpected(&tag);
                    if let Some(head) = self.head_elem.clone() {
                        self.flush_text();
                        let elem = self.sink.create_element(tag.name.clone(), tag.attrs.clone());
                        self.sink.append(&head, super::AppendNode(elem));
                    }
                    DoneAckSelfClosing
                }
                (StartTag, "title") | (StartTag, "noframes") | (StartTag, "style")
                | (StartTag, "script") | (StartTag, "template") | (EndTag, "template") => {
                    self.unexpected(&tag);
                    self.step_in_head(TagToken(tag.clone()))
                }
                (EndTag, "body") | (EndTag, "html") | (EndTag, "br") => {
                    self.step_after_head_anything_else(TagToken(tag.clone()))
                }
                (StartTag, "head") | (EndTag, _) => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_after_head_anything_else(TagToken(tag.clone())),
            },
            token => self.step_after_head_anything_else(token),
        }
    }

    fn step_after_head_anything_else(&mut self, token: Token) -> ProcessResult {
        self.insert_phantom("body");
        Reprocess(InBody, token)
    }

    //§ parsing-main-inbody
    fn step_in_body(&mut self, token: Token) -> ProcessResult {
        match token {
            NullCharacterToken => {
                self.unexpected(&"null character");
                Done
            }
            CharacterTokens(_, text) => {
                self.reconstruct_formatting();
                if !Self::is_all_whitespace(&text) {
                    self.frameset_ok = false;
                }
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => {
                if !self.template_modes.is_empty() {
                    return self.step_in_template(EOFToken);
                }
                self.check_body_end();
                self.stop_parsing()
            }
            TagToken(tag) => match tag.kind {
                StartTag => self.step_in_body_start_tag(tag),
                EndTag => self.step_in_body_end_tag(tag),
            },
        }
    }

    fn step_in_body_start_tag(&mut self, tag: Tag) -> ProcessResult {
        match tag.name.as_ref() {
            "html" => {
                self.unexpected(&tag);
                let top = self.html_elem();
                self.sink.add_attrs_if_missing(&top, tag.attrs.clone());
                Done
            }

            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "title" | "template" => self.step_in_head(TagToken(tag.clone())),

            "body" => {
                self.unexpected(&tag);
                if self.open_elems.len() > 1 {
                    let body = self.open_elems[1].clone();
                    if self.sink.elem_name(&body).as_ref() == "body" {
                        self.frameset_ok = false;
                        self.sink.add_attrs_if_missing(&body, tag.attrs.clone());
                    }
                }
                Done
            }

            "frameset" => {
                self.unexpected(&tag);
                if self.frameset_ok && self.open_elems.len() > 1 {
                    let body = self.open_elems[1].clone();
                    if self.sink.elem_name(&body).as_ref() == "body" {
                        self.flush_text();
                        self.sink.remove_from_parent(&body);
                        self.open_elems.truncate(1);
                        self.insert_element_for(&tag);
                        self.mode = InFrameset;
                    }
                }
                Done
            }

            name if CLOSE_P_BLOCK.contains(name) => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(&tag);
                Done
            }

            name if HEADING.contains(name) => {
                self.close_p_element_in_button_scope();
                if HEADING.contains(self.current_node_name().as_ref()) {
                    self.unexpected(&tag);
                    self.flush_text();
                    self.pop();
                }
                self.insert_element_for(&tag);
                Done
            }

            "pre" | "listing" => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(&tag);
                self.ignore_lf = true;
                self.frameset_ok = false;
                Done
            }

            "form" => {
                if self.form_elem.is_some() {
                    self.unexpected(&tag);
                    return Done;
                }
                self.close_p_element_in_button_scope();
                let form = self.insert_element_for(&tag);
                self.form_elem = Some(form);
                Done
            }

            "li" | "dd" | "dt" => {
                self.frameset_ok = false;
                let close_list: &[&str] = if tag.name.as_ref() == "li" {
                    &["li"]
                } else {
                    &["dd", "dt"]
                };
                self.flush_text();
                for i in (0..self.open_elems.len()).rev() {
                    let node = self.open_elems[i].clone();
                    let name = self.sink.elem_name(&node);
                    if close_list.contains(&name.as_ref()) {
                        self.generate_implied_end_except(Some(name.as_ref()));
                        if !self.current_node_named(name.as_ref()) {
                            self.unexpected(&tag);
                        }
                        self.pop_until_named(name.as_ref());
                        break;
                    }
                    if SPECIAL.contains(name.as_ref())
                        && !matches!(name.as_ref(), "address" | "div" | "p")
                    {
                        break;
                    }
                }
                self.close_p_element_in_button_scope();
                self.insert_element_for(&tag);
                Done
            }

            "plaintext" => {
                self.close_p_element_in_button_scope();
                self.insert_element_for(&tag);
                self.next_tokenizer_state = Some(Plaintext);
                Done
            }

            "button" => {
                if self.in_scope_named(Scope::Default, "button") {
                    self.unexpected(&tag);
                    self.flush_text();
                    self.generate_implied_end_tags();
                    self.pop_until_named("button");
                }
                self.reconstruct_formatting();
                self.insert_element_for(&tag);
                self.frameset_ok = false;
                Done
            }

            "a" => {
                if self.formatting_element_position("a").is_some() {
                    self.unexpected(&tag);
                    if self.adoption_agency(&tag.name) {
                        // Anything left over is cleaned below.
                    }
                    if let Some((i, elem)) = self.formatting_element_position("a") {
                        self.active_formatting.remove(i);
                        self.remove_from_stack(&elem);
                    }
                }
                self.reconstruct_formatting();
                let elem = self.insert_element_for(&tag);
                self.push_formatting(elem, tag.name.clone(), tag.attrs.clone());
                Done
            }

            "b" | "big" | "code" | "em" | "font" | "i" | "s" | "small" | "strike" | "strong"
            | "tt" | "u" => {
                self.reconstruct_formatting();
                let elem = self.insert_element_for(&tag);
                self.push_formatting(elem, tag.name.clone(), tag.attrs.clone());
                Done
            }

            "nobr" => {
                self.reconstruct_formatting();
                if self.in_scope_named(Scope::Default, "nobr") {
                    self.unexpected(&tag);
                    self.adoption_agency(&tag.name);
                    self.reconstruct_formatting();
                }
                let elem = self.insert_element_for(&tag);
                self.push_formatting(elem, tag.name.clone(), tag.attrs.clone());
                Done
            }

            "applet" | "marquee" | "object" => {
                self.reconstruct_formatting();
                self.insert_element_for(&tag);
                self.push_formatting_marker();
                self.frameset_ok = false;
                Done
            }

            "table" => {
                if self.quirks_mode != super::Quirks {
                    self.close_p_element_in_button_scope();
                }
                self.insert_element_for(&tag);
                self.frameset_ok = false;
                self.mode = InTable;
                Done
            }

            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.reconstruct_formatting();
                self.insert_and_pop_element_for(&tag);
                self.frameset_ok = false;
                DoneAckSelfClosing
            }

            "input" => {
                self.reconstruct_formatting();
                self.insert_and_pop_element_for(&tag);
                let hidden = tag
                    .attrs
                    .iter()
                    .find(|a| a.name.as_ref() == "type")
                    .map_or(false, |a| a.value.eq_ignore_ascii_case("hidden"));
                if !hidden {
                    self.frameset_ok = false;
                }
                DoneAckSelfClosing
            }

            "param" | "source" | "track" => {
                self.insert_and_pop_element_for(&tag);
                DoneAckSelfClosing
            }

            "hr" => {
                self.close_p_element_in_button_scope();
                self.insert_and_pop_element_for(&tag);
                self.frameset_ok = false;
                DoneAckSelfClosing
            }

            "image" => {
                self.unexpected(&tag);
                let mut img = tag.clone();
                img.name = Atom::from("img");
                Reprocess(InBody, TagToken(img))
            }

            "textarea" => {
                self.ignore_lf = true;
                self.frameset_ok = false;
                self.parse_raw_data(&tag, RawKind::Rcdata);
                Done
            }

            "xmp" => {
                self.close_p_element_in_button_scope();
                self.reconstruct_formatting();
                self.frameset_ok = false;
                self.parse_raw_data(&tag, RawKind::Rawtext);
                Done
            }

            "iframe" => {
                self.frameset_ok = false;
                self.parse_raw_data(&tag, RawKind::Rawtext);
                Done
            }

            "noembed" => {
                self.parse_raw_data(&tag, RawKind::Rawtext);
                Done
            }

            "noscript" if self.opts.scripting_enabled => {
                self.parse_raw_data(&tag, RawKind::Rawtext);
                Done
            }

            "select" => {
                self.reconstruct_formatting();
                self.insert_element_for(&tag);
                self.frameset_ok = false;
                self.mode = match self.mode {
                    InTable | InCaption | InTableBody | InRow | InCell => InSelectInTable,
                    _ => InSelect,
                };
                Done
            }

            "optgroup" | "option" => {
                if self.current_node_named("option") {
                    self.flush_text();
                    self.pop();
                }
                self.reconstruct_formatting();
                self.insert_element_for(&tag);
                Done
            }

            "rb" | "rtc" => {
                if self.in_scope_named(Scope::Default, "ruby") {
                    self.flush_text();
                    self.generate_implied_end_tags();
                }
                self.insert_element_for(&tag);
                Done
            }

            "rp" | "rt" => {
                if self.in_scope_named(Scope::Default, "ruby") {
                    self.flush_text();
                    self.generate_implied_end_except(Some("rtc"));
                }
                self.insert_element_for(&tag);
                Done
            }

            // Foreign content is out of scope; keep the subtree as
            // ordinary elements.
            "math" | "svg" => {
                self.reconstruct_formatting();
                if tag.self_closing {
                    self.insert_and_pop_element_for(&tag);
                    DoneAckSelfClosing
                } else {
                    self.insert_element_for(&tag);
                    Done
                }
            }

            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                self.unexpected(&tag);
                Done
            }

            _ => {
                self.reconstruct_formatting();
                self.insert_element_for(&tag);
                Done
            }
        }
    }

    fn step_in_body_end_tag(&mut self, tag: Tag) -> ProcessResult {
        match tag.name.as_ref() {
            "body" => {
                if !self.in_scope_named(Scope::Default, "body") {
                    self.unexpected(&tag);
                    return Done;
                }
                self.check_body_end();
                self.flush_text();
                self.mode = AfterBody;
                Done
            }

            "html" => {
                if !self.in_scope_named(Scope::Default, "body") {
                    self.unexpected(&tag);
                    return Done;
                }
                self.check_body_end();
                self.flush_text();
                self.mode = AfterBody;
                Reprocess(AfterBody, TagToken(tag.clone()))
            }

            "address" | "article" | "aside" | "blockquote" | "button" | "center" | "details"
            | "dialog" | "dir" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
            | "footer" | "header" | "hgroup" | "listing" | "main" | "menu" | "nav" | "ol"
            | "pre" | "section" | "summary" | "ul" => {
                if !self.in_scope_named(Scope::Default, tag.name.as_ref()) {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_tags();
                if !self.current_node_named(tag.name.as_ref()) {
                    self.unexpected(&tag);
                }
                self.pop_until_named(tag.name.as_ref());
                Done
            }

            "form" => {
                let node = self.form_elem.take();
                let node = match node {
                    None => {
                        self.unexpected(&tag);
                        return Done;
                    }
                    Some(node) => node,
                };
                if !self.elem_in_default_scope(&node) {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_tags();
                if !self.sink.same_node(&node, &self.current_node()) {
                    self.unexpected(&tag);
                }
                self.remove_from_stack(&node);
                Done
            }

            "p" => {
                if !self.in_scope_named(Scope::Button, "p") {
                    self.unexpected(&tag);
                    self.insert_phantom("p");
                }
                self.flush_text();
                self.close_p_element();
                Done
            }

            "li" => {
                if !self.in_scope_named(Scope::ListItem, "li") {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_except(Some("li"));
                if !self.current_node_named("li") {
                    self.unexpected(&tag);
                }
                self.pop_until_named("li");
                Done
            }

            "dd" | "dt" => {
                if !self.in_scope_named(Scope::Default, tag.name.as_ref()) {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_except(Some(tag.name.as_ref()));
                if !self.current_node_named(tag.name.as_ref()) {
                    self.unexpected(&tag);
                }
                self.pop_until_named(tag.name.as_ref());
                Done
            }

            name if HEADING.contains(name) => {
                if !self.in_scope_any(Scope::Default, &HEADING) {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_tags();
                if !self.current_node_named(name) {
                    self.unexpected(&tag);
                }
                self.pop_until_one_of(&HEADING);
                Done
            }

            name if FORMATTING.contains(name) => {
                if !self.adoption_agency(&tag.name) {
                    self.flush_text();
                    self.any_other_end_tag(&tag.name);
                }
                Done
            }

            "applet" | "marquee" | "object" => {
                if !self.in_scope_named(Scope::Default, tag.name.as_ref()) {
                    self.unexpected(&tag);
                    return Done;
                }
                self.flush_text();
                self.generate_implied_end_tags();
                if !self.current_node_named(tag.name.as_ref()) {
                    self.unexpected(&tag);
                }
                self.pop_until_named(tag.name.as_ref());
                self.clear_active_formatting_to_marker();
                Done
            }

            "br" => {
                self.unexpected(&tag);
                self.reconstruct_formatting();
                self.insert_element(false, Atom::from("br"), vec![]);
                self.frameset_ok = false;
                Done
            }

            "template" => self.step_in_head(TagToken(tag.clone())),

            _ => {
                self.flush_text();
                self.any_other_end_tag(&tag.name);
                Done
            }
        }
    }

    /// On `</body>` or EOF, report any elements that should have been
    /// closed already.
    fn check_body_end(&mut self) {
        for elem in self.open_elems.clone() {
            let name = self.sink.elem_name(&elem);
            if !matches!(
                name.as_ref(),
                "dd" | "dt"
                    | "li"
                    | "optgroup"
                    | "option"
                    | "p"
                    | "rb"
                    | "rp"
                    | "rt"
                    | "rtc"
                    | "tbody"
                    | "td"
                    | "tfoot"
                    | "th"
                    | "thead"
                    | "tr"
                    | "body"
                    | "html"
            ) {
                self.sink
                    .parse_error(std::borrow::Cow::Borrowed("Unclosed element at end of body"));
                break;
            }
        }
    }

    //§ parsing-main-incdata
    fn step_text(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(_, text) => {
                self.append_text(&text);
                Done
            }
            NullCharacterToken => {
                // The tokenizer replaced it already in raw states.
                Done
            }
            EOFToken => {
                self.unexpected(&"EOF in text content");
                self.flush_text();
                self.pop();
                let mode = self.orig_mode.take().unwrap_or(InBody);
                Reprocess(mode, EOFToken)
            }
            TagToken(tag) => {
                // Any end tag here closes the raw text element.
                debug_assert!(tag.kind == EndTag);
                self.flush_text();
                self.pop();
                self.mode = self.orig_mode.take().unwrap_or(InBody);
                Done
            }
            CommentToken(_) => Done,
        }
    }

    //§ parsing-main-intable
    fn step_in_table(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => self.step_in_body(EOFToken),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "caption") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_CONTEXT);
                    self.push_formatting_marker();
                    self.insert_element_for(&tag);
                    self.mode = InCaption;
                    Done
                }
                (StartTag, "colgroup") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_CONTEXT);
                    self.insert_element_for(&tag);
                    self.mode = InColumnGroup;
                    Done
                }
                (StartTag, "col") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_CONTEXT);
                    self.insert_phantom("colgroup");
                    Reprocess(InColumnGroup, TagToken(tag.clone()))
                }
                (StartTag, "tbody") | (StartTag, "tfoot") | (StartTag, "thead") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_CONTEXT);
                    self.insert_element_for(&tag);
                    self.mode = InTableBody;
                    Done
                }
                (StartTag, "td") | (StartTag, "th") | (StartTag, "tr") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_CONTEXT);
                    self.insert_phantom("tbody");
                    Reprocess(InTableBody, TagToken(tag.clone()))
                }
                (StartTag, "table") => {
                    self.unexpected(&tag);
                    if !self.in_scope_named(Scope::Table, "table") {
                        return Done;
                    }
                    self.flush_text();
                    self.pop_until_named("table");
                    self.reset_insertion_mode();
                    Reprocess(self.mode, TagToken(tag.clone()))
                }
                (EndTag, "table") => {
                    if !self.in_scope_named(Scope::Table, "table") {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.pop_until_named("table");
                    self.reset_insertion_mode();
                    Done
                }
                (EndTag, "body") | (EndTag, "caption") | (EndTag, "col")
                | (EndTag, "colgroup") | (EndTag, "html") | (EndTag, "tbody")
                | (EndTag, "td") | (EndTag, "tfoot") | (EndTag, "th") | (EndTag, "thead")
                | (EndTag, "tr") => {
                    self.unexpected(&tag);
                    Done
                }
                (StartTag, "style") | (StartTag, "script") | (StartTag, "template")
                | (EndTag, "template") => self.step_in_head(TagToken(tag.clone())),
                (StartTag, "form") => {
                    self.unexpected(&tag);
                    if self.form_elem.is_none() {
                        let form = self.insert_element(false, tag.name.clone(), tag.attrs.clone());
                        self.form_elem = Some(form);
                    }
                    Done
                }
                _ => self.foster_parent_in_body(TagToken(tag.clone())),
            },
            token => self.foster_parent_in_body(token),
        }
    }

    fn foster_parent_in_body(&mut self, token: Token) -> ProcessResult {
        self.unexpected(&"token requires foster parenting");
        self.foster_parenting = true;
        let result = self.step_in_body(token);
        self.foster_parenting = false;
        result
    }

    //§ parsing-main-incaption
    fn step_in_caption(&mut self, token: Token) -> ProcessResult {
        match token {
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (EndTag, "caption") => {
                    self.close_caption(&tag);
                    Done
                }
                (StartTag, "caption") | (StartTag, "col") | (StartTag, "colgroup")
                | (StartTag, "tbody") | (StartTag, "td") | (StartTag, "tfoot")
                | (StartTag, "th") | (StartTag, "thead") | (StartTag, "tr")
                | (EndTag, "table") => {
                    if !self.in_scope_named(Scope::Table, "caption") {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.close_caption(&tag);
                    Reprocess(InTable, TagToken(tag.clone()))
                }
                (EndTag, "body") | (EndTag, "col") | (EndTag, "colgroup") | (EndTag, "html")
                | (EndTag, "tbody") | (EndTag, "td") | (EndTag, "tfoot") | (EndTag, "th")
                | (EndTag, "thead") | (EndTag, "tr") => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_in_body(TagToken(tag.clone())),
            },
            token => self.step_in_body(token),
        }
    }

    fn close_caption(&mut self, tag: &Tag) {
        if !self.in_scope_named(Scope::Table, "caption") {
            self.unexpected(tag);
            return;
        }
        self.flush_text();
        self.generate_implied_end_tags();
        if !self.current_node_named("caption") {
            self.unexpected(tag);
        }
        self.pop_until_named("caption");
        self.clear_active_formatting_to_marker();
        self.mode = InTable;
    }

    //§ parsing-main-incolgroup
    fn step_in_column_group(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => self.step_in_body(EOFToken),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "col") => {
                    self.insert_and_pop_element_for(&tag);
                    DoneAckSelfClosing
                }
                (EndTag, "colgroup") => {
                    if self.current_node_named("colgroup") {
                        self.flush_text();
                        self.pop();
                        self.mode = InTable;
                    } else {
                        self.unexpected(&tag);
                    }
                    Done
                }
                (EndTag, "col") => {
                    self.unexpected(&tag);
                    Done
                }
                (StartTag, "template") | (EndTag, "template") => {
                    self.step_in_head(TagToken(tag.clone()))
                }
                _ => self.step_in_column_group_anything_else(TagToken(tag.clone())),
            },
            token => self.step_in_column_group_anything_else(token),
        }
    }

    fn step_in_column_group_anything_else(&mut self, token: Token) -> ProcessResult {
        if self.current_node_named("colgroup") {
            self.flush_text();
            self.pop();
            Reprocess(InTable, token)
        } else {
            self.unexpected(&token);
            Done
        }
    }

    //§ parsing-main-intbody
    fn step_in_table_body(&mut self, token: Token) -> ProcessResult {
        match token {
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "tr") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_BODY_CONTEXT);
                    self.insert_element_for(&tag);
                    self.mode = InRow;
                    Done
                }
                (StartTag, "th") | (StartTag, "td") => {
                    self.unexpected(&tag);
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_BODY_CONTEXT);
                    self.insert_phantom("tr");
                    Reprocess(InRow, TagToken(tag.clone()))
                }
                (EndTag, "tbody") | (EndTag, "tfoot") | (EndTag, "thead") => {
                    if !self.in_scope_named(Scope::Table, tag.name.as_ref()) {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_BODY_CONTEXT);
                    self.pop();
                    self.mode = InTable;
                    Done
                }
                (StartTag, "caption") | (StartTag, "col") | (StartTag, "colgroup")
                | (StartTag, "tbody") | (StartTag, "tfoot") | (StartTag, "thead")
                | (EndTag, "table") => {
                    if !self.in_scope_any(Scope::Table, &TABLE_SECTIONS) {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_BODY_CONTEXT);
                    self.pop();
                    Reprocess(InTable, TagToken(tag.clone()))
                }
                (EndTag, "body") | (EndTag, "caption") | (EndTag, "col")
                | (EndTag, "colgroup") | (EndTag, "html") | (EndTag, "td") | (EndTag, "th")
                | (EndTag, "tr") => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_in_table(TagToken(tag.clone())),
            },
            token => self.step_in_table(token),
        }
    }

    //§ parsing-main-intr
    fn step_in_row(&mut self, token: Token) -> ProcessResult {
        match token {
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "th") | (StartTag, "td") => {
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_ROW_CONTEXT);
                    self.insert_element_for(&tag);
                    self.mode = InCell;
                    self.push_formatting_marker();
                    Done
                }
                (EndTag, "tr") => {
                    if !self.in_scope_named(Scope::Table, "tr") {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_ROW_CONTEXT);
                    self.pop();
                    self.mode = InTableBody;
                    Done
                }
                (StartTag, "caption") | (StartTag, "col") | (StartTag, "colgroup")
                | (StartTag, "tbody") | (StartTag, "tfoot") | (StartTag, "thead")
                | (StartTag, "tr") | (EndTag, "table") => {
                    if !self.in_scope_named(Scope::Table, "tr") {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_ROW_CONTEXT);
                    self.pop();
                    Reprocess(InTableBody, TagToken(tag.clone()))
                }
                (EndTag, "tbody") | (EndTag, "tfoot") | (EndTag, "thead") => {
                    if !self.in_scope_named(Scope::Table, tag.name.as_ref()) {
                        self.unexpected(&tag);
                        return Done;
                    }
                    if !self.in_scope_named(Scope::Table, "tr") {
                        return Done;
                    }
                    self.flush_text();
                    self.clear_stack_to_context(&TABLE_ROW_CONTEXT);
                    self.pop();
                    Reprocess(InTableBody, TagToken(tag.clone()))
                }
                (EndTag, "body") | (EndTag, "caption") | (EndTag, "col")
                | (EndTag, "colgroup") | (EndTag, "html") | (EndTag, "td") | (EndTag, "th") => {
                    self.unexpected(&tag);
                    Done
                }
                _ => self.step_in_table(TagToken(tag.clone())),
            },
            token => self.step_in_table(token),
        }
    }

    //§ parsing-main-intd
    fn step_in_cell(&mut self, token: Token) -> ProcessResult {
        match token {
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (EndTag, "td") | (EndTag, "th") => {
                    if !self.in_scope_named(Scope::Table, tag.name.as_ref()) {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.generate_implied_end_tags();
                    if !self.current_node_named(tag.name.as_ref()) {
                        self.unexpected(&tag);
                    }
                    self.pop_until_named(tag.name.as_ref());
                    self.clear_active_formatting_to_marker();
                    self.mode = InRow;
                    Done
                }
                (StartTag, "caption") | (StartTag, "col") | (StartTag, "colgroup")
                | (StartTag, "tbody") | (StartTag, "td") | (StartTag, "tfoot")
                | (StartTag, "th") | (StartTag, "thead") | (StartTag, "tr") => {
                    if !self.in_scope_named(Scope::Table, "td")
                        && !self.in_scope_named(Scope::Table, "th")
                    {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.close_the_cell();
                    Reprocess(InRow, TagToken(tag.clone()))
                }
                (EndTag, "body") | (EndTag, "caption") | (EndTag, "col")
                | (EndTag, "colgroup") | (EndTag, "html") => {
                    self.unexpected(&tag);
                    Done
                }
                (EndTag, "table") | (EndTag, "tbody") | (EndTag, "tfoot") | (EndTag, "thead")
                | (EndTag, "tr") => {
                    if !self.in_scope_named(Scope::Table, tag.name.as_ref()) {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.close_the_cell();
                    Reprocess(InRow, TagToken(tag.clone()))
                }
                _ => self.step_in_body(TagToken(tag.clone())),
            },
            token => self.step_in_body(token),
        }
    }

    //§ parsing-main-inselect
    fn step_in_select(&mut self, token: Token) -> ProcessResult {
        match token {
            NullCharacterToken => {
                self.unexpected(&"null character");
                Done
            }
            CharacterTokens(_, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => self.step_in_body(EOFToken),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "option") => {
                    if self.current_node_named("option") {
                        self.flush_text();
                        self.pop();
                    }
                    self.insert_element_for(&tag);
                    Done
                }
                (StartTag, "optgroup") => {
                    self.flush_text();
                    if self.current_node_named("option") {
                        self.pop();
                    }
                    if self.current_node_named("optgroup") {
                        self.pop();
                    }
                    self.insert_element_for(&tag);
                    Done
                }
                (EndTag, "optgroup") => {
                    self.flush_text();
                    if self.current_node_named("option")
                        && self.open_elems.len() >= 2
                        && self.sink.elem_name(&self.open_elems[self.open_elems.len() - 2]).as_ref()
                            == "optgroup"
                    {
                        self.pop();
                    }
                    if self.current_node_named("optgroup") {
                        self.pop();
                    } else {
                        self.unexpected(&tag);
                    }
                    Done
                }
                (EndTag, "option") => {
                    if self.current_node_named("option") {
                        self.flush_text();
                        self.pop();
                    } else {
                        self.unexpected(&tag);
                    }
                    Done
                }
                (EndTag, "select") => {
                    if !self.in_scope_named(Scope::Select, "select") {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.pop_until_named("select");
                    self.reset_insertion_mode();
                    Done
                }
                (StartTag, "select") => {
                    self.unexpected(&tag);
                    if self.in_scope_named(Scope::Select, "select") {
                        self.flush_text();
                        self.pop_until_named("select");
                        self.reset_insertion_mode();
                    }
                    Done
                }
                (StartTag, "input") | (StartTag, "keygen") | (StartTag, "textarea") => {
                    self.unexpected(&tag);
                    if !self.in_scope_named(Scope::Select, "select") {
                        return Done;
                    }
                    self.flush_text();
                    self.pop_until_named("select");
                    self.reset_insertion_mode();
                    Reprocess(self.mode, TagToken(tag.clone()))
                }
                (StartTag, "script") | (StartTag, "template") | (EndTag, "template") => {
                    self.step_in_head(TagToken(tag.clone()))
                }
                // In-select-in-table: table structure ends the select.
                (StartTag, "caption") | (StartTag, "table") | (StartTag, "tbody")
                | (StartTag, "tfoot") | (StartTag, "thead") | (StartTag, "tr")
                | (StartTag, "td") | (StartTag, "th") | (EndTag, "table") => {
                    self.unexpected(&tag);
                    if self.mode == InSelectInTable {
                        self.flush_text();
                        self.pop_until_named("select");
                        self.reset_insertion_mode();
                        return Reprocess(self.mode, TagToken(tag.clone()));
                    }
                    Done
                }
                _ => {
                    self.unexpected(&tag);
                    Done
                }
            },
        }
    }

    //§ parsing-main-intemplate
    fn step_in_template(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(..) | NullCharacterToken | CommentToken(_) => {
                self.step_in_body(token)
            }
            EOFToken => {
                if !self
                    .open_elems
                    .iter()
                    .any(|e| self.sink.elem_name(e).as_ref() == "template")
                {
                    return self.stop_parsing();
                }
                self.unexpected(&"EOF in template");
                self.flush_text();
                self.pop_until_named("template");
                self.clear_active_formatting_to_marker();
                self.template_modes.pop();
                self.reset_insertion_mode();
                Reprocess(self.mode, EOFToken)
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "base") | (StartTag, "basefont") | (StartTag, "bgsound")
                | (StartTag, "link") | (StartTag, "meta") | (StartTag, "noframes")
                | (StartTag, "script") | (StartTag, "style") | (StartTag, "template")
                | (StartTag, "title") | (EndTag, "template") => {
                    self.step_in_head(TagToken(tag.clone()))
                }
                _ => self.step_in_body(TagToken(tag.clone())),
            },
        }
    }

    //§ the-after-body-insertion-mode
    fn step_after_body(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => self.step_in_body(CharacterTokens(Whitespace, text)),
            CommentToken(text) => {
                self.insert_comment_to_html(text);
                Done
            }
            EOFToken => self.stop_parsing(),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (EndTag, "html") => {
                    self.mode = AfterAfterBody;
                    Done
                }
                _ => {
                    self.unexpected(&tag);
                    Reprocess(InBody, TagToken(tag.clone()))
                }
            },
            token => {
                self.unexpected(&token);
                Reprocess(InBody, token)
            }
        }
    }

    //§ parsing-main-inframeset
    fn step_in_frameset(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => {
                if self.open_elems.len() != 1 {
                    self.unexpected(&"EOF in frameset");
                }
                self.stop_parsing()
            }
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "frameset") => {
                    self.insert_element_for(&tag);
                    Done
                }
                (EndTag, "frameset") => {
                    if self.open_elems.len() == 1 {
                        self.unexpected(&tag);
                        return Done;
                    }
                    self.flush_text();
                    self.pop();
                    if !self.current_node_named("frameset") {
                        self.mode = AfterFrameset;
                    }
                    Done
                }
                (StartTag, "frame") => {
                    self.insert_and_pop_element_for(&tag);
                    DoneAckSelfClosing
                }
                (StartTag, "noframes") => self.step_in_head(TagToken(tag.clone())),
                _ => {
                    self.unexpected(&tag);
                    Done
                }
            },
            token => {
                self.unexpected(&token);
                Done
            }
        }
    }

    //§ the-after-frameset-insertion-mode
    fn step_after_frameset(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => {
                self.append_text(&text);
                Done
            }
            CommentToken(text) => {
                self.insert_comment(text);
                Done
            }
            EOFToken => self.stop_parsing(),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (EndTag, "html") => {
                    self.mode = AfterAfterFrameset;
                    Done
                }
                (StartTag, "noframes") => self.step_in_head(TagToken(tag.clone())),
                _ => {
                    self.unexpected(&tag);
                    Done
                }
            },
            token => {
                self.unexpected(&token);
                Done
            }
        }
    }

    //§ the-after-after-body-insertion-mode
    fn step_after_after_body(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => self.step_in_body(CharacterTokens(Whitespace, text)),
            CommentToken(text) => {
                self.insert_comment_to_doc(text);
                Done
            }
            EOFToken => self.stop_parsing(),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                _ => {
                    self.unexpected(&tag);
                    Reprocess(InBody, TagToken(tag.clone()))
                }
            },
            token => {
                self.unexpected(&token);
                Reprocess(InBody, token)
            }
        }
    }

    //§ the-after-after-frameset-insertion-mode
    fn step_after_after_frameset(&mut self, token: Token) -> ProcessResult {
        match token {
            CharacterTokens(NotSplit, text) => SplitWhitespace(text),
            CharacterTokens(Whitespace, text) => self.step_in_body(CharacterTokens(Whitespace, text)),
            CommentToken(text) => {
                self.insert_comment_to_doc(text);
                Done
            }
            EOFToken => self.stop_parsing(),
            TagToken(tag) => match (tag.kind, tag.name.as_ref()) {
                (StartTag, "html") => self.step_in_body(TagToken(tag.clone())),
                (StartTag, "noframes") => self.step_in_head(TagToken(tag.clone())),
                _ => {
                    self.unexpected(&tag);
                    Done
                }
            },
            token => {
                self.unexpected(&token);
                Done
            }
        }
    }
}
