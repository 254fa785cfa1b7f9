//! The HTML5 tree builder.

pub use self::interface::{AppendNode, AppendText, NodeOrText};
pub use self::interface::{LimitedQuirks, NoQuirks, Quirks, QuirksMode};
pub use self::interface::TreeSink;

use self::types::*;

use crate::tokenizer;
use crate::tokenizer::{Doctype, Tag, TokenSink};
use crate::util::str::{char_run, is_ascii_whitespace};
use crate::Atom;

use std::borrow::Cow;
use std::collections::VecDeque;
use std::mem::replace;

mod actions;
mod data;
mod interface;
mod rules;
pub mod tag_sets;
pub mod types;

/// An entry in the list of active formatting elements.
///
/// Element entries remember the tag name and attributes of the token
/// that created them, because reconstruction and the adoption agency
/// both need to make fresh copies.
pub(crate) enum FormatEntry<Handle> {
    Marker,
    Element(Handle, Atom, Vec<crate::tokenizer::Attribute>),
}

/// Tree builder options, with an impl for Default.
#[derive(Clone)]
pub struct TreeBuilderOpts {
    /// Report all parse errors described in the spec, at some
    /// performance penalty?  Default: false
    pub exact_errors: bool,

    /// Is scripting enabled?
    pub scripting_enabled: bool,

    /// Is this an `iframe srcdoc` document?
    pub iframe_srcdoc: bool,

    /// Should we drop the DOCTYPE (if any) from the tree?
    pub drop_doctype: bool,
}

impl Default for TreeBuilderOpts {
    fn default() -> TreeBuilderOpts {
        TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: true,
            iframe_srcdoc: false,
            drop_doctype: false,
        }
    }
}

/// The HTML tree builder.
pub struct TreeBuilder<'sink, Sink: TreeSink> {
    /// Options controlling the behavior of the tree builder.
    opts: TreeBuilderOpts,

    /// Consumer of tree modifications.
    sink: &'sink mut Sink,

    /// Insertion mode.
    mode: InsertionMode,

    /// Original insertion mode, used by the Text mode.
    orig_mode: Option<InsertionMode>,

    /// Stack of template insertion modes.
    template_modes: Vec<InsertionMode>,

    /// Quirks mode as set by the parser.
    quirks_mode: QuirksMode,

    /// The document node, which is created by the sink.
    doc_handle: Sink::Handle,

    /// Stack of open elements, most recently added at end.
    open_elems: Vec<Sink::Handle>,

    /// List of active formatting elements.
    active_formatting: Vec<FormatEntry<Sink::Handle>>,

    //§ the-element-pointers
    /// Head element pointer.
    head_elem: Option<Sink::Handle>,

    /// Form element pointer.
    form_elem: Option<Sink::Handle>,
    //§ END

    /// Next state change for the tokenizer, if any.
    next_tokenizer_state: Option<tokenizer::states::State>,

    /// Frameset-ok flag.
    frameset_ok: bool,

    /// Ignore a following U+000A LINE FEED?
    ignore_lf: bool,

    /// Is foster parenting enabled?
    foster_parenting: bool,

    /// Buffered character data, together with the element it will be
    /// flushed under.  The buffer is flushed whenever a non-character
    /// insertion happens, the target parent changes, or input ends, so
    /// each contiguous character run becomes exactly one text node.
    pending_text: String,
    pending_text_parent: Option<Sink::Handle>,
}

impl<'sink, Sink: TreeSink> TreeBuilder<'sink, Sink> {
    /// Create a new tree builder which sends tree modifications to a
    /// particular `TreeSink`.
    ///
    /// The tree builder is also a `TokenSink`.
    pub fn new(sink: &'sink mut Sink, opts: TreeBuilderOpts) -> TreeBuilder<'sink, Sink> {
        let doc_handle = sink.get_document();
        TreeBuilder {
            opts,
            sink,
            mode: Initial,
            orig_mode: None,
            template_modes: vec![],
            quirks_mode: NoQuirks,
            doc_handle,
            open_elems: vec![],
            active_formatting: vec![],
            head_elem: None,
            form_elem: None,
            next_tokenizer_state: None,
            frameset_ok: true,
            ignore_lf: false,
            foster_parenting: false,
            pending_text: String::new(),
            pending_text_parent: None,
        }
    }

    fn process_to_completion(&mut self, mut token: Token) {
        // Queue of additional tokens yet to be processed.
        // This stays empty in the common case where we don't split whitespace.
        let mut more_tokens = VecDeque::new();

        loop {
            let is_self_closing = matches!(&token, TagToken(Tag { self_closing: true, .. }));
            let mode = self.mode;
            match self.step(mode, token) {
                Done => {
                    if is_self_closing {
                        self.sink
                            .parse_error(Cow::Borrowed("Unacknowledged self-closing tag"));
                    }
                    token = match more_tokens.pop_front() {
                        None => return,
                        Some(t) => t,
                    };
                }
                DoneAckSelfClosing => {
                    token = match more_tokens.pop_front() {
                        None => return,
                        Some(t) => t,
                    };
                }
                Reprocess(m, t) => {
                    self.mode = m;
                    token = t;
                }
                SplitWhitespace(buf) => {
                    let (len, is_ws) = match char_run(is_ascii_whitespace, &buf) {
                        None => return,
                        Some(r) => r,
                    };

                    token = CharacterTokens(
                        if is_ws { Whitespace } else { NotWhitespace },
                        buf[..len].to_string(),
                    );

                    if len < buf.len() {
                        more_tokens.push_back(CharacterTokens(NotSplit, buf[len..].to_string()));
                    }
                }
            }
        }
    }
}

impl<'sink, Sink: TreeSink> TokenSink for TreeBuilder<'sink, Sink> {
    fn process_token(&mut self, token: tokenizer::Token) {
        let ignore_lf = replace(&mut self.ignore_lf, false);

        // Handle `ParseError` and `DoctypeToken`; convert everything
        // else to the local `Token` type.
        let token = match token {
            tokenizer::ParseError(e) => {
                self.sink.parse_error(e);
                return;
            }

            tokenizer::DoctypeToken(dt) => {
                if self.mode == Initial {
                    let (err, quirk) = data::doctype_error_and_quirks(&dt, self.opts.iframe_srcdoc);
                    if err {
                        self.sink.parse_error(if self.opts.exact_errors {
                            Cow::Owned(format!("Bad DOCTYPE: {:?}", dt))
                        } else {
                            Cow::Borrowed("Bad DOCTYPE")
                        });
                    }
                    let Doctype {
                        name,
                        public_id,
                        system_id,
                        force_quirks: _,
                    } = dt;
                    if !self.opts.drop_doctype {
                        self.sink.append_doctype_to_document(
                            name.unwrap_or_default(),
                            public_id.unwrap_or_default(),
                            system_id.unwrap_or_default(),
                        );
                    }
                    self.set_quirks_mode(quirk);

                    self.mode = BeforeHtml;
                } else {
                    self.sink.parse_error(if self.opts.exact_errors {
                        Cow::Owned(format!("DOCTYPE in insertion mode {:?}", self.mode))
                    } else {
                        Cow::Borrowed("DOCTYPE in body")
                    });
                }
                return;
            }

            tokenizer::TagToken(x) => TagToken(x),
            tokenizer::CommentToken(x) => CommentToken(x),
            tokenizer::NullCharacterToken => NullCharacterToken,
            tokenizer::EOFToken => EOFToken,

            tokenizer::CharacterTokens(mut x) => {
                if ignore_lf && x.starts_with('\n') {
                    x.remove(0);
                }
                if x.is_empty() {
                    return;
                }
                CharacterTokens(NotSplit, x)
            }
        };

        self.process_to_completion(token);
    }

    fn query_state_change(&mut self) -> Option<tokenizer::states::State> {
        self.next_tokenizer_state.take()
    }
}
