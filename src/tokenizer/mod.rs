//! The HTML5 tokenizer.

pub use self::interface::{Attribute, Doctype, Tag, TagKind};
pub use self::interface::{CharacterTokens, CommentToken, DoctypeToken, EOFToken};
pub use self::interface::{EndTag, StartTag};
pub use self::interface::{NullCharacterToken, ParseError, TagToken, Token};
pub use self::interface::TokenSink;

use self::buffer_queue::{BufferQueue, FromSet, NotFromSet, SetResult};
use self::char_ref::{CharRef, CharRefTokenizer};
use self::states::{DoubleQuoted, SingleQuoted, Unquoted};
use self::states::{Public, System};
use self::states::Rcdata;

use crate::util::smallcharset::small_char_set;
use crate::util::str::{lower_ascii, lower_ascii_letter};
use crate::Atom;

use std::borrow::Cow;
use std::mem::replace;

pub mod buffer_queue;
pub mod char_ref;
pub mod states;

mod interface;

/// Tokenizer options, with an impl for `Default`.
#[derive(Clone)]
pub struct TokenizerOpts {
    /// Report all parse errors described in the spec, at some
    /// performance penalty?  Default: false
    pub exact_errors: bool,

    /// Discard a `U+FEFF BYTE ORDER MARK` if we see one at the beginning
    /// of the stream?  Default: true
    pub discard_bom: bool,

    /// Recognize `<![CDATA[` sections?  Defaults to false, in which
    /// case the markup declaration becomes a bogus comment.
    pub allow_cdata: bool,

    /// Initial state override.  Only the test runner should use
    /// a non-`None` value!
    pub initial_state: Option<states::State>,

    /// Last start tag.  Only the test runner should use a
    /// non-`None` value!
    pub last_start_tag_name: Option<String>,
}

impl Default for TokenizerOpts {
    fn default() -> TokenizerOpts {
        TokenizerOpts {
            exact_errors: false,
            discard_bom: true,
            allow_cdata: false,
            initial_state: None,
            last_start_tag_name: None,
        }
    }
}

/// The HTML tokenizer.
pub struct Tokenizer<'sink, Sink> {
    /// Options controlling the behavior of the tokenizer.
    opts: TokenizerOpts,

    /// Destination for tokens we emit.
    sink: &'sink mut Sink,

    /// The abstract machine state as described in the spec.
    state: states::State,

    /// Input ready to be tokenized.
    input_buffers: BufferQueue,

    /// Are we at the end of the file, once buffers have been processed
    /// completely?  This affects whether we will wait for lookahead or not.
    at_eof: bool,

    /// If Some(n), the abstract machine needs n available characters
    /// to continue.
    wait_for: Option<usize>,

    /// Tokenizer for character references, if we're tokenizing
    /// one at the moment.
    char_ref_tokenizer: Option<Box<CharRefTokenizer>>,

    /// Current input character.  Just consumed, may reconsume.
    current_char: char,

    /// Should we reconsume the current input character?
    reconsume: bool,

    /// Did we just consume \r, translating it to \n?  In that case we need
    /// to ignore the next character if it's \n.
    ignore_lf: bool,

    /// Discard a U+FEFF BYTE ORDER MARK if we see one?  Only done at the
    /// beginning of the stream.
    discard_bom: bool,

    /// Current tag kind.
    current_tag_kind: TagKind,

    /// Current tag name.
    current_tag_name: String,

    /// Current tag is self-closing?
    current_tag_self_closing: bool,

    /// Current tag attributes.
    current_tag_attrs: Vec<Attribute>,

    /// Current attribute name.
    current_attr_name: String,

    /// Current attribute value.
    current_attr_value: String,

    /// Current comment.
    current_comment: String,

    /// Current doctype token.
    current_doctype: Doctype,

    /// Last start tag name, for use in checking "appropriate end tag".
    last_start_tag_name: Option<Atom>,

    /// The "temporary buffer" mentioned in the spec.
    temp_buf: String,
}

impl<'sink, Sink: TokenSink> Tokenizer<'sink, Sink> {
    /// Create a new tokenizer which feeds tokens to a particular `TokenSink`.
    pub fn new(sink: &'sink mut Sink, mut opts: TokenizerOpts) -> Tokenizer<'sink, Sink> {
        let start_tag_name = opts.last_start_tag_name.take().map(Atom::from);
        let state = opts.initial_state.unwrap_or(states::Data);
        let discard_bom = opts.discard_bom;
        Tokenizer {
            opts,
            sink,
            state,
            input_buffers: BufferQueue::new(),
            at_eof: false,
            wait_for: None,
            char_ref_tokenizer: None,
            current_char: '\0',
            reconsume: false,
            ignore_lf: false,
            discard_bom,
            current_tag_kind: StartTag,
            current_tag_name: String::new(),
            current_tag_self_closing: false,
            current_tag_attrs: vec![],
            current_attr_name: String::new(),
            current_attr_value: String::new(),
            current_comment: String::new(),
            current_doctype: Doctype::new(),
            last_start_tag_name: start_tag_name,
            temp_buf: String::new(),
        }
    }

    /// Feed an input string into the tokenizer.
    pub fn feed(&mut self, input: String) {
        if input.is_empty() {
            return;
        }

        let pos = if self.discard_bom && input.starts_with('\u{feff}') {
            self.discard_bom = false;
            3 // length of the BOM in UTF-8
        } else {
            0
        };

        self.input_buffers.push_back(input, pos);
        self.run();
    }

    fn process_token(&mut self, token: Token) {
        self.sink.process_token(token);
    }

    //§ preprocessing-the-input-stream
    // Get the next input character, which might be the character
    // 'c' that we already consumed from the buffers.
    fn get_preprocessed_char(&mut self, mut c: char) -> Option<char> {
        if self.ignore_lf {
            self.ignore_lf = false;
            if c == '\n' {
                c = self.input_buffers.next()?;
            }
        }

        if c == '\r' {
            self.ignore_lf = true;
            c = '\n';
        }

        if self.opts.exact_errors
            && match c as u32 {
                0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F | 0xFDD0..=0xFDEF => true,
                n if (n & 0xFFFE) == 0xFFFE => true,
                _ => false,
            }
        {
            self.emit_error(Cow::Owned(format!("Bad character {:?}", c)));
        }

        self.current_char = c;
        Some(c)
    }

    //§ tokenization
    // Get the next input character, if one is available.
    fn get_char(&mut self) -> Option<char> {
        if self.reconsume {
            self.reconsume = false;
            Some(self.current_char)
        } else {
            self.input_buffers
                .next()
                .and_then(|c| self.get_preprocessed_char(c))
        }
    }

    fn pop_except_from(
        &mut self,
        set: crate::util::smallcharset::SmallCharSet,
    ) -> Option<SetResult> {
        // Bail to the slow path for various corner cases.
        // This means that `FromSet` can contain characters not in the set!
        // It shouldn't matter because the fallback `FromSet` case should
        // always do the same thing as the `NotFromSet` case.
        if self.opts.exact_errors || self.reconsume || self.ignore_lf {
            return self.get_char().map(FromSet);
        }

        let d = self.input_buffers.pop_except_from(set);
        match d {
            Some(FromSet(c)) => self.get_preprocessed_char(c).map(FromSet),

            // NB: We don't set self.current_char for a run of characters not
            // in the set.  It shouldn't matter for the codepaths that use
            // this.
            _ => d,
        }
    }

    // If fewer than n characters are available, return None.
    // Otherwise check if they satisfy a predicate, and consume iff so.
    fn lookahead_and_consume(&mut self, n: usize, p: impl Fn(&str) -> bool) -> Option<bool> {
        match self.input_buffers.pop_front(n) {
            None if self.at_eof => Some(false),
            None => {
                self.wait_for = Some(n);
                None
            }
            Some(s) => {
                if p(&s) {
                    Some(true)
                } else {
                    self.unconsume(s);
                    Some(false)
                }
            }
        }
    }

    // Run the state machine for as long as we can.
    fn run(&mut self) {
        while self.step() {}
    }

    fn bad_char_error(&mut self) {
        let msg = if self.opts.exact_errors {
            Cow::Owned(format!(
                "Saw {:?} in state {:?}",
                self.current_char, self.state
            ))
        } else {
            Cow::Borrowed("Bad character")
        };
        self.emit_error(msg);
    }

    fn bad_eof_error(&mut self) {
        let msg = if self.opts.exact_errors {
            Cow::Owned(format!("Saw EOF in state {:?}", self.state))
        } else {
            Cow::Borrowed("Unexpected EOF")
        };
        self.emit_error(msg);
    }

    fn emit_char(&mut self, c: char) {
        self.process_token(match c {
            '\0' => NullCharacterToken,
            _ => CharacterTokens(c.to_string()),
        });
    }

    // The string must not contain '\0'!
    fn emit_chars(&mut self, b: String) {
        self.process_token(CharacterTokens(b));
    }

    fn emit_current_tag(&mut self) {
        self.finish_attribute();

        let name = Atom::from(replace(&mut self.current_tag_name, String::new()));

        match self.current_tag_kind {
            StartTag => {
                self.last_start_tag_name = Some(name.clone());
            }
            EndTag => {
                if !self.current_tag_attrs.is_empty() {
                    self.emit_error(Cow::Borrowed("Attributes on an end tag"));
                }
                if self.current_tag_self_closing {
                    self.emit_error(Cow::Borrowed("Self-closing end tag"));
                }
            }
        }

        let token = TagToken(Tag {
            kind: self.current_tag_kind,
            name,
            self_closing: self.current_tag_self_closing,
            attrs: replace(&mut self.current_tag_attrs, vec![]),
        });
        self.process_token(token);

        if self.current_tag_kind == StartTag {
            if let Some(s) = self.sink.query_state_change() {
                self.state = s;
            }
        }
    }

    fn emit_temp_buf(&mut self) {
        let buf = replace(&mut self.temp_buf, String::new());
        self.emit_chars(buf);
    }

    fn clear_temp_buf(&mut self) {
        // Do this without a new allocation.
        self.temp_buf.truncate(0);
    }

    fn emit_current_comment(&mut self) {
        let comment = replace(&mut self.current_comment, String::new());
        self.process_token(CommentToken(comment));
    }

    fn discard_tag(&mut self) {
        self.current_tag_name = String::new();
        self.current_tag_self_closing = false;
        self.current_tag_attrs = vec![];
    }

    fn create_tag(&mut self, kind: TagKind, c: char) {
        self.discard_tag();
        self.current_tag_name.push(c);
        self.current_tag_kind = kind;
    }

    fn have_appropriate_end_tag(&self) -> bool {
        match self.last_start_tag_name.as_ref() {
            Some(last) => {
                (self.current_tag_kind == EndTag) && (self.current_tag_name == last.as_ref())
            }
            None => false,
        }
    }

    fn create_attribute(&mut self, c: char) {
        self.finish_attribute();

        self.current_attr_name.push(c);
    }

    fn finish_attribute(&mut self) {
        if self.current_attr_name.is_empty() {
            return;
        }

        // Check for a duplicate attribute.
        // The spec has us err as soon as the name is finished; close enough.
        let dup = {
            let name = self.current_attr_name.as_str();
            self.current_tag_attrs
                .iter()
                .any(|a| a.name.as_ref() == name)
        };

        if dup {
            self.emit_error(Cow::Borrowed("Duplicate attribute"));
            self.current_attr_name.truncate(0);
            self.current_attr_value.truncate(0);
        } else {
            let name = Atom::from(replace(&mut self.current_attr_name, String::new()));
            self.current_tag_attrs.push(Attribute {
                name,
                value: replace(&mut self.current_attr_value, String::new()),
            });
        }
    }

    fn emit_current_doctype(&mut self) {
        let doctype = replace(&mut self.current_doctype, Doctype::new());
        self.process_token(DoctypeToken(doctype));
    }

    fn doctype_id(&mut self, kind: states::DoctypeIdKind) -> &mut Option<String> {
        match kind {
            Public => &mut self.current_doctype.public_id,
            System => &mut self.current_doctype.system_id,
        }
    }

    fn clear_doctype_id(&mut self, kind: states::DoctypeIdKind) {
        let id = self.doctype_id(kind);
        match id {
            Some(s) => s.truncate(0),
            None => *id = Some(String::new()),
        }
    }

    fn push_doctype_name(&mut self, c: char) {
        self.current_doctype
            .name
            .get_or_insert_with(String::new)
            .push(c);
    }

    fn push_doctype_id(&mut self, kind: states::DoctypeIdKind, c: char) {
        self.doctype_id(kind)
            .get_or_insert_with(String::new)
            .push(c);
    }

    fn consume_char_ref(&mut self, addnl_allowed: Option<char>) {
        // The char ref tokenizer assumes we have an additional allowed
        // character iff we're tokenizing in an attribute value.
        self.char_ref_tokenizer = Some(Box::new(CharRefTokenizer::new(addnl_allowed)));
    }

    fn emit_eof(&mut self) {
        self.process_token(EOFToken);
    }

    fn peek(&self) -> Option<char> {
        if self.reconsume {
            Some(self.current_char)
        } else {
            self.input_buffers.peek()
        }
    }

    fn discard_char(&mut self) {
        let c = self.get_char();
        assert!(c.is_some());
    }

    fn unconsume(&mut self, buf: String) {
        self.input_buffers.push_front(buf);
    }

    fn emit_error(&mut self, error: Cow<'static, str>) {
        self.process_token(ParseError(error));
    }
}
//§ END

// Shorthand for common state machine behaviors.
macro_rules! shorthand (
    ( $me:ident : emit $c:expr                     ) => ( $me.emit_char($c) );
    ( $me:ident : create_tag $kind:ident $c:expr   ) => ( $me.create_tag($kind, $c) );
    ( $me:ident : push_tag $c:expr                 ) => ( $me.current_tag_name.push($c) );
    ( $me:ident : discard_tag                      ) => ( $me.discard_tag() );
    ( $me:ident : push_temp $c:expr                ) => ( $me.temp_buf.push($c) );
    ( $me:ident : emit_temp                        ) => ( $me.emit_temp_buf() );
    ( $me:ident : clear_temp                       ) => ( $me.clear_temp_buf() );
    ( $me:ident : create_attr $c:expr              ) => ( $me.create_attribute($c) );
    ( $me:ident : push_name $c:expr                ) => ( $me.current_attr_name.push($c) );
    ( $me:ident : push_value $c:expr               ) => ( $me.current_attr_value.push($c) );
    ( $me:ident : append_value $c:expr             ) => ( $me.current_attr_value.push_str(&$c) );
    ( $me:ident : push_comment $c:expr             ) => ( $me.current_comment.push($c) );
    ( $me:ident : append_comment $c:expr           ) => ( $me.current_comment.push_str($c) );
    ( $me:ident : emit_comment                     ) => ( $me.emit_current_comment() );
    ( $me:ident : clear_comment                    ) => ( $me.current_comment.truncate(0) );
    ( $me:ident : create_doctype                   ) => ( $me.current_doctype = Doctype::new() );
    ( $me:ident : push_doctype_name $c:expr        ) => ( $me.push_doctype_name($c) );
    ( $me:ident : push_doctype_id $k:ident $c:expr ) => ( $me.push_doctype_id($k, $c) );
    ( $me:ident : clear_doctype_id $k:ident        ) => ( $me.clear_doctype_id($k) );
    ( $me:ident : force_quirks                     ) => ( $me.current_doctype.force_quirks = true );
    ( $me:ident : emit_doctype                     ) => ( $me.emit_current_doctype() );
    ( $me:ident : error                            ) => ( $me.bad_char_error() );
    ( $me:ident : error_eof                        ) => ( $me.bad_eof_error() );
);

// A little DSL for sequencing shorthand actions.
macro_rules! go (
    // A pattern like $($cmd:tt)* ; $($rest:tt)* causes parse ambiguity.
    // We have to tell the parser how much lookahead we need.

    ( $me:ident : $a:tt                   ; $($rest:tt)* ) => ({ shorthand!($me: $a);          go!($me: $($rest)*); });
    ( $me:ident : $a:tt $b:tt             ; $($rest:tt)* ) => ({ shorthand!($me: $a $b);       go!($me: $($rest)*); });
    ( $me:ident : $a:tt $b:tt $c:tt       ; $($rest:tt)* ) => ({ shorthand!($me: $a $b $c);    go!($me: $($rest)*); });

    // These can only come at the end.

    ( $me:ident : to $s:ident                   ) => ({ $me.state = states::$s; return true;           });
    ( $me:ident : to $s:ident $k1:expr          ) => ({ $me.state = states::$s($k1); return true;      });

    ( $me:ident : reconsume $s:ident            ) => ({ $me.reconsume = true; go!($me: to $s);         });
    ( $me:ident : reconsume $s:ident $k1:expr   ) => ({ $me.reconsume = true; go!($me: to $s $k1);     });

    ( $me:ident : consume_char_ref              ) => ({ $me.consume_char_ref(None); return true;         });
    ( $me:ident : consume_char_ref $addnl:expr  ) => ({ $me.consume_char_ref(Some($addnl)); return true; });

    // We have a default next state after emitting a tag, but the sink can override.
    ( $me:ident : emit_tag $s:ident ) => ({
        $me.state = states::$s;
        $me.emit_current_tag();
        return true;
    });

    ( $me:ident : eof ) => ({ $me.emit_eof(); return false; });

    // If nothing else matched, it's a single command
    ( $me:ident : $($cmd:tt)+ ) => ( shorthand!($me: $($cmd)+) );

    // or nothing.
    ( $me:ident : ) => (());
);

macro_rules! go_match ( ( $me:ident : $x:expr, $($pats:pat_param)|+ => $($cmds:tt)* ) => (
    match $x {
        $($pats)|+ => go!($me: $($cmds)*),
        _ => (),
    }
));

// This is a macro because it can cause early return
// from the function where it is used.
macro_rules! get_char ( ($me:expr) => (
    match $me.get_char() {
        None => return false,
        Some(c) => c,
    }
));

macro_rules! pop_except_from ( ($me:expr, $set:expr) => (
    match $me.pop_except_from($set) {
        None => return false,
        Some(r) => r,
    }
));

// NB: if you use this after get_char!(self) then the first char is still
// consumed no matter what!
macro_rules! lookahead_and_consume ( ($me:expr, $n:expr, $pred:expr) => (
    match $me.lookahead_and_consume($n, $pred) {
        // This counts as progress because we set the
        // wait_for variable.
        None => return true,
        Some(r) => r,
    }
));

impl<'sink, Sink: TokenSink> Tokenizer<'sink, Sink> {
    // Run the state machine for a while.
    // Return true if we should be immediately re-invoked
    // (this just simplifies control flow vs. break / continue).
    fn step(&mut self) -> bool {
        if self.char_ref_tokenizer.is_some() {
            return self.step_char_ref_tokenizer();
        }

        match self.wait_for {
            Some(n) if !self.input_buffers.has(n) => {
                return false;
            }
            Some(_) => {
                self.wait_for = None;
            }
            None => (),
        }

        match self.state {
            //§ data-state
            states::Data => loop {
                match pop_except_from!(self, small_char_set!('\r' '\0' '&' '<')) {
                    FromSet('\0') => go!(self: error; emit '\0'),
                    FromSet('&') => go!(self: consume_char_ref),
                    FromSet('<') => go!(self: to TagOpen),
                    FromSet(c) => go!(self: emit c),
                    NotFromSet(b) => self.emit_chars(b),
                }
            },

            //§ rcdata-state
            states::RawData(Rcdata) => loop {
                match pop_except_from!(self, small_char_set!('\r' '\0' '&' '<')) {
                    FromSet('\0') => go!(self: error; emit '\u{fffd}'),
                    FromSet('&') => go!(self: consume_char_ref),
                    FromSet('<') => go!(self: to RawLessThanSign Rcdata),
                    FromSet(c) => go!(self: emit c),
                    NotFromSet(b) => self.emit_chars(b),
                }
            },

            //§ rawtext-state script-data-state
            states::RawData(kind) => loop {
                match pop_except_from!(self, small_char_set!('\r' '\0' '<')) {
                    FromSet('\0') => go!(self: error; emit '\u{fffd}'),
                    FromSet('<') => go!(self: to RawLessThanSign kind),
                    FromSet(c) => go!(self: emit c),
                    NotFromSet(b) => self.emit_chars(b),
                }
            },

            //§ plaintext-state
            states::Plaintext => loop {
                match pop_except_from!(self, small_char_set!('\r' '\0')) {
                    FromSet('\0') => go!(self: error; emit '\u{fffd}'),
                    FromSet(c) => go!(self: emit c),
                    NotFromSet(b) => self.emit_chars(b),
                }
            },

            //§ tag-open-state
            states::TagOpen => loop {
                match get_char!(self) {
                    '!' => go!(self: to MarkupDeclarationOpen),
                    '/' => go!(self: to EndTagOpen),
                    '?' => go!(self: error; clear_comment; push_comment '?'; to BogusComment),
                    c => match lower_ascii_letter(c) {
                        Some(cl) => go!(self: create_tag StartTag cl; to TagName),
                        None => go!(self: error; emit '<'; reconsume Data),
                    },
                }
            },

            //§ end-tag-open-state
            states::EndTagOpen => loop {
                match get_char!(self) {
                    '>' => go!(self: error; to Data),
                    '\0' => {
                        go!(self: error; clear_comment; push_comment '\u{fffd}'; to BogusComment)
                    }
                    c => match lower_ascii_letter(c) {
                        Some(cl) => go!(self: create_tag EndTag cl; to TagName),
                        None => go!(self: error; clear_comment; push_comment c; to BogusComment),
                    },
                }
            },

            //§ tag-name-state
            states::TagName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                    '/' => go!(self: to SelfClosingStartTag),
                    '>' => go!(self: emit_tag Data),
                    '\0' => go!(self: error; push_tag '\u{fffd}'),
                    c => go!(self: push_tag (lower_ascii(c))),
                }
            },

            //§ rcdata-less-than-sign-state rawtext-less-than-sign-state script-data-less-than-sign-state
            states::RawLessThanSign(kind) => loop {
                match get_char!(self) {
                    '/' => go!(self: clear_temp; to RawEndTagOpen kind),
                    _ => go!(self: emit '<'; reconsume RawData kind),
                }
            },

            //§ rcdata-end-tag-open-state rawtext-end-tag-open-state script-data-end-tag-open-state
            states::RawEndTagOpen(kind) => loop {
                let c = get_char!(self);
                match lower_ascii_letter(c) {
                    Some(cl) => go!(self: create_tag EndTag cl; push_temp c; to RawEndTagName kind),
                    None => go!(self: emit '<'; emit '/'; reconsume RawData kind),
                }
            },

            //§ rcdata-end-tag-name-state rawtext-end-tag-name-state script-data-end-tag-name-state
            states::RawEndTagName(kind) => loop {
                let c = get_char!(self);
                if self.have_appropriate_end_tag() {
                    match c {
                        '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                        '/' => go!(self: to SelfClosingStartTag),
                        '>' => go!(self: emit_tag Data),
                        _ => (),
                    }
                }

                match lower_ascii_letter(c) {
                    Some(cl) => go!(self: push_tag cl; push_temp c),
                    None => {
                        go!(self: discard_tag; emit '<'; emit '/');
                        go!(self: emit_temp; reconsume RawData kind);
                    }
                }
            },

            //§ before-attribute-name-state
            states::BeforeAttributeName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '/' => go!(self: to SelfClosingStartTag),
                    '>' => go!(self: emit_tag Data),
                    '\0' => go!(self: error; create_attr '\u{fffd}'; to AttributeName),
                    c => match lower_ascii_letter(c) {
                        Some(cl) => go!(self: create_attr cl; to AttributeName),
                        None => {
                            go_match!(self: c, '"' | '\'' | '<' | '=' => error);
                            go!(self: create_attr c; to AttributeName);
                        }
                    },
                }
            },

            //§ attribute-name-state
            states::AttributeName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to AfterAttributeName),
                    '/' => go!(self: to SelfClosingStartTag),
                    '=' => go!(self: to BeforeAttributeValue),
                    '>' => go!(self: emit_tag Data),
                    '\0' => go!(self: error; push_name '\u{fffd}'),
                    c => match lower_ascii_letter(c) {
                        Some(cl) => go!(self: push_name cl),
                        None => {
                            go_match!(self: c, '"' | '\'' | '<' => error);
                            go!(self: push_name c);
                        }
                    },
                }
            },

            //§ after-attribute-name-state
            states::AfterAttributeName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '/' => go!(self: to SelfClosingStartTag),
                    '=' => go!(self: to BeforeAttributeValue),
                    '>' => go!(self: emit_tag Data),
                    '\0' => go!(self: error; create_attr '\u{fffd}'; to AttributeName),
                    c => match lower_ascii_letter(c) {
                        Some(cl) => go!(self: create_attr cl; to AttributeName),
                        None => {
                            go_match!(self: c, '"' | '\'' | '<' => error);
                            go!(self: create_attr c; to AttributeName);
                        }
                    },
                }
            },

            //§ before-attribute-value-state
            states::BeforeAttributeValue => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '"' => go!(self: to AttributeValue DoubleQuoted),
                    '&' => go!(self: reconsume AttributeValue Unquoted),
                    '\'' => go!(self: to AttributeValue SingleQuoted),
                    '\0' => go!(self: error; push_value '\u{fffd}'; to AttributeValue Unquoted),
                    '>' => go!(self: error; emit_tag Data),
                    c => {
                        go_match!(self: c, '<' | '=' | '`' => error);
                        go!(self: push_value c; to AttributeValue Unquoted);
                    }
                }
            },

            //§ attribute-value-double-quoted-state
            states::AttributeValue(DoubleQuoted) => loop {
                match pop_except_from!(self, small_char_set!('\r' '"' '&' '\0')) {
                    FromSet('"') => go!(self: to AfterAttributeValueQuoted),
                    FromSet('&') => go!(self: consume_char_ref '"'),
                    FromSet('\0') => go!(self: error; push_value '\u{fffd}'),
                    FromSet(c) => go!(self: push_value c),
                    NotFromSet(b) => go!(self: append_value b),
                }
            },

            //§ attribute-value-single-quoted-state
            states::AttributeValue(SingleQuoted) => loop {
                match pop_except_from!(self, small_char_set!('\r' '\'' '&' '\0')) {
                    FromSet('\'') => go!(self: to AfterAttributeValueQuoted),
                    FromSet('&') => go!(self: consume_char_ref '\''),
                    FromSet('\0') => go!(self: error; push_value '\u{fffd}'),
                    FromSet(c) => go!(self: push_value c),
                    NotFromSet(b) => go!(self: append_value b),
                }
            },

            //§ attribute-value-unquoted-state
            states::AttributeValue(Unquoted) => loop {
                match pop_except_from!(
                    self,
                    small_char_set!('\r' '\t' '\n' '\x0C' ' ' '&' '>' '\0')
                ) {
                    FromSet('\t') | FromSet('\n') | FromSet('\x0C') | FromSet(' ') => {
                        go!(self: to BeforeAttributeName)
                    }
                    FromSet('&') => go!(self: consume_char_ref '>'),
                    FromSet('>') => go!(self: emit_tag Data),
                    FromSet('\0') => go!(self: error; push_value '\u{fffd}'),
                    FromSet(c) => {
                        go_match!(self: c, '"' | '\'' | '<' | '=' | '`' => error);
                        go!(self: push_value c);
                    }
                    NotFromSet(b) => go!(self: append_value b),
                }
            },

            //§ after-attribute-value-quoted-state
            states::AfterAttributeValueQuoted => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeAttributeName),
                    '/' => go!(self: to SelfClosingStartTag),
                    '>' => go!(self: emit_tag Data),
                    _ => go!(self: error; reconsume BeforeAttributeName),
                }
            },

            //§ self-closing-start-tag-state
            states::SelfClosingStartTag => loop {
                match get_char!(self) {
                    '>' => {
                        self.current_tag_self_closing = true;
                        go!(self: emit_tag Data);
                    }
                    _ => go!(self: error; reconsume BeforeAttributeName),
                }
            },

            //§ comment-start-state
            states::CommentStart => loop {
                match get_char!(self) {
                    '-' => go!(self: to CommentStartDash),
                    '\0' => go!(self: error; push_comment '\u{fffd}'; to Comment),
                    '>' => go!(self: error; emit_comment; to Data),
                    c => go!(self: push_comment c; to Comment),
                }
            },

            //§ comment-start-dash-state
            states::CommentStartDash => loop {
                match get_char!(self) {
                    '-' => go!(self: to CommentEnd),
                    '\0' => go!(self: error; append_comment "-\u{fffd}"; to Comment),
                    '>' => go!(self: error; emit_comment; to Data),
                    c => go!(self: push_comment '-'; push_comment c; to Comment),
                }
            },

            //§ comment-state
            states::Comment => loop {
                match get_char!(self) {
                    '<' => go!(self: push_comment '<'; to CommentLessThanSign),
                    '-' => go!(self: to CommentEndDash),
                    '\0' => go!(self: error; push_comment '\u{fffd}'),
                    c => go!(self: push_comment c),
                }
            },

            //§ comment-less-than-sign-state
            states::CommentLessThanSign => loop {
                match get_char!(self) {
                    '!' => go!(self: push_comment '!'; to CommentLessThanSignBang),
                    '<' => go!(self: push_comment '<'),
                    _ => go!(self: reconsume Comment),
                }
            },

            //§ comment-less-than-sign-bang-state
            states::CommentLessThanSignBang => loop {
                match get_char!(self) {
                    '-' => go!(self: to CommentLessThanSignBangDash),
                    _ => go!(self: reconsume Comment),
                }
            },

            //§ comment-less-than-sign-bang-dash-state
            states::CommentLessThanSignBangDash => loop {
                match get_char!(self) {
                    '-' => go!(self: to CommentLessThanSignBangDashDash),
                    _ => go!(self: reconsume CommentEndDash),
                }
            },

            //§ comment-less-than-sign-bang-dash-dash-state
            states::CommentLessThanSignBangDashDash => loop {
                match get_char!(self) {
                    '>' => go!(self: reconsume CommentEnd),
                    _ => go!(self: error; reconsume CommentEnd),
                }
            },

            //§ comment-end-dash-state
            states::CommentEndDash => loop {
                match get_char!(self) {
                    '-' => go!(self: to CommentEnd),
                    '\0' => go!(self: error; append_comment "-\u{fffd}"; to Comment),
                    c => go!(self: push_comment '-'; push_comment c; to Comment),
                }
            },

            //§ comment-end-state
            states::CommentEnd => loop {
                match get_char!(self) {
                    '>' => go!(self: emit_comment; to Data),
                    '\0' => go!(self: error; append_comment "--\u{fffd}"; to Comment),
                    '!' => go!(self: error; to CommentEndBang),
                    '-' => go!(self: error; push_comment '-'),
                    c => go!(self: error; append_comment "--"; push_comment c; to Comment),
                }
            },

            //§ comment-end-bang-state
            states::CommentEndBang => loop {
                match get_char!(self) {
                    '-' => go!(self: append_comment "--!"; to CommentEndDash),
                    '>' => go!(self: emit_comment; to Data),
                    '\0' => go!(self: error; append_comment "--!\u{fffd}"; to Comment),
                    c => go!(self: append_comment "--!"; push_comment c; to Comment),
                }
            },

            //§ doctype-state
            states::Doctype => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeDoctypeName),
                    _ => go!(self: error; reconsume BeforeDoctypeName),
                }
            },

            //§ before-doctype-name-state
            states::BeforeDoctypeName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '\0' => {
                        go!(self: error; create_doctype; push_doctype_name '\u{fffd}'; to DoctypeName)
                    }
                    '>' => go!(self: error; create_doctype; force_quirks; emit_doctype; to Data),
                    c => {
                        go!(self: create_doctype; push_doctype_name (lower_ascii(c)); to DoctypeName)
                    }
                }
            },

            //§ doctype-name-state
            states::DoctypeName => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to AfterDoctypeName),
                    '>' => go!(self: emit_doctype; to Data),
                    '\0' => go!(self: error; push_doctype_name '\u{fffd}'),
                    c => go!(self: push_doctype_name (lower_ascii(c))),
                }
            },

            //§ after-doctype-name-state
            states::AfterDoctypeName => loop {
                if lookahead_and_consume!(self, 6, |s| s.eq_ignore_ascii_case("public")) {
                    go!(self: to AfterDoctypeKeyword Public);
                } else if lookahead_and_consume!(self, 6, |s| s.eq_ignore_ascii_case("system")) {
                    go!(self: to AfterDoctypeKeyword System);
                } else {
                    match get_char!(self) {
                        '\t' | '\n' | '\x0C' | ' ' => (),
                        '>' => go!(self: emit_doctype; to Data),
                        _ => go!(self: error; force_quirks; to BogusDoctype),
                    }
                }
            },

            //§ after-doctype-public-keyword-state after-doctype-system-keyword-state
            states::AfterDoctypeKeyword(kind) => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => go!(self: to BeforeDoctypeIdentifier kind),
                    '"' => {
                        go!(self: error; clear_doctype_id kind; to DoctypeIdentifierDoubleQuoted kind)
                    }
                    '\'' => {
                        go!(self: error; clear_doctype_id kind; to DoctypeIdentifierSingleQuoted kind)
                    }
                    '>' => go!(self: error; force_quirks; emit_doctype; to Data),
                    _ => go!(self: error; force_quirks; to BogusDoctype),
                }
            },

            //§ before-doctype-public-identifier-state before-doctype-system-identifier-state
            states::BeforeDoctypeIdentifier(kind) => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '"' => go!(self: clear_doctype_id kind; to DoctypeIdentifierDoubleQuoted kind),
                    '\'' => go!(self: clear_doctype_id kind; to DoctypeIdentifierSingleQuoted kind),
                    '>' => go!(self: error; force_quirks; emit_doctype; to Data),
                    _ => go!(self: error; force_quirks; to BogusDoctype),
                }
            },

            //§ doctype-public-identifier-double-quoted-state doctype-system-identifier-double-quoted-state
            states::DoctypeIdentifierDoubleQuoted(kind) => loop {
                match get_char!(self) {
                    '"' => go!(self: to AfterDoctypeIdentifier kind),
                    '\0' => go!(self: error; push_doctype_id kind '\u{fffd}'),
                    '>' => go!(self: error; force_quirks; emit_doctype; to Data),
                    c => go!(self: push_doctype_id kind c),
                }
            },

            //§ doctype-public-identifier-single-quoted-state doctype-system-identifier-single-quoted-state
            states::DoctypeIdentifierSingleQuoted(kind) => loop {
                match get_char!(self) {
                    '\'' => go!(self: to AfterDoctypeIdentifier kind),
                    '\0' => go!(self: error; push_doctype_id kind '\u{fffd}'),
                    '>' => go!(self: error; force_quirks; emit_doctype; to Data),
                    c => go!(self: push_doctype_id kind c),
                }
            },

            //§ after-doctype-public-identifier-state
            states::AfterDoctypeIdentifier(Public) => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => {
                        go!(self: to BetweenDoctypePublicAndSystemIdentifiers)
                    }
                    '>' => go!(self: emit_doctype; to Data),
                    '"' => {
                        go!(self: error; clear_doctype_id System; to DoctypeIdentifierDoubleQuoted System)
                    }
                    '\'' => {
                        go!(self: error; clear_doctype_id System; to DoctypeIdentifierSingleQuoted System)
                    }
                    _ => go!(self: error; force_quirks; to BogusDoctype),
                }
            },

            //§ after-doctype-system-identifier-state
            states::AfterDoctypeIdentifier(System) => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '>' => go!(self: emit_doctype; to Data),
                    _ => go!(self: error; to BogusDoctype),
                }
            },

            //§ between-doctype-public-and-system-identifiers-state
            states::BetweenDoctypePublicAndSystemIdentifiers => loop {
                match get_char!(self) {
                    '\t' | '\n' | '\x0C' | ' ' => (),
                    '>' => go!(self: emit_doctype; to Data),
                    '"' => {
                        go!(self: clear_doctype_id System; to DoctypeIdentifierDoubleQuoted System)
                    }
                    '\'' => {
                        go!(self: clear_doctype_id System; to DoctypeIdentifierSingleQuoted System)
                    }
                    _ => go!(self: error; force_quirks; to BogusDoctype),
                }
            },

            //§ bogus-doctype-state
            states::BogusDoctype => loop {
                match get_char!(self) {
                    '>' => go!(self: emit_doctype; to Data),
                    _ => (),
                }
            },

            //§ bogus-comment-state
            states::BogusComment => loop {
                match get_char!(self) {
                    '>' => go!(self: emit_comment; to Data),
                    '\0' => go!(self: error; push_comment '\u{fffd}'),
                    c => go!(self: push_comment c),
                }
            },

            //§ markup-declaration-open-state
            states::MarkupDeclarationOpen => loop {
                if lookahead_and_consume!(self, 2, |s| s == "--") {
                    go!(self: clear_comment; to CommentStart);
                } else if lookahead_and_consume!(self, 7, |s| s.eq_ignore_ascii_case("doctype")) {
                    go!(self: to Doctype);
                } else if self.opts.allow_cdata
                    && lookahead_and_consume!(self, 7, |s| s == "[CDATA[")
                {
                    go!(self: to CdataSection);
                } else {
                    go!(self: error; clear_comment; to BogusComment);
                }
            },

            //§ cdata-section-state
            states::CdataSection => loop {
                match get_char!(self) {
                    ']' => go!(self: to CdataSectionBracket),
                    '\0' => go!(self: error; emit '\u{fffd}'),
                    c => go!(self: emit c),
                }
            },

            //§ cdata-section-bracket-state
            states::CdataSectionBracket => loop {
                match get_char!(self) {
                    ']' => go!(self: to CdataSectionEnd),
                    _ => go!(self: emit ']'; reconsume CdataSection),
                }
            },

            //§ cdata-section-end-state
            states::CdataSectionEnd => loop {
                match get_char!(self) {
                    ']' => go!(self: emit ']'),
                    '>' => go!(self: to Data),
                    _ => {
                        go!(self: emit ']'; emit ']');
                        go!(self: reconsume CdataSection);
                    }
                }
            },
            //§ END
        }
    }

    fn step_char_ref_tokenizer(&mut self) -> bool {
        let mut tok = self
            .char_ref_tokenizer
            .take()
            .expect("no char ref tokenizer");
        let outcome = tok.step(self);

        let progress = match outcome {
            char_ref::Done => {
                self.process_char_ref(tok.get_result());
                return true;
            }

            char_ref::Stuck => false,
            char_ref::Progress => true,
        };

        self.char_ref_tokenizer = Some(tok);
        progress
    }

    fn process_char_ref(&mut self, char_ref: CharRef) {
        let CharRef {
            mut chars,
            mut num_chars,
        } = char_ref;

        if num_chars == 0 {
            chars[0] = '&';
            num_chars = 1;
        }

        for i in 0..num_chars {
            let c = chars[i as usize];
            match self.state {
                states::Data | states::RawData(Rcdata) => go!(self: emit c),
                states::AttributeValue(_) => go!(self: push_value c),
                _ => panic!(
                    "state {:?} should not be reachable in process_char_ref",
                    self.state
                ),
            }
        }
    }

    /// Indicate that we have reached the end of the input.
    pub fn end(&mut self) {
        // Handle EOF in the char ref sub-tokenizer, if there is one.
        // Do this first because it might un-consume stuff.
        if let Some(mut tok) = self.char_ref_tokenizer.take() {
            tok.end_of_file(self);
            self.process_char_ref(tok.get_result());
        }

        // Process all remaining buffered input.
        // If we're waiting for lookahead, we're not gonna get it.
        self.wait_for = None;
        self.at_eof = true;
        self.run();

        while self.eof_step() {
            // loop
        }
    }

    fn eof_step(&mut self) -> bool {
        match self.state {
            states::Data | states::RawData(_) | states::Plaintext => go!(self: eof),

            // The current token, if any, is emitted at EOF; a partial
            // tag still reaches the tree builder.
            states::TagName
            | states::BeforeAttributeName
            | states::AttributeName
            | states::AfterAttributeName
            | states::BeforeAttributeValue
            | states::AttributeValue(_)
            | states::AfterAttributeValueQuoted
            | states::SelfClosingStartTag => go!(self: error_eof; emit_tag Data),

            states::TagOpen => go!(self: error_eof; emit '<'; to Data),

            states::EndTagOpen => go!(self: error_eof; emit '<'; emit '/'; to Data),

            states::RawLessThanSign(kind) => go!(self: emit '<'; to RawData kind),

            states::RawEndTagOpen(kind) => go!(self: emit '<'; emit '/'; to RawData kind),

            states::RawEndTagName(kind) => {
                go!(self: emit '<'; emit '/'; emit_temp);
                go!(self: to RawData kind);
            }

            states::CommentStart
            | states::CommentStartDash
            | states::Comment
            | states::CommentLessThanSign
            | states::CommentLessThanSignBang
            | states::CommentLessThanSignBangDash
            | states::CommentLessThanSignBangDashDash
            | states::CommentEndDash
            | states::CommentEnd
            | states::CommentEndBang => go!(self: error_eof; emit_comment; to Data),

            states::Doctype | states::BeforeDoctypeName => {
                go!(self: error_eof; create_doctype; force_quirks; emit_doctype; to Data)
            }

            states::DoctypeName
            | states::AfterDoctypeName
            | states::AfterDoctypeKeyword(_)
            | states::BeforeDoctypeIdentifier(_)
            | states::DoctypeIdentifierDoubleQuoted(_)
            | states::DoctypeIdentifierSingleQuoted(_)
            | states::AfterDoctypeIdentifier(_)
            | states::BetweenDoctypePublicAndSystemIdentifiers => {
                go!(self: error_eof; force_quirks; emit_doctype; to Data)
            }

            states::BogusDoctype => go!(self: emit_doctype; to Data),

            states::BogusComment => go!(self: emit_comment; to Data),

            states::MarkupDeclarationOpen => go!(self: error; clear_comment; to BogusComment),

            states::CdataSection => go!(self: error_eof; to Data),

            states::CdataSectionBracket => go!(self: emit ']'; to CdataSection),

            states::CdataSectionEnd => {
                go!(self: emit ']'; emit ']');
                go!(self: to CdataSection);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::states;
    use super::{CharacterTokens, CommentToken, DoctypeToken, EOFToken, ParseError, TagToken};
    use super::{StartTag, Token, TokenSink, Tokenizer, TokenizerOpts};

    struct Accumulator {
        tokens: Vec<Token>,
    }

    impl TokenSink for Accumulator {
        fn process_token(&mut self, token: Token) {
            match token {
                ParseError(_) => (),
                t => self.tokens.push(t),
            }
        }
    }

    fn tokenize(input: &str) -> Vec<Token> {
        tokenize_opts(input, TokenizerOpts::default())
    }

    fn tokenize_opts(input: &str, opts: TokenizerOpts) -> Vec<Token> {
        let mut sink = Accumulator { tokens: vec![] };
        {
            let mut tok = Tokenizer::new(&mut sink, opts);
            tok.feed(input.to_string());
            tok.end();
        }
        // Collapse adjacent character tokens for easier assertions.
        let mut out: Vec<Token> = vec![];
        for t in sink.tokens {
            match (out.last_mut(), t) {
                (Some(CharacterTokens(prev)), CharacterTokens(next)) => prev.push_str(&next),
                (_, t) => out.push(t),
            }
        }
        out
    }

    fn chars(s: &str) -> Token {
        CharacterTokens(s.to_string())
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(tokenize("hello"), vec![chars("hello"), EOFToken]);
    }

    #[test]
    fn tag_names_and_attrs_are_lowercased() {
        let tokens = tokenize("<DIV Class=Box>");
        match &tokens[0] {
            TagToken(tag) => {
                assert_eq!(tag.kind, StartTag);
                assert_eq!(tag.name.as_ref(), "div");
                assert_eq!(tag.attrs.len(), 1);
                assert_eq!(tag.attrs[0].name.as_ref(), "class");
                assert_eq!(tag.attrs[0].value, "Box");
            }
            t => panic!("expected tag, got {:?}", t),
        }
    }

    #[test]
    fn duplicate_attribute_keeps_first() {
        let tokens = tokenize("<a href=one href=two>");
        match &tokens[0] {
            TagToken(tag) => {
                assert_eq!(tag.attrs.len(), 1);
                assert_eq!(tag.attrs[0].value, "one");
            }
            t => panic!("expected tag, got {:?}", t),
        }
    }

    #[test]
    fn named_reference_decodes() {
        assert_eq!(tokenize("a&amp;b"), vec![chars("a&b"), EOFToken]);
    }

    #[test]
    fn bare_ampersand_is_literal() {
        assert_eq!(
            tokenize("fish & chips"),
            vec![chars("fish & chips"), EOFToken]
        );
        assert_eq!(tokenize("&nosuch;"), vec![chars("&nosuch;"), EOFToken]);
    }

    #[test]
    fn numeric_references() {
        assert_eq!(tokenize("&#65;&#x42;"), vec![chars("AB"), EOFToken]);
        // Windows-1252 fixup and surrogate replacement.
        assert_eq!(tokenize("&#x80;"), vec![chars("\u{20ac}"), EOFToken]);
        assert_eq!(tokenize("&#xD800;"), vec![chars("\u{fffd}"), EOFToken]);
        assert_eq!(tokenize("&#x110000;"), vec![chars("\u{fffd}"), EOFToken]);
    }

    #[test]
    fn comment_token() {
        assert_eq!(
            tokenize("<!-- hi -->"),
            vec![CommentToken(" hi ".to_string()), EOFToken]
        );
    }

    #[test]
    fn eof_in_comment_still_emits() {
        assert_eq!(
            tokenize("<!--abc"),
            vec![CommentToken("abc".to_string()), EOFToken]
        );
    }

    #[test]
    fn doctype_name() {
        match &tokenize("<!DOCTYPE HTML>")[0] {
            DoctypeToken(dt) => {
                assert_eq!(dt.name.as_deref(), Some("html"));
                assert!(!dt.force_quirks);
            }
            t => panic!("expected doctype, got {:?}", t),
        }
    }

    #[test]
    fn null_is_replaced_in_rawtext() {
        let opts = TokenizerOpts {
            initial_state: Some(states::RawData(states::Rawtext)),
            last_start_tag_name: Some("style".to_string()),
            ..Default::default()
        };
        let tokens = tokenize_opts("a\0b</style>", opts);
        assert_eq!(tokens[0], chars("a\u{fffd}b"));
    }

    #[test]
    fn rcdata_end_tag_must_be_appropriate() {
        let opts = TokenizerOpts {
            initial_state: Some(states::RawData(states::Rcdata)),
            last_start_tag_name: Some("title".to_string()),
            ..Default::default()
        };
        let tokens = tokenize_opts("x</div>y</title>", opts);
        assert_eq!(tokens[0], chars("x</div>y"));
        assert!(matches!(tokens[1], TagToken(_)));
    }

    #[test]
    fn cdata_section_when_enabled() {
        let opts = TokenizerOpts {
            allow_cdata: true,
            ..Default::default()
        };
        let tokens = tokenize_opts("<![CDATA[x<y]]>", opts);
        assert_eq!(tokens[0], chars("x<y"));
    }
}
