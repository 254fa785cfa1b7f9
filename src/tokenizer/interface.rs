use std::borrow::Cow;

use crate::Atom;

use super::states;

pub use self::TagKind::{EndTag, StartTag};
pub use self::Token::{
    CharacterTokens, CommentToken, DoctypeToken, EOFToken, NullCharacterToken, ParseError,
    TagToken,
};

/// A `DOCTYPE` token.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Doctype {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub force_quirks: bool,
}

impl Doctype {
    pub fn new() -> Doctype {
        Doctype::default()
    }
}

/// A tag attribute.  The name is interned and lowercased by the
/// tokenizer; the value is an ordinary content string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: Atom,
    pub value: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TagKind {
    StartTag,
    EndTag,
}

/// A tag token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub name: Atom,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    DoctypeToken(Doctype),
    TagToken(Tag),
    CommentToken(String),
    CharacterTokens(String),
    NullCharacterToken,
    EOFToken,
    ParseError(Cow<'static, str>),
}

/// Types which can receive tokens from the tokenizer.
pub trait TokenSink {
    /// Process a token.
    fn process_token(&mut self, token: Token);

    /// The tokenizer will call this after emitting any start tag.
    /// This allows the tree builder to change the tokenizer's state
    /// for things like `<title>` and `<script>`.
    fn query_state_change(&mut self) -> Option<states::State> {
        None
    }
}
