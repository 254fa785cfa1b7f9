//! Types used by the tree builder.

use crate::tokenizer::Tag;

pub use self::InsertionMode::*;
pub use self::ProcessResult::{Done, DoneAckSelfClosing, Reprocess, SplitWhitespace};
pub use self::SplitStatus::{NotSplit, NotWhitespace, Whitespace};
pub use self::Token::{CharacterTokens, CommentToken, EOFToken, NullCharacterToken, TagToken};

/// The insertion modes defined by the tree construction spec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertionMode {
    Initial,
    BeforeHtml,
    BeforeHead,
    InHead,
    InHeadNoscript,
    AfterHead,
    InBody,
    Text,
    InTable,
    InTableText,
    InCaption,
    InColumnGroup,
    InTableBody,
    InRow,
    InCell,
    InSelect,
    InSelectInTable,
    InTemplate,
    AfterBody,
    InFrameset,
    AfterFrameset,
    AfterAfterBody,
    AfterAfterFrameset,
}

/// Whether a character run has been split into whitespace and
/// non-whitespace chunks yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitStatus {
    NotSplit,
    Whitespace,
    NotWhitespace,
}

/// The tree builder's view of a token, after doctypes and parse
/// errors are intercepted.
#[derive(Debug)]
pub enum Token {
    TagToken(Tag),
    CommentToken(String),
    CharacterTokens(SplitStatus, String),
    NullCharacterToken,
    EOFToken,
}

/// What one step of token processing decided.
pub enum ProcessResult {
    Done,
    DoneAckSelfClosing,
    SplitWhitespace(String),
    Reprocess(InsertionMode, Token),
}
