//! Tokenizer states.
//!
//! This is public for use by the tree builder, which sets the
//! tokenizer into raw-text states after certain start tags.

pub use self::AttrValueKind::{DoubleQuoted, SingleQuoted, Unquoted};
pub use self::DoctypeIdKind::{Public, System};
pub use self::RawKind::{Rawtext, Rcdata, ScriptData};
pub use self::State::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DoctypeIdKind {
    Public,
    System,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RawKind {
    Rcdata,
    Rawtext,
    ScriptData,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AttrValueKind {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

/// States for the tokenizer state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum State {
    Data,
    Plaintext,
    TagOpen,
    EndTagOpen,
    TagName,
    RawData(RawKind),
    RawLessThanSign(RawKind),
    RawEndTagOpen(RawKind),
    RawEndTagName(RawKind),
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValue(AttrValueKind),
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    MarkupDeclarationOpen,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentLessThanSign,
    CommentLessThanSignBang,
    CommentLessThanSignBangDash,
    CommentLessThanSignBangDashDash,
    CommentEndDash,
    CommentEnd,
    CommentEndBang,
    BogusComment,
    Doctype,
    BeforeDoctypeName,
    DoctypeName,
    AfterDoctypeName,
    AfterDoctypeKeyword(DoctypeIdKind),
    BeforeDoctypeIdentifier(DoctypeIdKind),
    DoctypeIdentifierDoubleQuoted(DoctypeIdKind),
    DoctypeIdentifierSingleQuoted(DoctypeIdKind),
    AfterDoctypeIdentifier(DoctypeIdKind),
    BetweenDoctypePublicAndSystemIdentifiers,
    BogusDoctype,
    CdataSection,
    CdataSectionBracket,
    CdataSectionEnd,
}
