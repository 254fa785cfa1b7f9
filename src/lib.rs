//! An HTML5/Markdown document pipeline: parsing to a shared DOM,
//! CSS-driven box layout to a view tree, and hit-testing over it.
//!
//! The crate is organised along the data flow: bytes go through
//! [`tokenizer`] and [`tree_builder`] (or [`markdown`]) into a
//! [`dom::Document`]; the document plus used style values go through
//! [`layout`] into a [`layout::ViewTree`]; the view tree feeds
//! [`render`] for painting and [`interact`] for input.

pub use string_cache::DefaultAtom as Atom;

pub mod util;

pub mod dom;
pub mod driver;
pub mod fonts;
pub mod images;
pub mod interact;
pub mod layout;
pub mod markdown;
pub mod render;
pub mod style;
pub mod tokenizer;
pub mod tree_builder;

pub use driver::{parse_html, parse_markdown, ParseOpts, ResourceError, ResourceProvider};
