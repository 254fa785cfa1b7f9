//! High-level parsing entry points, and the resource interface the
//! image loader consumes.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::dom::Document;
use crate::tokenizer::{Tokenizer, TokenizerOpts};
use crate::tree_builder::{TreeBuilder, TreeBuilderOpts};

/// Options for the whole parse pipeline.
#[derive(Clone, Default)]
pub struct ParseOpts {
    pub tokenizer: TokenizerOpts,
    pub tree_builder: TreeBuilderOpts,
}

/// Parse a complete HTML document from a UTF-8 string.
pub fn parse_html(input: &str) -> Document {
    parse_html_with_opts(input, ParseOpts::default())
}

pub fn parse_html_with_opts(input: &str, opts: ParseOpts) -> Document {
    let mut doc = Document::new();
    {
        let mut builder = TreeBuilder::new(&mut doc, opts.tree_builder);
        let mut tokenizer = Tokenizer::new(&mut builder, opts.tokenizer);
        tokenizer.feed(input.to_string());
        tokenizer.end();
    }
    doc
}

/// Parse a Markdown document into the same DOM shape the HTML parser
/// produces.
pub fn parse_markdown(input: &str) -> Document {
    crate::markdown::build_document(input)
}

/// Failure to obtain a resource's bytes.
#[derive(Debug)]
pub enum ResourceError {
    NotFound(String),
    Io(io::Error),
    Decode(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound(url) => write!(f, "resource not found: {}", url),
            ResourceError::Io(e) => write!(f, "i/o error: {}", e),
            ResourceError::Decode(what) => write!(f, "could not decode {}", what),
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<io::Error> for ResourceError {
    fn from(e: io::Error) -> ResourceError {
        ResourceError::Io(e)
    }
}

/// Yields the decoded bytes of a URL.  Text encoding detection is the
/// provider's problem; the core expects UTF-8 for documents.
pub trait ResourceProvider {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, ResourceError>;
}

/// A provider that resolves URLs as filesystem paths, optionally
/// relative to a base directory.
pub struct FsProvider {
    base: Option<std::path::PathBuf>,
}

impl FsProvider {
    pub fn new() -> FsProvider {
        FsProvider { base: None }
    }

    pub fn with_base(base: &Path) -> FsProvider {
        FsProvider {
            base: Some(base.to_path_buf()),
        }
    }
}

impl Default for FsProvider {
    fn default() -> FsProvider {
        FsProvider::new()
    }
}

impl ResourceProvider for FsProvider {
    fn fetch(&mut self, url: &str) -> Result<Vec<u8>, ResourceError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = match &self.base {
            Some(base) if Path::new(path).is_relative() => base.join(path),
            _ => Path::new(path).to_path_buf(),
        };
        fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ResourceError::NotFound(url.to_string())
            } else {
                ResourceError::Io(e)
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::parse_html;
    use crate::dom::serialize::dump;

    #[test]
    fn implicit_structure() {
        let doc = parse_html("Hello<br>world");
        assert_eq!(
            dump(&doc),
            "<html>\n  <head>\n  <body>\n    \"Hello\"\n    <br>\n    \"world\"\n"
        );
    }

    #[test]
    fn adoption_agency_misnesting() {
        let doc = parse_html("<p>1<b>2<i>3</b>4</i>5</p>");
        assert_eq!(
            dump(&doc),
            concat!(
                "<html>\n",
                "  <head>\n",
                "  <body>\n",
                "    <p>\n",
                "      \"1\"\n",
                "      <b>\n",
                "        \"2\"\n",
                "        <i>\n",
                "          \"3\"\n",
                "      <i>\n",
                "        \"4\"\n",
                "      \"5\"\n",
            )
        );
    }

    #[test]
    fn character_references_in_body() {
        let doc = parse_html("&amp;&#65;&#x1F600;&#xD800;");
        let body = doc.body().unwrap();
        assert_eq!(doc.text_content(body), "&A\u{1F600}\u{fffd}");
        // One contiguous character run yields exactly one text node.
        assert_eq!(doc.children(body).len(), 1);
    }
}
