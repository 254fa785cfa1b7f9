//! The Markdown builder: a line-oriented CommonMark-subset parser that
//! produces the same DOM shape as the HTML parser.

use crate::dom::Document;
use crate::Atom;

mod block;
mod emoji;
mod inline;

pub use emoji::EMOJI;

/// Build a complete document (with the implicit html/head/body
/// skeleton) from Markdown source.
pub fn build_document(input: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    let html = doc.create_element(Atom::from("html"), vec![]);
    doc.append(root, html);
    let head = doc.create_element(Atom::from("head"), vec![]);
    doc.append(html, head);
    let body = doc.create_element(Atom::from("body"), vec![]);
    doc.append(html, body);

    let expanded = input.replace('\t', "    ");
    let lines: Vec<&str> = expanded.lines().collect();
    block::BlockParser::new(&mut doc).parse_blocks(&lines, body);
    doc
}

#[cfg(test)]
mod test {
    use super::build_document;
    use crate::dom::serialize::dump;

    fn body_dump(input: &str) -> String {
        let doc = build_document(input);
        let full = dump(&doc);
        // Strip the skeleton prefix for terser assertions.
        full.lines()
            .skip(3)
            .map(|l| l.trim_start().to_string() + "\n")
            .collect()
    }

    #[test]
    fn heading_and_paragraph() {
        let out = body_dump("# Title\n\nSome *text* here.");
        assert!(out.contains("<h1>\n"));
        assert!(out.contains("\"Title\"\n"));
        assert!(out.contains("<p>\n"));
        assert!(out.contains("<em>\n"));
    }

    #[test]
    fn setext_heading() {
        let out = body_dump("Title\n=====\n\nSub\n---");
        assert!(out.contains("<h1>\n"));
        assert!(out.contains("<h2>\n"));
    }

    #[test]
    fn fenced_code_with_language() {
        let out = body_dump("```rust\nfn main() {}\n```");
        assert!(out.contains("<pre>\n"));
        assert!(out.contains("<code class=\"language-rust\">\n"));
        assert!(out.contains("fn main() {}"));
    }

    #[test]
    fn nested_blockquote() {
        let out = body_dump("> outer\n> > inner");
        assert_eq!(out.matches("<blockquote>").count(), 2);
    }

    #[test]
    fn tight_list_has_no_paragraphs() {
        let out = body_dump("- one\n- two\n- three");
        assert!(out.contains("<ul>\n"));
        assert_eq!(out.matches("<li>").count(), 3);
        assert!(!out.contains("<p>"));
    }

    #[test]
    fn loose_list_keeps_paragraphs() {
        let out = body_dump("- one\n\n- two");
        assert_eq!(out.matches("<li>").count(), 2);
        assert!(out.contains("<p>"));
    }

    #[test]
    fn nested_list_by_indentation() {
        let out = body_dump("- a\n  - b\n- c");
        assert_eq!(out.matches("<ul>").count(), 2);
        assert_eq!(out.matches("<li>").count(), 3);
    }

    #[test]
    fn mismatched_ordered_terminator_starts_new_list() {
        let out = body_dump("1. one\n2) two");
        assert_eq!(out.matches("<ol").count(), 2);
    }

    #[test]
    fn table_with_alignment() {
        let out = body_dump("| a | b | c |\n| :-- | :-: | --: |\n| 1 | 2 | 3 |");
        assert!(out.contains("<table>\n"));
        assert!(out.contains("<thead>\n"));
        assert!(out.contains("<th>\n"));
        assert!(out.contains("<th align=\"center\">\n"));
        assert!(out.contains("<td align=\"right\">\n"));
        assert!(out.contains("<tbody>\n"));
    }

    #[test]
    fn thematic_break_needs_three() {
        let out = body_dump("***\n");
        assert!(out.contains("<hr>\n"));
    }

    #[test]
    fn html_block_is_verbatim() {
        let out = body_dump("<div class=\"x\">\nraw\n</div>\n\nafter");
        assert!(out.contains("<raw-html>\n"));
        assert!(out.contains("<div class=\\\"x\\\">"));
        assert!(out.contains("after"));
    }

    #[test]
    fn indented_code_block() {
        let out = body_dump("    let x = 1;\n    let y = 2;");
        assert!(out.contains("<pre>\n"));
        assert!(out.contains("let x = 1;"));
    }
}
