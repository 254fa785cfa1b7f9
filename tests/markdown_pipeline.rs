//! Markdown-to-DOM tests: the builder must produce the same document
//! shape the HTML parser does.

use vellum::dom::serialize::dump;
use vellum::{parse_html, parse_markdown};

#[test]
fn intraword_emphasis_flanking() {
    // foo_bar_baz  *a*b*c*
    let doc = parse_markdown("foo_bar_baz  *a*b*c*");
    assert_eq!(
        dump(&doc),
        concat!(
            "<html>\n",
            "  <head>\n",
            "  <body>\n",
            "    <p>\n",
            "      \"foo_bar_baz  \"\n",
            "      <em>\n",
            "        \"a\"\n",
            "      \"b\"\n",
            "      <em>\n",
            "        \"c\"\n",
        )
    );
}

#[test]
fn markdown_and_html_agree_on_shape() {
    let pairs = [
        ("# Title", "<h1>Title</h1>"),
        ("plain text", "<p>plain text</p>"),
        ("> quoted", "<blockquote><p>quoted</p></blockquote>"),
        ("***", "<hr>"),
    ];
    for (md, html) in pairs {
        assert_eq!(
            dump(&parse_markdown(md)),
            dump(&parse_html(html)),
            "markdown {:?}",
            md
        );
    }
}

#[test]
fn triple_markers_nest_emphasis() {
    let doc = parse_markdown("***both***");
    let out = dump(&doc);
    let strong = out.find("<strong>").expect("no strong");
    let em = out.find("<em>").expect("no em");
    assert!(em < strong, "em wraps strong: {}", out);
}

#[test]
fn strikethrough_is_del() {
    let out = dump(&parse_markdown("keep ~~drop~~ keep"));
    assert!(out.contains("<del>\n"));
    assert!(out.contains("\"drop\"\n"));
}

#[test]
fn emoji_shortcodes_become_symbols() {
    let out = dump(&parse_markdown("ship it :rocket: :notreal:"));
    // Known shortcode: a symbol node with the bare name.
    assert!(out.contains(":rocket:\n"));
    // Unknown shortcode: literal text.
    assert!(out.contains("ship it "));
    assert!(out.contains(":notreal:\""));
}

#[test]
fn link_and_image() {
    let out = dump(&parse_markdown("[go](https://x.y \"t\") ![alt text](pic.png)"));
    assert!(out.contains("<a href=\"https://x.y\" title=\"t\">\n"));
    assert!(out.contains("\"go\"\n"));
    assert!(out.contains("<img src=\"pic.png\" alt=\"alt text\">\n"));
}

#[test]
fn table_alignment_columns() {
    let out = dump(&parse_markdown(
        "| l | c | r |\n| :-- | :-: | --: |\n| 1 | 2 | 3 |",
    ));
    assert!(out.contains("<table>\n"));
    assert!(out.contains("<th>\n"));
    assert!(out.contains("<th align=\"center\">\n"));
    assert!(out.contains("<th align=\"right\">\n"));
    assert!(out.contains("<td align=\"center\">\n"));
    assert!(out.contains("<td align=\"right\">\n"));
}

#[test]
fn hard_break_variants() {
    // Two trailing spaces and a trailing backslash both force <br>.
    let out = dump(&parse_markdown("one  \ntwo\\\nthree"));
    assert_eq!(out.matches("<br>\n").count(), 2);
}

#[test]
fn code_span_and_fence() {
    let out = dump(&parse_markdown("use `let x` here\n\n```rust\nfn f() {}\n```"));
    assert!(out.contains("<code>\n"));
    assert!(out.contains("\"let x\"\n"));
    assert!(out.contains("<code class=\"language-rust\">\n"));
    assert!(out.contains("fn f() {}"));
}

#[test]
fn nested_lists_by_indentation() {
    let out = dump(&parse_markdown("- a\n  - b\n    - c\n- d"));
    assert_eq!(out.matches("<ul>\n").count(), 3);
    assert_eq!(out.matches("<li>\n").count(), 4);
}

#[test]
fn ordered_list_with_start() {
    let out = dump(&parse_markdown("3. three\n4. four"));
    assert!(out.contains("<ol start=\"3\">\n"));
}

#[test]
fn setext_interrupts_paragraph() {
    let doc = parse_markdown("Title line\n===\nbody");
    let out = dump(&doc);
    assert!(out.contains("<h1>\n"));
    assert!(out.contains("\"Title line\"\n"));
    assert!(out.contains("<p>\n"));
}

#[test]
fn autolinks() {
    let out = dump(&parse_markdown("<https://a.b/c> and <me@host.org>"));
    assert!(out.contains("<a href=\"https://a.b/c\">\n"));
    assert!(out.contains("<a href=\"mailto:me@host.org\">\n"));
}
