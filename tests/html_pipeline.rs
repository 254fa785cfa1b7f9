//! Whole-pipeline HTML parsing tests against the DOM dump and the
//! HTML serializer.

use vellum::dom::serialize::{dump, to_html};
use vellum::parse_html;
use vellum::tokenizer::char_ref::NAMED_ENTITIES;
use vellum::tree_builder::QuirksMode;

#[test]
fn adoption_agency_resolves_misnesting() {
    // <p>1<b>2<i>3</b>4</i>5</p>
    let doc = parse_html("<p>1<b>2<i>3</b>4</i>5</p>");
    assert_eq!(
        to_html(&doc),
        "<html><head></head><body><p>1<b>2<i>3</i></b><i>4</i>5</p></body></html>"
    );
}

#[test]
fn implicit_skeleton_and_text_flush() {
    let doc = parse_html("Hello<br>world");
    assert_eq!(
        dump(&doc),
        "<html>\n  <head>\n  <body>\n    \"Hello\"\n    <br>\n    \"world\"\n"
    );
}

#[test]
fn character_references() {
    let doc = parse_html("&amp;&#65;&#x1F600;&#xD800;");
    let body = doc.body().unwrap();
    assert_eq!(doc.text_content(body), "&A\u{1f600}\u{fffd}");
    // The whole run is one text node.
    assert_eq!(doc.children(body).len(), 1);
}

#[test]
fn every_named_entity_decodes_to_its_table_entry() {
    for (name, replacement) in NAMED_ENTITIES.entries() {
        let doc = parse_html(&format!("x&{};y", name));
        let body = doc.body().unwrap();
        assert_eq!(
            doc.text_content(body),
            format!("x{}y", replacement),
            "entity &{};",
            name
        );
    }
}

#[test]
fn tag_names_are_never_uppercase() {
    let doc = parse_html("<DIV Class=A><SPAN>x</SPAN><FooBar>y</FooBar></DIV>");
    for node in doc.descendants(doc.root()) {
        if let Some(tag) = doc.tag_name(node) {
            assert_eq!(tag.as_ref(), tag.as_ref().to_ascii_lowercase());
        }
    }
    let div = doc.children(doc.body().unwrap())[0];
    assert!(doc.is_element_named(div, "div"));
    assert_eq!(doc.attr(div, "class"), Some("A"));
}

#[test]
fn serialization_is_stable_after_one_round_trip() {
    let inputs = [
        "<p>1<b>2<i>3</b>4</i>5</p>",
        "Hello<br>world",
        "<!DOCTYPE html><p title=\"a &quot;b&quot;\">a &lt; b</p>",
        "<!--note--><div><ul><li>one<li>two</ul></div>",
        "<table><tr><td>x</td></tr></table>",
        "&amp;&#65;text",
    ];
    for input in inputs {
        let once = to_html(&parse_html(input));
        let twice = to_html(&parse_html(&once));
        assert_eq!(once, twice, "input {:?}", input);
    }
}

#[test]
fn doctype_is_metadata_not_a_node() {
    let doc = parse_html("<!DOCTYPE html><p>x</p>");
    let dt = doc.doctype.as_ref().unwrap();
    assert_eq!(dt.name, "html");
    assert_eq!(doc.quirks_mode, QuirksMode::NoQuirks);
    // The document's children start at <html>.
    let roots = doc.children(doc.root());
    assert_eq!(roots.len(), 1);
    assert!(doc.is_element_named(roots[0], "html"));
}

#[test]
fn missing_doctype_forces_quirks() {
    let doc = parse_html("<p>x</p>");
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);
}

#[test]
fn quirky_public_id_forces_quirks() {
    let doc = parse_html("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\"><p>x</p>");
    assert_eq!(doc.quirks_mode, QuirksMode::Quirks);
    assert_eq!(
        doc.doctype.as_ref().unwrap().public_id,
        "-//W3C//DTD HTML 3.2 Final//EN"
    );
}

#[test]
fn title_content_is_raw_text() {
    let doc = parse_html("<title>a<b>c</title><p>body</p>");
    let head = doc.head().unwrap();
    let title = doc.children(head)[0];
    assert!(doc.is_element_named(title, "title"));
    assert_eq!(doc.text_content(title), "a<b>c");
}

#[test]
fn script_content_is_raw_text() {
    let doc = parse_html("<script>if (a<b) { f(); }</script>");
    let head = doc.head().unwrap();
    let script = doc.children(head)[0];
    assert_eq!(doc.text_content(script), "if (a<b) { f(); }");
}

#[test]
fn plaintext_consumes_the_rest() {
    let doc = parse_html("before<plaintext><div>not a tag</plaintext>");
    let body = doc.body().unwrap();
    let plaintext = doc
        .children(body)
        .iter()
        .copied()
        .find(|&c| doc.is_element_named(c, "plaintext"))
        .unwrap();
    assert_eq!(doc.text_content(plaintext), "<div>not a tag</plaintext>");
}

#[test]
fn comments_are_distinct_nodes() {
    let doc = parse_html("<p>a<!--note-->b</p>");
    let out = dump(&doc);
    assert!(out.contains("<!--note-->\n"));
    // The comment splits the character run into two text nodes.
    let body = doc.body().unwrap();
    let p = doc.children(body)[0];
    assert_eq!(doc.children(p).len(), 3);
}

#[test]
fn table_gets_implied_sections() {
    let doc = parse_html("<table><td>cell</td></table>");
    let out = dump(&doc);
    assert!(out.contains("<table>\n"));
    assert!(out.contains("<tbody>\n"));
    assert!(out.contains("<tr>\n"));
    assert!(out.contains("<td>\n"));
}

#[test]
fn stray_text_in_table_is_foster_parented() {
    let doc = parse_html("<table>oops<tr><td>x</td></tr></table>");
    let body = doc.body().unwrap();
    // The text lands before the table, not inside it.
    let first = doc.children(body)[0];
    assert_eq!(doc.text_content(first), "oops");
    assert!(doc.is_element_named(doc.children(body)[1], "table"));
}

#[test]
fn malformed_input_still_parses_and_reports() {
    let doc = parse_html("</p><b><i>never closed");
    assert!(!doc.errors.is_empty());
    let body = doc.body().unwrap();
    assert!(doc.text_content(body).contains("never closed"));
}
