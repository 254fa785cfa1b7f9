//! Document serialization: an HTML writer for round-trips and an
//! indented dump used as the test oracle.

use crate::dom::{Document, NodeData, NodeId};
use crate::util::str::to_escaped_string;

/// Elements which never have an end tag.
pub fn is_void_element(name: &str) -> bool {
    crate::tree_builder::tag_sets::VOID_ELEMENTS.contains(name)
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

/// Serialize a subtree back to HTML source.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = &doc.doctype {
        out.push_str("<!DOCTYPE ");
        out.push_str(&doctype.name);
        out.push('>');
    }
    for &child in doc.children(doc.root()) {
        write_html(doc, child, &mut out);
    }
    out
}

fn write_html(doc: &Document, id: NodeId, out: &mut String) {
    match doc.data(id) {
        NodeData::Document => {
            for &child in doc.children(id) {
                write_html(doc, child, out);
            }
        }
        NodeData::Element { name, attrs } => {
            if name.as_ref() == "raw-html" {
                // The children hold verbatim markup; no tags of our own.
                for &child in doc.children(id) {
                    if let NodeData::Text(text) = doc.data(child) {
                        out.push_str(text);
                    }
                }
                return;
            }
            let raw = matches!(name.as_ref(), "style" | "script");
            out.push('<');
            out.push_str(name.as_ref());
            for attr in attrs {
                out.push(' ');
                out.push_str(attr.name.as_ref());
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }
            out.push('>');
            for &child in doc.children(id) {
                if raw {
                    if let NodeData::Text(text) = doc.data(child) {
                        out.push_str(text);
                        continue;
                    }
                }
                write_html(doc, child, out);
            }
            if !is_void_element(name.as_ref()) {
                out.push_str("</");
                out.push_str(name.as_ref());
                out.push('>');
            }
        }
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Symbol(name) => {
            out.push(':');
            out.push_str(name.as_ref());
            out.push(':');
        }
    }
}

/// Deterministic pre-order dump: one line per node, indented two spaces
/// per level of depth.  This is the canonical oracle for parser tests.
pub fn dump(doc: &Document) -> String {
    let mut out = String::new();
    for &child in doc.children(doc.root()) {
        write_dump(doc, child, 0, &mut out);
    }
    out
}

fn write_dump(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match doc.data(id) {
        NodeData::Document => unreachable!("document inside document"),
        NodeData::Element { name, attrs } => {
            out.push('<');
            out.push_str(name.as_ref());
            for attr in attrs {
                out.push(' ');
                out.push_str(attr.name.as_ref());
                out.push_str("=\"");
                out.push_str(&to_escaped_string(&attr.value));
                out.push('"');
            }
            out.push_str(">\n");
            for &child in doc.children(id) {
                write_dump(doc, child, depth + 1, out);
            }
        }
        NodeData::Text(text) => {
            out.push('"');
            out.push_str(&to_escaped_string(text));
            out.push_str("\"\n");
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->\n");
        }
        NodeData::Symbol(name) => {
            out.push(':');
            out.push_str(name.as_ref());
            out.push_str(":\n");
        }
    }
}
