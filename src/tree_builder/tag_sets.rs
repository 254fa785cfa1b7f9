//! The fixed tag-name sets the tree construction rules consult.

use phf::{phf_set, Set};

/// Elements with no end tag; they are popped immediately on insertion.
pub static VOID_ELEMENTS: Set<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
};

/// Markers for the default scope check.
pub static DEFAULT_SCOPE: Set<&'static str> = phf_set! {
    "applet", "caption", "html", "table", "td", "th", "marquee",
    "object", "template",
};

/// Extra markers for the list-item scope check.
pub static LIST_ITEM_SCOPE_EXTRA: Set<&'static str> = phf_set! {
    "ol", "ul",
};

/// Extra markers for the button scope check.
pub static BUTTON_SCOPE_EXTRA: Set<&'static str> = phf_set! {
    "button",
};

/// Markers for the table scope check.
pub static TABLE_SCOPE: Set<&'static str> = phf_set! {
    "html", "table", "template",
};

/// The select scope inverts the predicate: everything is a marker
/// except these.
pub static SELECT_SCOPE_TRANSPARENT: Set<&'static str> = phf_set! {
    "optgroup", "option",
};

/// Formatting elements tracked by the active formatting list.
pub static FORMATTING: Set<&'static str> = phf_set! {
    "a", "b", "big", "code", "em", "font", "i", "nobr", "s", "small",
    "strike", "strong", "tt", "u",
};

/// Elements whose end tags are implied when closing a containing
/// element.
pub static IMPLIED_END: Set<&'static str> = phf_set! {
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
};

pub static HEADING: Set<&'static str> = phf_set! {
    "h1", "h2", "h3", "h4", "h5", "h6",
};

/// Start tags which close an open `<p>` in button scope.
pub static CLOSE_P_BLOCK: Set<&'static str> = phf_set! {
    "address", "article", "aside", "blockquote", "center", "details",
    "dialog", "dir", "div", "dl", "fieldset", "figcaption", "figure",
    "footer", "header", "hgroup", "main", "menu", "nav", "ol", "p",
    "section", "summary", "ul",
};

/// The "special" element category from the tree construction spec.
pub static SPECIAL: Set<&'static str> = phf_set! {
    "address", "applet", "area", "article", "aside", "base", "basefont",
    "bgsound", "blockquote", "body", "br", "button", "caption", "center",
    "col", "colgroup", "dd", "details", "dir", "div", "dl", "dt",
    "embed", "fieldset", "figcaption", "figure", "footer", "form",
    "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hgroup", "hr", "html", "iframe", "img", "input",
    "keygen", "li", "link", "listing", "main", "marquee", "menu",
    "meta", "nav", "noembed", "noframes", "noscript", "object", "ol",
    "p", "param", "plaintext", "pre", "script", "section", "select",
    "source", "style", "summary", "table", "tbody", "td", "template",
    "textarea", "tfoot", "th", "thead", "title", "tr", "track", "ul",
    "wbr", "xmp",
};

/// Tags which reset the current table context.
pub static TABLE_CONTEXT: Set<&'static str> = phf_set! {
    "table", "template", "html",
};

pub static TABLE_BODY_CONTEXT: Set<&'static str> = phf_set! {
    "tbody", "tfoot", "thead", "template", "html",
};

pub static TABLE_ROW_CONTEXT: Set<&'static str> = phf_set! {
    "tr", "template", "html",
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn membership() {
        assert!(VOID_ELEMENTS.contains("br"));
        assert!(!VOID_ELEMENTS.contains("div"));
        assert!(FORMATTING.contains("b"));
        assert!(SPECIAL.contains("p"));
        assert!(!SPECIAL.contains("i"));
        assert!(DEFAULT_SCOPE.contains("table"));
    }
}

/// Elements whose presence as the insertion target triggers foster
/// parenting when it is enabled.
pub static TABLE_FOSTER: Set<&'static str> = phf_set! {
    "table", "tbody", "tfoot", "thead", "tr",
};

pub static TABLE_SECTIONS: Set<&'static str> = phf_set! {
    "tbody", "tfoot", "thead",
};
