//! Doctype sniffing: which doctypes put the document into quirks mode.

use crate::tokenizer::Doctype;
use crate::tree_builder::interface::QuirksMode;

/// Public identifier prefixes which force quirks mode.
static QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// Public identifiers which force quirks mode exactly.
static QUIRKY_PUBLIC_MATCHES: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

static QUIRKY_SYSTEM_MATCHES: &[&str] =
    &["http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd"];

static LIMITED_QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

static HTML4_PUBLIC_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

fn contains_ignore_ascii_case(haystack: &[&str], needle: &str) -> bool {
    haystack.iter().any(|s| s.eq_ignore_ascii_case(needle))
}

fn starts_with_any_ignore_ascii_case(prefixes: &[&str], value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    prefixes.iter().any(|p| lower.starts_with(p))
}

/// Whether the doctype is an error, and what quirks mode it selects.
pub fn doctype_error_and_quirks(doctype: &Doctype, iframe_srcdoc: bool) -> (bool, QuirksMode) {
    fn opt_as_slice(x: &Option<String>) -> Option<&str> {
        x.as_deref()
    }

    let name = opt_as_slice(&doctype.name);
    let public = opt_as_slice(&doctype.public_id);
    let system = opt_as_slice(&doctype.system_id);

    let err = match (name, public, system) {
        (Some("html"), None, None)
        | (Some("html"), None, Some("about:legacy-compat")) => false,
        (Some("html"), Some(p), None) => {
            !starts_with_any_ignore_ascii_case(HTML4_PUBLIC_PREFIXES, p)
        }
        _ => true,
    };

    let quirk = match (name, public, system) {
        _ if doctype.force_quirks => QuirksMode::Quirks,
        _ if iframe_srcdoc => QuirksMode::NoQuirks,

        (n, _, _) if n != Some("html") => QuirksMode::Quirks,

        (_, Some(p), _) if contains_ignore_ascii_case(QUIRKY_PUBLIC_MATCHES, p) => {
            QuirksMode::Quirks
        }
        (_, _, Some(s)) if contains_ignore_ascii_case(QUIRKY_SYSTEM_MATCHES, s) => {
            QuirksMode::Quirks
        }
        (_, Some(p), _) if starts_with_any_ignore_ascii_case(QUIRKY_PUBLIC_PREFIXES, p) => {
            QuirksMode::Quirks
        }
        (_, Some(p), None)
            if starts_with_any_ignore_ascii_case(HTML4_PUBLIC_PREFIXES, p) =>
        {
            QuirksMode::Quirks
        }

        (_, Some(p), _) if starts_with_any_ignore_ascii_case(LIMITED_QUIRKY_PUBLIC_PREFIXES, p) => {
            QuirksMode::LimitedQuirks
        }
        (_, Some(p), Some(_))
            if starts_with_any_ignore_ascii_case(HTML4_PUBLIC_PREFIXES, p) =>
        {
            QuirksMode::LimitedQuirks
        }

        _ => QuirksMode::NoQuirks,
    };

    (err, quirk)
}

#[cfg(test)]
mod test {
    use super::doctype_error_and_quirks;
    use crate::tokenizer::Doctype;
    use crate::tree_builder::interface::QuirksMode;

    fn doctype(name: Option<&str>, public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: name.map(String::from),
            public_id: public.map(String::from),
            system_id: system.map(String::from),
            force_quirks: false,
        }
    }

    #[test]
    fn modern_doctype_is_no_quirks() {
        let (err, quirk) = doctype_error_and_quirks(&doctype(Some("html"), None, None), false);
        assert!(!err);
        assert_eq!(quirk, QuirksMode::NoQuirks);
    }

    #[test]
    fn html_3_2_is_quirks() {
        let dt = doctype(Some("html"), Some("-//W3C//DTD HTML 3.2 Final//EN"), None);
        assert_eq!(doctype_error_and_quirks(&dt, false).1, QuirksMode::Quirks);
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        let dt = doctype(
            Some("html"),
            Some("-//W3C//DTD XHTML 1.0 Transitional//EN"),
            Some("http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd"),
        );
        assert_eq!(
            doctype_error_and_quirks(&dt, false).1,
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn missing_name_forces_quirks() {
        let dt = doctype(None, None, None);
        assert_eq!(doctype_error_and_quirks(&dt, false).1, QuirksMode::Quirks);
    }
}
