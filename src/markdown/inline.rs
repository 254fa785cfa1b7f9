//! The inline scanner: escapes, code spans, emphasis with flanking
//! rules, links, images, autolinks, raw HTML, hard breaks, and emoji
//! shortcodes.

use crate::dom::{Document, Item, NodeId};
use crate::tokenizer::Attribute;
use crate::Atom;

use super::emoji::EMOJI;

/// A piece of inline content before emphasis resolution: either a
/// finished value, or an unresolved delimiter run.
enum Piece {
    Val(Item),
    Delim(Delim),
}

struct Delim {
    ch: char,
    count: usize,
    can_open: bool,
    can_close: bool,
}

/// Parse inline markup and append the results under `parent`.
pub(crate) fn parse_inline(doc: &mut Document, parent: NodeId, text: &str) {
    let pieces = scan(doc, text);
    let pieces = process_emphasis(doc, pieces);
    flush(doc, parent, pieces);
}

/// Inline content reduced to plain text, for image alt attributes.
pub(crate) fn plain_text(doc: &mut Document, text: &str) -> String {
    let scratch = doc.create_element(Atom::from("span"), vec![]);
    parse_inline(doc, scratch, text);
    doc.text_content(scratch)
}

fn flush(doc: &mut Document, parent: NodeId, pieces: Vec<Piece>) {
    for piece in pieces {
        match piece {
            Piece::Val(item) => doc.append_item(parent, item),
            Piece::Delim(d) => {
                let run: String = std::iter::repeat(d.ch).take(d.count).collect();
                doc.append_text(parent, &run);
            }
        }
    }
}

fn push_text(pieces: &mut Vec<Piece>, cur: &mut String) {
    if !cur.is_empty() {
        pieces.push(Piece::Val(Item::Str(std::mem::take(cur))));
    }
}

fn is_punct(c: char) -> bool {
    c.is_ascii_punctuation()
}

fn is_ws(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace(),
    }
}

fn make_element(doc: &mut Document, name: &str, attrs: Vec<Attribute>) -> NodeId {
    doc.create_element(Atom::from(name), attrs)
}

fn attr(name: &str, value: &str) -> Attribute {
    Attribute {
        name: Atom::from(name),
        value: value.to_string(),
    }
}

fn scan(doc: &mut Document, text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces: Vec<Piece> = vec![];
    let mut cur = String::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                match chars.get(i + 1) {
                    Some('\n') => {
                        // Backslash at end of line is a hard break.
                        push_text(&mut pieces, &mut cur);
                        let br = make_element(doc, "br", vec![]);
                        pieces.push(Piece::Val(Item::Element(br)));
                        i += 2;
                    }
                    Some(&next) if is_punct(next) => {
                        cur.push(next);
                        i += 2;
                    }
                    _ => {
                        cur.push('\\');
                        i += 1;
                    }
                }
            }

            '`' => {
                let open_len = run_len(&chars, i, '`');
                match find_backtick_close(&chars, i + open_len, open_len) {
                    Some(close) => {
                        push_text(&mut pieces, &mut cur);
                        let mut content: String =
                            chars[i + open_len..close].iter().collect();
                        content = content.replace('\n', " ");
                        if content.len() >= 2
                            && content.starts_with(' ')
                            && content.ends_with(' ')
                            && content.chars().any(|c| c != ' ')
                        {
                            content = content[1..content.len() - 1].to_string();
                        }
                        let code = make_element(doc, "code", vec![]);
                        doc.append_text(code, &content);
                        pieces.push(Piece::Val(Item::Element(code)));
                        i = close + open_len;
                    }
                    None => {
                        for _ in 0..open_len {
                            cur.push('`');
                        }
                        i += open_len;
                    }
                }
            }

            '<' => match scan_angle(doc, &chars, i) {
                Some((node, next)) => {
                    push_text(&mut pieces, &mut cur);
                    pieces.push(Piece::Val(Item::Element(node)));
                    i = next;
                }
                None => {
                    cur.push('<');
                    i += 1;
                }
            },

            '!' if chars.get(i + 1) == Some(&'[') => match scan_link(doc, &chars, i + 1, true) {
                Some((node, next)) => {
                    push_text(&mut pieces, &mut cur);
                    pieces.push(Piece::Val(Item::Element(node)));
                    i = next;
                }
                None => {
                    cur.push('!');
                    i += 1;
                }
            },

            '[' => match scan_link(doc, &chars, i, false) {
                Some((node, next)) => {
                    push_text(&mut pieces, &mut cur);
                    pieces.push(Piece::Val(Item::Element(node)));
                    i = next;
                }
                None => {
                    cur.push('[');
                    i += 1;
                }
            },

            '*' | '_' | '~' => {
                let count = run_len(&chars, i, c);
                if c == '~' && count != 2 {
                    for _ in 0..count {
                        cur.push('~');
                    }
                    i += count;
                    continue;
                }
                let prev = if i == 0 { None } else { Some(chars[i - 1]) };
                let next = chars.get(i + count).copied();

                let next_ws = is_ws(next);
                let prev_ws = is_ws(prev);
                let next_punct = next.map_or(false, is_punct);
                let prev_punct = prev.map_or(false, is_punct);

                let left_flanking = !next_ws && (!next_punct || prev_ws || prev_punct);
                let right_flanking = !prev_ws && (!prev_punct || next_ws || next_punct);

                let (can_open, can_close) = if c == '_' {
                    (
                        left_flanking && (!right_flanking || prev_punct),
                        right_flanking && (!left_flanking || next_punct),
                    )
                } else {
                    (left_flanking, right_flanking)
                };

                if can_open || can_close {
                    push_text(&mut pieces, &mut cur);
                    pieces.push(Piece::Delim(Delim {
                        ch: c,
                        count,
                        can_open,
                        can_close,
                    }));
                } else {
                    for _ in 0..count {
                        cur.push(c);
                    }
                }
                i += count;
            }

            ':' => match scan_emoji(&chars, i) {
                Some((name, next)) => {
                    push_text(&mut pieces, &mut cur);
                    pieces.push(Piece::Val(Item::Symbol(Atom::from(name))));
                    i = next;
                }
                None => {
                    cur.push(':');
                    i += 1;
                }
            },

            '\n' => {
                // Two or more trailing spaces make a hard break.
                let trailing = cur.len() - cur.trim_end_matches(' ').len();
                if trailing >= 2 {
                    cur.truncate(cur.trim_end_matches(' ').len());
                    push_text(&mut pieces, &mut cur);
                    let br = make_element(doc, "br", vec![]);
                    pieces.push(Piece::Val(Item::Element(br)));
                } else {
                    cur.push('\n');
                }
                i += 1;
            }

            c => {
                cur.push(c);
                i += 1;
            }
        }
    }
    push_text(&mut pieces, &mut cur);
    pieces
}

fn run_len(chars: &[char], start: usize, ch: char) -> usize {
    chars[start..].iter().take_while(|&&c| c == ch).count()
}

fn find_backtick_close(chars: &[char], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '`' {
            let run = run_len(chars, i, '`');
            if run == len {
                return Some(i);
            }
            i += run;
        } else {
            i += 1;
        }
    }
    None
}

fn scan_emoji(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start + 1;
    let mut name = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == ':' {
            if name.is_empty() || !EMOJI.contains_key(name.as_str()) {
                return None;
            }
            return Some((name, i + 1));
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-') {
            name.push(c);
            i += 1;
        } else {
            return None;
        }
    }
    None
}

/// `<scheme:...>`, `<user@host>`, or a raw HTML tag.
fn scan_angle(doc: &mut Document, chars: &[char], start: usize) -> Option<(NodeId, usize)> {
    let close = chars[start + 1..]
        .iter()
        .position(|&c| c == '>')
        .map(|off| start + 1 + off)?;
    let content: String = chars[start + 1..close].iter().collect();

    if !content.contains(char::is_whitespace) && is_uri(&content) {
        let a = make_element(doc, "a", vec![attr("href", &content)]);
        doc.append_text(a, &content);
        return Some((a, close + 1));
    }

    if !content.contains(char::is_whitespace) && is_email(&content) {
        let href = format!("mailto:{}", content);
        let a = make_element(doc, "a", vec![attr("href", &href)]);
        doc.append_text(a, &content);
        return Some((a, close + 1));
    }

    // A raw HTML tag is passed through verbatim.
    let first = *chars.get(start + 1)?;
    if first.is_ascii_alphabetic() || matches!(first, '/' | '!' | '?') {
        let raw: String = chars[start..=close].iter().collect();
        let node = make_element(doc, "raw-html", vec![]);
        doc.append_text(node, &raw);
        return Some((node, close + 1));
    }
    None
}

fn is_uri(s: &str) -> bool {
    let colon = match s.find(':') {
        None => return false,
        Some(i) => i,
    };
    let scheme = &s[..colon];
    if scheme.is_empty() || scheme.len() > 32 {
        return false;
    }
    let mut cs = scheme.chars();
    let first = cs.next().unwrap();
    first.is_ascii_alphabetic()
        && cs.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

fn is_email(s: &str) -> bool {
    let at = match s.find('@') {
        None => return false,
        Some(i) => i,
    };
    let (user, host) = (&s[..at], &s[at + 1..]);
    !user.is_empty()
        && host.contains('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-'))
}

/// `[text](dest "title")`, with balanced brackets in the text and
/// balanced parens in an unquoted destination.
fn scan_link(
    doc: &mut Document,
    chars: &[char],
    start: usize,
    image: bool,
) -> Option<(NodeId, usize)> {
    debug_assert!(chars[start] == '[');
    let mut depth = 0usize;
    let mut close = None;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 1,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => (),
        }
        i += 1;
    }
    let close = close?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }

    let mut j = close + 2;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }

    // Destination: <...> or a balanced-paren run.
    let mut dest = String::new();
    if chars.get(j) == Some(&'<') {
        j += 1;
        while j < chars.len() && chars[j] != '>' {
            if chars[j] == '\n' {
                return None;
            }
            dest.push(chars[j]);
            j += 1;
        }
        if chars.get(j) != Some(&'>') {
            return None;
        }
        j += 1;
    } else {
        let mut paren_depth = 0usize;
        while j < chars.len() {
            let c = chars[j];
            if c.is_whitespace() {
                break;
            }
            match c {
                '\\' => {
                    if let Some(&esc) = chars.get(j + 1) {
                        dest.push(esc);
                        j += 2;
                        continue;
                    }
                }
                '(' => {
                    paren_depth += 1;
                    dest.push(c);
                }
                ')' => {
                    if paren_depth == 0 {
                        break;
                    }
                    paren_depth -= 1;
                    dest.push(c);
                }
                c => dest.push(c),
            }
            j += 1;
        }
    }

    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }

    // Optional title.
    let mut title = None;
    if let Some(&q) = chars.get(j) {
        if matches!(q, '"' | '\'') {
            let mut t = String::new();
            j += 1;
            while j < chars.len() && chars[j] != q {
                t.push(chars[j]);
                j += 1;
            }
            if chars.get(j) != Some(&q) {
                return None;
            }
            j += 1;
            title = Some(t);
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
        }
    }

    if chars.get(j) != Some(&')') {
        return None;
    }

    let content: String = chars[start + 1..close].iter().collect();
    let node = if image {
        let alt = plain_text(doc, &content);
        let mut attrs = vec![attr("src", &dest), attr("alt", &alt)];
        if let Some(t) = &title {
            attrs.push(attr("title", t));
        }
        make_element(doc, "img", attrs)
    } else {
        let mut attrs = vec![attr("href", &dest)];
        if let Some(t) = &title {
            attrs.push(attr("title", t));
        }
        let a = make_element(doc, "a", attrs);
        parse_inline(doc, a, &content);
        a
    };
    Some((node, j + 1))
}

/// Resolve delimiter runs into `em`/`strong`/`del` elements.
fn process_emphasis(doc: &mut Document, mut pieces: Vec<Piece>) -> Vec<Piece> {
    'outer: loop {
        let mut c = 0;
        while c < pieces.len() {
            let (ch, closer_can_open) = match &pieces[c] {
                Piece::Delim(d) if d.can_close && d.count > 0 => (d.ch, d.can_open),
                _ => {
                    c += 1;
                    continue;
                }
            };

            // Nearest opener of the same kind before the closer.
            let mut opener = None;
            for o in (0..c).rev() {
                if let Piece::Delim(d) = &pieces[o] {
                    if d.ch == ch && d.can_open && d.count > 0 {
                        opener = Some(o);
                        break;
                    }
                }
            }
            let o = match opener {
                Some(o) => o,
                None => {
                    // Never a closer; maybe still an opener later.
                    if let Piece::Delim(d) = &mut pieces[c] {
                        d.can_close = false;
                        if !closer_can_open {
                            d.count = 0;
                        }
                    }
                    c += 1;
                    continue;
                }
            };

            let (open_count, close_count) = match (&pieces[o], &pieces[c]) {
                (Piece::Delim(od), Piece::Delim(cd)) => (od.count, cd.count),
                _ => unreachable!(),
            };
            let use_n = if ch != '~' && open_count >= 2 && close_count >= 2 {
                2
            } else if ch == '~' {
                2
            } else {
                1
            };
            let tag = match (ch, use_n) {
                ('~', _) => "del",
                (_, 2) => "strong",
                _ => "em",
            };

            let elem = make_element(doc, tag, vec![]);
            let inner: Vec<Piece> = pieces.drain(o + 1..c).collect();
            flush(doc, elem, inner);

            // After the drain the closer sits right after the opener.
            if let Piece::Delim(d) = &mut pieces[o + 1] {
                d.count -= use_n;
            }
            if let Piece::Delim(d) = &mut pieces[o] {
                d.count -= use_n;
            }
            pieces.insert(o + 1, Piece::Val(Item::Element(elem)));

            // Drop exhausted delimiters.
            pieces.retain(|p| !matches!(p, Piece::Delim(d) if d.count == 0));
            continue 'outer;
        }
        break;
    }
    pieces
}

#[cfg(test)]
mod test {
    use super::parse_inline;
    use crate::dom::serialize::dump;
    use crate::dom::Document;
    use crate::Atom;

    fn inline_dump(text: &str) -> String {
        let mut doc = Document::new();
        let p = doc.create_element(Atom::from("p"), vec![]);
        let root = doc.root();
        doc.append(root, p);
        parse_inline(&mut doc, p, text);
        dump(&doc)
    }

    #[test]
    fn intraword_underscore_stays_literal() {
        let out = inline_dump("foo_bar_baz  *a*b*c*");
        assert_eq!(
            out,
            concat!(
                "<p>\n",
                "  \"foo_bar_baz  \"\n",
                "  <em>\n",
                "    \"a\"\n",
                "  \"b\"\n",
                "  <em>\n",
                "    \"c\"\n",
            )
        );
    }

    #[test]
    fn strong_and_nested() {
        let out = inline_dump("**bold** and ***both***");
        assert!(out.contains("<strong>"));
        assert!(out.contains("<em>"));
    }

    #[test]
    fn code_span_strips_one_space() {
        let out = inline_dump("`` `x` ``");
        assert!(out.contains("<code>"));
        assert!(out.contains("\"`x`\""));
    }

    #[test]
    fn link_with_title() {
        let out = inline_dump("[text](http://e.com/a(b) \"t\")");
        assert!(out.contains("<a href=\"http://e.com/a(b)\" title=\"t\">"));
        assert!(out.contains("\"text\""));
    }

    #[test]
    fn image_alt_is_plain_text() {
        let out = inline_dump("![*alt*](img.png)");
        assert!(out.contains("<img src=\"img.png\" alt=\"alt\">"));
    }

    #[test]
    fn autolink_and_email() {
        let out = inline_dump("<http://x.y> <a@b.com>");
        assert!(out.contains("<a href=\"http://x.y\">"));
        assert!(out.contains("<a href=\"mailto:a@b.com\">"));
    }

    #[test]
    fn emoji_shortcode_becomes_symbol() {
        let out = inline_dump("hi :smile: and :nope:");
        assert!(out.contains(":smile:\n"));
        assert!(out.contains("\"hi \"\n"));
        assert!(out.contains("and :nope:"));
    }

    #[test]
    fn hard_break_from_trailing_spaces() {
        let out = inline_dump("one  \ntwo");
        assert!(out.contains("<br>"));
        assert!(!out.contains("one  "));
    }

    #[test]
    fn strikethrough() {
        let out = inline_dump("~~gone~~");
        assert!(out.contains("<del>"));
    }
}
