//! The line-oriented block scanner.  Detection precedence: fenced
//! code, indented code, ATX heading, setext heading, blockquote,
//! unordered list, ordered list, table, thematic break, HTML block,
//! paragraph.

use crate::dom::{Document, NodeData, NodeId};
use crate::tokenizer::Attribute;
use crate::Atom;

use super::inline::parse_inline;

pub(crate) struct BlockParser<'a> {
    doc: &'a mut Document,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

#[derive(Copy, Clone, PartialEq, Eq)]
struct ListMarker {
    indent: usize,
    ordered: bool,
    // Bullet character, or the ordered terminator ('.' or ')').
    ch: char,
    start: u64,
    content_offset: usize,
}

impl<'a> BlockParser<'a> {
    pub fn new(doc: &'a mut Document) -> BlockParser<'a> {
        BlockParser { doc }
    }

    fn element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let node = self.doc.create_element(Atom::from(name), vec![]);
        self.doc.append(parent, node);
        node
    }

    pub fn parse_blocks(&mut self, lines: &[&str], parent: NodeId) {
        let mut para: Vec<String> = vec![];
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];

            if is_blank(line) {
                self.flush_para(&mut para, parent);
                i += 1;
                continue;
            }

            if let Some((marker, len, info)) = fence_open(line) {
                self.flush_para(&mut para, parent);
                i = self.parse_fenced(lines, i, parent, marker, len, &info);
                continue;
            }

            if leading_spaces(line) >= 4 && para.is_empty() {
                i = self.parse_indented(lines, i, parent);
                continue;
            }

            if let Some((level, content)) = atx_heading(line) {
                self.flush_para(&mut para, parent);
                let h = self.element(parent, &format!("h{}", level));
                parse_inline(self.doc, h, content);
                i += 1;
                continue;
            }

            if !para.is_empty() {
                if let Some(level) = setext_underline(line) {
                    let text = para.join("\n");
                    para.clear();
                    let h = self.element(parent, if level == 1 { "h1" } else { "h2" });
                    parse_inline(self.doc, h, text.trim_end());
                    i += 1;
                    continue;
                }
            }

            if blockquote_strip(line).is_some() {
                self.flush_para(&mut para, parent);
                let mut inner: Vec<String> = vec![];
                while i < lines.len() {
                    match blockquote_strip(lines[i]) {
                        Some(rest) => {
                            inner.push(rest.to_string());
                            i += 1;
                        }
                        None => break,
                    }
                }
                let quote = self.element(parent, "blockquote");
                let inner_refs: Vec<&str> = inner.iter().map(String::as_str).collect();
                self.parse_blocks(&inner_refs, quote);
                continue;
            }

            if let Some(marker) = list_marker(line) {
                self.flush_para(&mut para, parent);
                i = self.parse_list(lines, i, parent, marker);
                continue;
            }

            if line.contains('|') && i + 1 < lines.len() {
                if let Some(aligns) = table_separator(lines[i + 1]) {
                    self.flush_para(&mut para, parent);
                    i = self.parse_table(lines, i, parent, &aligns);
                    continue;
                }
            }

            if thematic_break(line) {
                self.flush_para(&mut para, parent);
                self.element(parent, "hr");
                i += 1;
                continue;
            }

            if html_block_start(line) {
                self.flush_para(&mut para, parent);
                i = self.parse_html_block(lines, i, parent);
                continue;
            }

            // Paragraph continuation; leading indentation is dropped.
            para.push(line.trim_start_matches(' ').to_string());
            i += 1;
        }
        self.flush_para(&mut para, parent);
    }

    fn flush_para(&mut self, para: &mut Vec<String>, parent: NodeId) {
        if para.is_empty() {
            return;
        }
        let text = para.join("\n");
        para.clear();
        let p = self.element(parent, "p");
        parse_inline(self.doc, p, text.trim_end());
    }

    fn parse_fenced(
        &mut self,
        lines: &[&str],
        start: usize,
        parent: NodeId,
        marker: char,
        len: usize,
        info: &str,
    ) -> usize {
        let mut i = start + 1;
        let mut content = String::new();
        while i < lines.len() {
            if let Some((c, n, rest)) = fence_open(lines[i]) {
                if c == marker && n >= len && rest.is_empty() {
                    i += 1;
                    break;
                }
            }
            content.push_str(lines[i]);
            content.push('\n');
            i += 1;
        }
        let pre = self.element(parent, "pre");
        let mut attrs = vec![];
        let lang = info.split_whitespace().next().unwrap_or("");
        if !lang.is_empty() {
            attrs.push(Attribute {
                name: Atom::from("class"),
                value: format!("language-{}", lang),
            });
        }
        let code = self.doc.create_element(Atom::from("code"), attrs);
        self.doc.append(pre, code);
        self.doc.append_text(code, &content);
        i
    }

    fn parse_indented(&mut self, lines: &[&str], start: usize, parent: NodeId) -> usize {
        let mut i = start;
        let mut content = String::new();
        let mut pending_blanks = 0usize;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) {
                pending_blanks += 1;
                i += 1;
                continue;
            }
            if leading_spaces(line) < 4 {
                break;
            }
            for _ in 0..pending_blanks {
                content.push('\n');
            }
            pending_blanks = 0;
            content.push_str(&line[4.min(line.len())..]);
            content.push('\n');
            i += 1;
        }
        let pre = self.element(parent, "pre");
        let code = self.element(pre, "code");
        self.doc.append_text(code, &content);
        i - pending_blanks
    }

    fn parse_list(
        &mut self,
        lines: &[&str],
        start: usize,
        parent: NodeId,
        first: ListMarker,
    ) -> usize {
        let list = self.element(parent, if first.ordered { "ol" } else { "ul" });
        if first.ordered && first.start != 1 {
            self.doc.set_attr(list, Atom::from("start"), first.start.to_string());
        }

        let mut i = start;
        let mut tight = true;
        let mut items: Vec<NodeId> = vec![];

        while i < lines.len() {
            let marker = match list_marker(lines[i]) {
                Some(m)
                    if m.indent == first.indent
                        && m.ordered == first.ordered
                        && m.ch == first.ch =>
                {
                    m
                }
                _ => break,
            };

            let mut item_lines: Vec<String> =
                vec![lines[i][marker.content_offset.min(lines[i].len())..].to_string()];
            i += 1;
            let mut blanks = 0usize;
            while i < lines.len() {
                let line = lines[i];
                if is_blank(line) {
                    blanks += 1;
                    i += 1;
                    continue;
                }
                // Deeper indentation than the marker keeps the line in
                // this item; anything else ends it.
                if leading_spaces(line) > marker.indent && list_marker(line)
                    .map_or(true, |m| m.indent > marker.indent)
                {
                    if blanks > 0 {
                        tight = false;
                        for _ in 0..blanks {
                            item_lines.push(String::new());
                        }
                        blanks = 0;
                    }
                    let strip = marker.content_offset.min(leading_spaces(line));
                    item_lines.push(line[strip..].to_string());
                    i += 1;
                    continue;
                }
                break;
            }
            if blanks > 0 {
                // A blank line between sibling items makes the list loose.
                if lines
                    .get(i)
                    .and_then(|l| list_marker(l))
                    .map_or(false, |m| m.indent == first.indent)
                {
                    tight = false;
                }
            }

            let li = self.element(list, "li");
            let item_refs: Vec<&str> = item_lines.iter().map(String::as_str).collect();
            self.parse_blocks(&item_refs, li);
            items.push(li);
        }

        if tight {
            for li in items {
                self.unwrap_paragraphs(li);
            }
        }
        i
    }

    /// In a tight list, paragraph children's contents move directly
    /// into the list item.
    fn unwrap_paragraphs(&mut self, li: NodeId) {
        let children = self.doc.children(li).to_vec();
        for child in children {
            if !self.doc.is_element_named(child, "p") {
                continue;
            }
            let kids = self.doc.children(child).to_vec();
            for kid in kids {
                self.doc.remove_from_parent(kid);
                self.doc.insert_before(child, kid);
            }
            self.doc.remove_from_parent(child);
        }
    }

    fn parse_table(
        &mut self,
        lines: &[&str],
        start: usize,
        parent: NodeId,
        aligns: &[Align],
    ) -> usize {
        let table = self.element(parent, "table");
        let thead = self.element(table, "thead");
        let tr = self.element(thead, "tr");
        for (c, cell) in split_cells(lines[start]).into_iter().enumerate() {
            let th = self.element(tr, "th");
            self.set_align(th, aligns.get(c).copied());
            parse_inline(self.doc, th, cell.trim());
        }

        let tbody = self.element(table, "tbody");
        let mut i = start + 2;
        while i < lines.len() {
            let line = lines[i];
            if is_blank(line) || !line.contains('|') {
                break;
            }
            let tr = self.element(tbody, "tr");
            for (c, cell) in split_cells(line).into_iter().enumerate() {
                let td = self.element(tr, "td");
                self.set_align(td, aligns.get(c).copied());
                parse_inline(self.doc, td, cell.trim());
            }
            i += 1;
        }
        i
    }

    fn set_align(&mut self, cell: NodeId, align: Option<Align>) {
        let value = match align {
            Some(Align::Center) => "center",
            Some(Align::Right) => "right",
            _ => return,
        };
        self.doc
            .set_attr(cell, Atom::from("align"), value.to_string());
    }

    fn parse_html_block(&mut self, lines: &[&str], start: usize, parent: NodeId) -> usize {
        let first = lines[start].trim_start();
        let lower = first.to_ascii_lowercase();
        let terminator: Option<&str> = if lower.starts_with("<pre") {
            Some("</pre>")
        } else if lower.starts_with("<script") {
            Some("</script>")
        } else if lower.starts_with("<style") {
            Some("</style>")
        } else if lower.starts_with("<textarea") {
            Some("</textarea>")
        } else if lower.starts_with("<!--") {
            Some("-->")
        } else {
            None
        };

        let mut content = String::new();
        let mut i = start;
        while i < lines.len() {
            let line = lines[i];
            match terminator {
                Some(t) => {
                    content.push_str(line);
                    content.push('\n');
                    i += 1;
                    if line.to_ascii_lowercase().contains(t) {
                        break;
                    }
                }
                None => {
                    if is_blank(line) {
                        break;
                    }
                    content.push_str(line);
                    content.push('\n');
                    i += 1;
                }
            }
        }
        let node = self.element(parent, "raw-html");
        self.doc.append_text(node, &content);
        i
    }
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == ' ' || c == '\t')
}

fn fence_open(line: &str) -> Option<(char, usize, String)> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = rest.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim().to_string();
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((marker, len, info))
}

fn atx_heading(line: &str) -> Option<(usize, &str)> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let level = rest.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let after = &rest[level..];
    if !after.is_empty() && !after.starts_with(' ') {
        return None;
    }
    let mut content = after.trim();
    // Trailing closing hashes are decorative.
    let trimmed = content.trim_end_matches('#');
    if trimmed.ends_with(' ') || trimmed.is_empty() {
        content = trimmed.trim_end();
    }
    Some((level, content))
}

fn setext_underline(line: &str) -> Option<usize> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = line.trim();
    if rest.is_empty() {
        return None;
    }
    if rest.chars().all(|c| c == '=') {
        return Some(1);
    }
    if rest.chars().all(|c| c == '-') {
        return Some(2);
    }
    None
}

fn blockquote_strip(line: &str) -> Option<&str> {
    let indent = leading_spaces(line);
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let rest = rest.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn list_marker(line: &str) -> Option<ListMarker> {
    let indent = leading_spaces(line);
    let rest = &line[indent..];
    let mut chars = rest.chars();
    let first = chars.next()?;

    if matches!(first, '-' | '*' | '+') {
        let after = &rest[1..];
        if after.starts_with(' ') {
            let spaces = leading_spaces(after).min(4);
            return Some(ListMarker {
                indent,
                ordered: false,
                ch: first,
                start: 1,
                content_offset: indent + 1 + spaces,
            });
        }
        return None;
    }

    if first.is_ascii_digit() {
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits > 9 {
            return None;
        }
        let term = rest[digits..].chars().next()?;
        if term != '.' && term != ')' {
            return None;
        }
        let after = &rest[digits + 1..];
        if after.starts_with(' ') {
            let spaces = leading_spaces(after).min(4);
            return Some(ListMarker {
                indent,
                ordered: true,
                ch: term,
                start: rest[..digits].parse().unwrap_or(1),
                content_offset: indent + digits + 1 + spaces,
            });
        }
    }
    None
}

fn thematic_break(line: &str) -> bool {
    let indent = leading_spaces(line);
    if indent > 3 {
        return false;
    }
    let rest = line.trim();
    let marker = match rest.chars().next() {
        Some(c @ ('-' | '*' | '_')) => c,
        _ => return false,
    };
    let mut count = 0;
    for c in rest.chars() {
        if c == marker {
            count += 1;
        } else if c != ' ' {
            return false;
        }
    }
    count >= 3
}

fn table_separator(line: &str) -> Option<Vec<Align>> {
    if !line.contains('-') {
        return None;
    }
    if !line
        .chars()
        .all(|c| matches!(c, '-' | ':' | '|' | ' '))
    {
        return None;
    }
    let mut aligns = vec![];
    for cell in split_cells(line) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if !cell.trim_matches(':').chars().all(|c| c == '-')
            || !cell.contains('-')
        {
            return None;
        }
        let left = cell.starts_with(':');
        let right = cell.ends_with(':');
        aligns.push(match (left, right) {
            (true, true) => Align::Center,
            (false, true) => Align::Right,
            _ => Align::Left,
        });
    }
    if aligns.is_empty() {
        None
    } else {
        Some(aligns)
    }
}

fn html_block_start(line: &str) -> bool {
    let rest = line.trim_start();
    let mut chars = rest.chars();
    if chars.next() != Some('<') {
        return false;
    }
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Split a table row into cells, honoring `\|` escapes and dropping
/// the outer boundary pipes.
fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    let mut cells = vec![];
    let mut cur = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cur.push('|'),
                Some(other) => {
                    cur.push('\\');
                    cur.push(other);
                }
                None => cur.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cur)),
            c => cur.push(c),
        }
    }
    cells.push(cur);
    cells
}
