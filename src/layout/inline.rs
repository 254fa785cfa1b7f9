//! Inline formatting: the line builder.  Atoms (text segments, images,
//! inline blocks) are appended to a pen position; overflow commits a
//! line at the last break opportunity; committed lines are aligned and
//! placed on a common baseline.

use crate::style::{Px, TextAlign, VerticalAlign, WhiteSpace};

use super::view::*;
use super::{block, node_text, resolve_line_height, LayoutContext};

enum Kind {
    Word {
        src: ViewId,
        start: usize,
        len: usize,
    },
    Space {
        src: ViewId,
        start: usize,
        len: usize,
        breakable: bool,
    },
    BoxAtom(ViewId),
    Break,
}

struct Atom {
    kind: Kind,
    width: Px,
    ascent: Px,
    descent: Px,
}

struct Placed {
    atom: usize,
    x: Px,
}

/// Lay out one run of inline-level views inside `block_view`.
/// Returns (height consumed, widest line).
pub(crate) fn layout_inline_run(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    block_view: ViewId,
    items: &[ViewId],
    origin_x: Px,
    origin_y: Px,
    avail_width: Px,
) -> (Px, Px) {
    let (text_align, white_space, indent, block_line_height, block_font) = {
        let b = vt.block(block_view);
        (
            b.blockp.text_align,
            b.blockp.white_space,
            b.blockp.text_indent,
            b.blockp.line_height,
            b.font.font,
        )
    };
    let block_metrics = ctx.measure.metrics(block_font);
    let base_line_height = resolve_line_height(block_line_height, block_metrics.line_height);

    let mut atoms = vec![];
    for &item in items {
        flatten(ctx, vt, item, white_space, avail_width, &mut atoms);
    }

    let mut builder = LineState {
        origin_x,
        origin_y,
        avail_width,
        indent,
        text_align,
        base_line_height,
        cur_y: 0,
        max_line_width: 0,
        line: vec![],
        pen: indent,
        extra_runs: std::collections::HashMap::new(),
    };

    let mut i = 0;
    while i < atoms.len() {
        match &atoms[i].kind {
            Kind::Break => {
                builder.commit(vt, &atoms, false);
            }
            Kind::Space { .. } => {
                let has_content = builder
                    .line
                    .iter()
                    .any(|p| !matches!(atoms[p.atom].kind, Kind::Space { .. }));
                let after_space = builder
                    .line
                    .last()
                    .map_or(false, |p| matches!(atoms[p.atom].kind, Kind::Space { .. }));
                // Collapse runs and drop leading spaces.
                if has_content && !after_space {
                    builder.line.push(Placed {
                        atom: i,
                        x: builder.pen,
                    });
                    builder.pen += atoms[i].width;
                }
            }
            Kind::Word { .. } | Kind::BoxAtom(_) => {
                if builder.pen + atoms[i].width > avail_width {
                    builder.wrap_before(vt, &atoms);
                }
                builder.line.push(Placed {
                    atom: i,
                    x: builder.pen,
                });
                builder.pen += atoms[i].width;
            }
        }
        i += 1;
    }
    builder.commit(vt, &atoms, true);

    (builder.cur_y, builder.max_line_width)
}

fn flatten(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    id: ViewId,
    white_space: WhiteSpace,
    avail_width: Px,
    atoms: &mut Vec<Atom>,
) {
    enum Step {
        Text(ViewId),
        Recurse(Vec<ViewId>),
        Br,
        Boxed(ViewId),
    }
    let step = match &vt.view(id).data {
        ViewData::Text(_) => Step::Text(id),
        ViewData::Inline(ib) => {
            if ib.is_br {
                Step::Br
            } else {
                Step::Recurse(vt.child_ids(id))
            }
        }
        ViewData::Block(_) => Step::Boxed(id),
        ViewData::Image(_) => Step::Boxed(id),
    };

    match step {
        Step::Br => atoms.push(Atom {
            kind: Kind::Break,
            width: 0,
            ascent: 0,
            descent: 0,
        }),
        Step::Recurse(children) => {
            for child in children {
                flatten(ctx, vt, child, white_space, avail_width, atoms);
            }
        }
        Step::Boxed(boxed) => {
            let (w, ascent) = match &vt.view(boxed).data {
                ViewData::Image(img) => (img.width, img.height),
                ViewData::Block(_) => {
                    block::layout_block(ctx, vt, boxed, avail_width, None);
                    let b = vt.block(boxed);
                    (
                        b.boundary.margin.horizontal() + b.width,
                        b.boundary.margin.vertical() + b.height,
                    )
                }
                _ => unreachable!(),
            };
            atoms.push(Atom {
                kind: Kind::BoxAtom(boxed),
                width: w,
                ascent,
                descent: 0,
            });
        }
        Step::Text(text_view) => {
            let (node, font) = match &vt.view(text_view).data {
                ViewData::Text(run) => (run.node, run.font),
                _ => unreachable!(),
            };
            let metrics = ctx.measure.metrics(font);
            let text = node_text(ctx.doc, node).to_string();

            if white_space == WhiteSpace::Pre {
                let mut offset = 0;
                for (li, line) in text.split('\n').enumerate() {
                    if li > 0 {
                        atoms.push(Atom {
                            kind: Kind::Break,
                            width: 0,
                            ascent: 0,
                            descent: 0,
                        });
                        offset += 1; // the newline byte
                    }
                    if !line.is_empty() {
                        let width = line
                            .chars()
                            .map(|c| ctx.measure.advance(font, c))
                            .sum();
                        atoms.push(Atom {
                            kind: Kind::Word {
                                src: text_view,
                                start: offset,
                                len: line.len(),
                            },
                            width,
                            ascent: metrics.ascent,
                            descent: metrics.descent,
                        });
                    }
                    offset += line.len();
                }
                return;
            }

            let breakable = white_space != WhiteSpace::NoWrap;
            let bytes = text.as_bytes();
            let mut start = 0;
            while start < bytes.len() {
                let is_space = bytes[start].is_ascii_whitespace();
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_whitespace() == is_space {
                    end += 1;
                }
                if is_space {
                    atoms.push(Atom {
                        kind: Kind::Space {
                            src: text_view,
                            start,
                            len: end - start,
                            breakable,
                        },
                        width: ctx.measure.advance(font, ' '),
                        ascent: metrics.ascent,
                        descent: metrics.descent,
                    });
                } else {
                    let segment = &text[start..end];
                    let width = segment
                        .chars()
                        .map(|c| ctx.measure.advance(font, c))
                        .sum();
                    atoms.push(Atom {
                        kind: Kind::Word {
                            src: text_view,
                            start,
                            len: end - start,
                        },
                        width,
                        ascent: metrics.ascent,
                        descent: metrics.descent,
                    });
                }
                start = end;
            }
        }
    }
}

struct LineState {
    origin_x: Px,
    origin_y: Px,
    avail_width: Px,
    indent: Px,
    text_align: TextAlign,
    base_line_height: Px,
    cur_y: Px,
    max_line_width: Px,
    line: Vec<Placed>,
    pen: Px,
    /// Last view allocated for each source text view, so later line
    /// segments chain after it.
    extra_runs: std::collections::HashMap<ViewId, ViewId>,
}

impl LineState {
    /// Called when placing atom `next` would overflow: commit the
    /// current line up to the last break opportunity and carry the
    /// rest forward.
    fn wrap_before(&mut self, vt: &mut ViewTree, atoms: &[Atom]) {
        let break_at = self
            .line
            .iter()
            .rposition(|p| matches!(atoms[p.atom].kind, Kind::Space { breakable: true, .. }));
        let break_at = match break_at {
            None => return, // no opportunity; the atom overflows visibly
            Some(i) => i,
        };
        let carried: Vec<usize> = self.line.drain(break_at + 1..).map(|p| p.atom).collect();
        // The breaking space itself vanishes.
        self.line.pop();
        self.commit(vt, atoms, false);
        for atom in carried {
            self.line.push(Placed {
                atom,
                x: self.pen,
            });
            self.pen += atoms[atom].width;
        }
    }

    fn commit(&mut self, vt: &mut ViewTree, atoms: &[Atom], is_last: bool) {
        // Trailing spaces never count.
        while self
            .line
            .last()
            .map_or(false, |p| matches!(atoms[p.atom].kind, Kind::Space { .. }))
        {
            self.line.pop();
        }

        if self.line.is_empty() {
            if !is_last {
                // An empty line still advances (e.g. <br><br>).
                self.cur_y += self.base_line_height;
            }
            self.pen = 0;
            return;
        }

        let mut ascent = 0;
        let mut descent = 0;
        for p in &self.line {
            ascent = ascent.max(atoms[p.atom].ascent);
            descent = descent.max(atoms[p.atom].descent);
        }
        let line_height = self.base_line_height.max(ascent + descent);
        let leading = line_height - (ascent + descent);
        let baseline = self.origin_y + self.cur_y + leading / 2 + ascent;

        let line_end = self
            .line
            .last()
            .map(|p| p.x + atoms[p.atom].width)
            .unwrap_or(0);
        let extra = (self.avail_width - line_end).max(0);
        let shift = match self.text_align {
            TextAlign::Left => 0,
            TextAlign::Right => extra,
            TextAlign::Center => extra / 2,
            TextAlign::Justify => 0,
        };
        let gaps = self
            .line
            .iter()
            .filter(|p| matches!(atoms[p.atom].kind, Kind::Space { .. }))
            .count();
        let per_gap = if self.text_align == TextAlign::Justify && !is_last && gaps > 0 {
            extra / gaps as Px
        } else {
            0
        };

        // Place the atoms, merging contiguous segments from one text
        // node into a single run per line.
        let mut gap_shift = 0;
        let mut pending: Option<(ViewId, usize, usize, Px, Px, Px, Px)> = None;
        let mut flush_pending =
            |vt: &mut ViewTree,
             pending: &mut Option<(ViewId, usize, usize, Px, Px, Px, Px)>,
             extra_runs: &mut std::collections::HashMap<ViewId, ViewId>| {
                let (src, start, end, x, width, asc, desc) = match pending.take() {
                    None => return,
                    Some(p) => p,
                };
                let y = baseline - asc;
                let height = asc + desc;
                let reuse = !extra_runs.contains_key(&src);
                if reuse {
                    if let ViewData::Text(run) = &mut vt.view_mut(src).data {
                        run.start = start;
                        run.len = end - start;
                        run.x = x;
                        run.y = y;
                        run.width = width;
                        run.height = height;
                    }
                    extra_runs.insert(src, src);
                } else {
                    let (node, font, color, cursor, underline, strikethrough) =
                        match &vt.view(src).data {
                            ViewData::Text(run) => (
                                run.node,
                                run.font,
                                run.color,
                                run.cursor,
                                run.underline,
                                run.strikethrough,
                            ),
                            _ => unreachable!(),
                        };
                    let new_view = vt.alloc(
                        Some(node),
                        ViewData::Text(Box::new(TextRun {
                            node,
                            start,
                            len: end - start,
                            x,
                            y,
                            width,
                            height,
                            font,
                            color,
                            cursor,
                            underline,
                            strikethrough,
                        })),
                    );
                    let prev = extra_runs[&src];
                    vt.insert_after(prev, new_view);
                    extra_runs.insert(src, new_view);
                }
            };

        for p in &self.line {
            let atom = &atoms[p.atom];
            let x = self.origin_x + p.x + shift + gap_shift;
            match &atom.kind {
                Kind::Word { src, start, len } | Kind::Space { src, start, len, .. } => {
                    let same = matches!(&pending, Some((s, _, end, ..)) if s == src && *end == *start);
                    if same {
                        if let Some(p) = pending.as_mut() {
                            p.2 = start + len;
                            p.4 += atom.width;
                            p.5 = p.5.max(atom.ascent);
                            p.6 = p.6.max(atom.descent);
                        }
                    } else {
                        flush_pending(vt, &mut pending, &mut self.extra_runs);
                        pending = Some((
                            *src,
                            *start,
                            start + len,
                            x,
                            atom.width,
                            atom.ascent,
                            atom.descent,
                        ));
                    }
                    if matches!(atom.kind, Kind::Space { .. }) {
                        gap_shift += per_gap;
                    }
                }
                Kind::BoxAtom(boxed) => {
                    flush_pending(vt, &mut pending, &mut self.extra_runs);
                    let valign = match &vt.view(*boxed).data {
                        ViewData::Block(b) => b.inline.vertical_align,
                        _ => VerticalAlign::Baseline,
                    };
                    let h = atom.ascent;
                    let y = match valign {
                        VerticalAlign::Top => self.origin_y + self.cur_y,
                        VerticalAlign::Middle => self.origin_y + self.cur_y + (line_height - h) / 2,
                        VerticalAlign::Bottom | VerticalAlign::Baseline => baseline - h,
                    };
                    match &mut vt.view_mut(*boxed).data {
                        ViewData::Block(b) => {
                            let ml = b.boundary.margin.left;
                            let mt = b.boundary.margin.top;
                            b.x = x + ml;
                            b.y = y + mt;
                        }
                        ViewData::Image(img) => {
                            img.x = x;
                            img.y = y;
                        }
                        _ => unreachable!(),
                    }
                }
                Kind::Break => unreachable!("breaks never join a line"),
            }
        }
        flush_pending(vt, &mut pending, &mut self.extra_runs);

        self.max_line_width = self.max_line_width.max(line_end + shift);
        self.cur_y += line_height;
        self.line.clear();
        self.pen = 0;
    }
}
