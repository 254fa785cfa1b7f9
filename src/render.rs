//! Walks a laid-out view tree and emits ordered draw commands to a
//! painter.  Rasterisation lives on the other side of the `Painter`
//! trait; the core never reads pixels back.

use crate::dom::Document;
use crate::fonts::{FontId, TextMeasure};
use crate::layout::*;
use crate::style::{BorderStyle, Color, Px};

/// Receiver of ordered draw commands.
pub trait Painter {
    fn fill_rect(&mut self, rect: Rect, color: Color, clip: Option<Rect>);
    fn blit_image(&mut self, src: &str, src_rect: Rect, dst_rect: Rect, clip: Option<Rect>);
    fn draw_glyph(&mut self, font: FontId, glyph: u16, x: Px, y: Px, color: Color, clip: Option<Rect>);
    fn draw_picture(&mut self, src: &str, dst_rect: Rect, clip: Option<Rect>);
}

/// A painter that just records what it was asked to draw; the test
/// oracle and the headless harness both consume this.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
        clip: Option<Rect>,
    },
    BlitImage {
        src: String,
        src_rect: Rect,
        dst_rect: Rect,
        clip: Option<Rect>,
    },
    Glyph {
        font: FontId,
        glyph: u16,
        x: Px,
        y: Px,
        color: Color,
        clip: Option<Rect>,
    },
    Picture {
        src: String,
        dst_rect: Rect,
        clip: Option<Rect>,
    },
}

#[derive(Default)]
pub struct RecordingPainter {
    pub commands: Vec<DrawCommand>,
}

impl RecordingPainter {
    pub fn new() -> RecordingPainter {
        RecordingPainter::default()
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, rect: Rect, color: Color, clip: Option<Rect>) {
        self.commands.push(DrawCommand::FillRect { rect, color, clip });
    }

    fn blit_image(&mut self, src: &str, src_rect: Rect, dst_rect: Rect, clip: Option<Rect>) {
        self.commands.push(DrawCommand::BlitImage {
            src: src.to_string(),
            src_rect,
            dst_rect,
            clip,
        });
    }

    fn draw_glyph(&mut self, font: FontId, glyph: u16, x: Px, y: Px, color: Color, clip: Option<Rect>) {
        self.commands.push(DrawCommand::Glyph {
            font,
            glyph,
            x,
            y,
            color,
            clip,
        });
    }

    fn draw_picture(&mut self, src: &str, dst_rect: Rect, clip: Option<Rect>) {
        self.commands.push(DrawCommand::Picture {
            src: src.to_string(),
            dst_rect,
            clip,
        });
    }
}

/// Emit draw commands for the whole view tree.
pub fn render(
    doc: &Document,
    vt: &ViewTree,
    measure: &mut dyn TextMeasure,
    painter: &mut dyn Painter,
) {
    if let Some(root) = vt.root {
        render_view(doc, vt, measure, painter, root, 0, 0, None);
    }
}

fn intersect_clip(clip: Option<Rect>, next: Rect) -> Option<Rect> {
    Some(match clip {
        None => next,
        Some(prev) => prev.intersect(&next),
    })
}

#[allow(clippy::too_many_arguments)]
fn render_view(
    doc: &Document,
    vt: &ViewTree,
    measure: &mut dyn TextMeasure,
    painter: &mut dyn Painter,
    id: ViewId,
    block_x: Px,
    block_y: Px,
    clip: Option<Rect>,
) {
    match &vt.view(id).data {
        ViewData::Block(b) => {
            let abs_x = block_x + b.x;
            let abs_y = block_y + b.y;

            if !b.boundary.background.is_transparent() {
                painter.fill_rect(
                    Rect::new(abs_x, abs_y, b.width, b.height),
                    b.boundary.background,
                    clip,
                );
            }
            draw_borders(painter, b, abs_x, abs_y, clip);
            if let Some(marker) = &b.marker {
                draw_marker(measure, painter, b, marker, abs_x, abs_y, clip);
            }

            // Descendant commands are clipped to the pane's content box.
            let (child_x, child_y, child_clip) = match b.scroller {
                Some(pane_id) => {
                    let pane = vt.pane(pane_id);
                    let pane_clip = pane.clip.translate(abs_x, abs_y);
                    (
                        abs_x - pane.h_scroll,
                        abs_y - pane.v_scroll,
                        intersect_clip(clip, pane_clip),
                    )
                }
                None => (abs_x, abs_y, clip),
            };
            for child in vt.children(id) {
                render_view(doc, vt, measure, painter, child, child_x, child_y, child_clip);
            }
        }

        ViewData::Inline(_) => {
            for child in vt.children(id) {
                render_view(doc, vt, measure, painter, child, block_x, block_y, clip);
            }
        }

        ViewData::Text(run) => {
            let text = crate::layout::node_text(doc, run.node);
            let end = (run.start + run.len).min(text.len());
            let slice = &text[run.start..end];
            let mut pen = block_x + run.x;
            let baseline = block_y + run.y + run.height; // descent excluded below
            let metrics = measure.metrics(run.font);
            let baseline = baseline - metrics.descent.min(run.height);
            for c in slice.chars() {
                let advance = measure.advance(run.font, c);
                if !c.is_whitespace() {
                    match measure.glyph(run.font, c) {
                        Some((font, glyph)) => {
                            painter.draw_glyph(font, glyph, pen, baseline, run.color, clip);
                        }
                        None => {
                            // Missing everywhere: a visible placeholder box.
                            painter.fill_rect(
                                Rect::new(
                                    pen,
                                    block_y + run.y,
                                    advance.max(1),
                                    run.height.max(1),
                                ),
                                run.color,
                                clip,
                            );
                        }
                    }
                }
                pen += advance;
            }
            if run.underline {
                painter.fill_rect(
                    Rect::new(block_x + run.x, baseline + 2, run.width, 1),
                    run.color,
                    clip,
                );
            }
            if run.strikethrough {
                painter.fill_rect(
                    Rect::new(
                        block_x + run.x,
                        block_y + run.y + run.height / 2,
                        run.width,
                        1,
                    ),
                    run.color,
                    clip,
                );
            }
        }

        ViewData::Image(img) => {
            let dst = Rect::new(block_x + img.x, block_y + img.y, img.width, img.height);
            if img.is_picture {
                painter.draw_picture(&img.src, dst, clip);
            } else {
                painter.blit_image(
                    &img.src,
                    Rect::new(0, 0, img.intrinsic_width, img.intrinsic_height),
                    dst,
                    clip,
                );
            }
        }
    }
}

fn draw_borders(painter: &mut dyn Painter, b: &BlockBox, x: Px, y: Px, clip: Option<Rect>) {
    if b.boundary.border_style == BorderStyle::None {
        return;
    }
    let e = b.boundary.border;
    let c = b.boundary.border_color;
    if e.top > 0 {
        painter.fill_rect(Rect::new(x, y, b.width, e.top), c, clip);
    }
    if e.bottom > 0 {
        painter.fill_rect(Rect::new(x, y + b.height - e.bottom, b.width, e.bottom), c, clip);
    }
    if e.left > 0 {
        painter.fill_rect(Rect::new(x, y, e.left, b.height), c, clip);
    }
    if e.right > 0 {
        painter.fill_rect(Rect::new(x + b.width - e.right, y, e.right, b.height), c, clip);
    }
}

/// Markers paint inside the left margin area, just before the content.
#[allow(clippy::too_many_arguments)]
fn draw_marker(
    measure: &mut dyn TextMeasure,
    painter: &mut dyn Painter,
    b: &BlockBox,
    marker: &Marker,
    x: Px,
    y: Px,
    clip: Option<Rect>,
) {
    let metrics = measure.metrics(b.font.font);
    match marker {
        Marker::Disc | Marker::Square | Marker::Circle => {
            let size = 5;
            let mx = x - 12;
            let my = y + (metrics.ascent - size).max(0) / 2 + 2;
            painter.fill_rect(Rect::new(mx, my, size, size), b.inline.color, clip);
        }
        Marker::Text(text) => {
            let width: Px = text
                .chars()
                .map(|c| measure.advance(b.font.font, c))
                .sum();
            let mut pen = x - width - 6;
            let baseline = y + metrics.ascent;
            for c in text.chars() {
                if let Some((font, glyph)) = measure.glyph(b.font.font, c) {
                    painter.draw_glyph(font, glyph, pen, baseline, b.inline.color, clip);
                }
                pen += measure.advance(b.font.font, c);
            }
        }
    }
}
