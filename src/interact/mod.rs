//! The interaction overlay: hit-testing over the view tree and the
//! scroll-pane state machine.
//!
//! During a drag the pane captures every mouse event until button-up,
//! regardless of where the cursor is.  The captured target is a pane
//! id, never a view pointer, so it survives tree rebuilds gracefully.

use crate::dom::{Document, NodeId};
use crate::fonts::TextMeasure;
use crate::layout::*;
use crate::style::{Cursor, Px};

/// How far one wheel step scrolls, in device pixels.
pub const WHEEL_STEP: Px = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MouseEventKind {
    Move,
    ButtonDown,
    ButtonUp,
    WheelScroll,
}

#[derive(Copy, Clone, Debug)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub x: Px,
    pub y: Px,
    pub button: u8,
    pub dx: Px,
    pub dy: Px,
}

/// What the overlay wants the host to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    CursorChange(Cursor),
    Navigate(String),
    Repaint,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HitResult {
    pub view: ViewId,
    /// For text runs, the byte offset of the character under the
    /// cursor within the node's data.
    pub text_offset: Option<usize>,
}

/// Absolute position of a view's origin: the accumulated block offsets
/// of its ancestors, adjusted for any scrolled panes between them.
pub fn absolute_origin(vt: &ViewTree, id: ViewId) -> (Px, Px) {
    let mut x = 0;
    let mut y = 0;
    let mut cur = vt.view(id).parent;
    while let Some(node) = cur {
        if let ViewData::Block(b) = &vt.view(node).data {
            x += b.x;
            y += b.y;
            if let Some(pane) = b.scroller {
                let pane = vt.pane(pane);
                x -= pane.h_scroll;
                y -= pane.v_scroll;
            }
        }
        cur = vt.view(node).parent;
    }
    (x, y)
}

/// Depth-first pre-order hit-test; the deepest hit wins and later
/// siblings beat earlier ones.
pub fn hit_test(
    vt: &ViewTree,
    doc: &Document,
    measure: &mut dyn TextMeasure,
    x: Px,
    y: Px,
) -> Option<HitResult> {
    let root = vt.root?;
    hit_view(vt, doc, measure, root, 0, 0, x, y)
}

fn hit_view(
    vt: &ViewTree,
    doc: &Document,
    measure: &mut dyn TextMeasure,
    id: ViewId,
    block_x: Px,
    block_y: Px,
    x: Px,
    y: Px,
) -> Option<HitResult> {
    match &vt.view(id).data {
        ViewData::Block(b) => {
            let abs_x = block_x + b.x;
            let abs_y = block_y + b.y;
            let rect = Rect::new(abs_x, abs_y, b.width, b.height);

            let (child_x, child_y) = match b.scroller {
                Some(pane) => {
                    let pane = vt.pane(pane);
                    (abs_x - pane.h_scroll, abs_y - pane.v_scroll)
                }
                None => (abs_x, abs_y),
            };

            let mut best = None;
            for child in vt.children(id) {
                if let Some(hit) = hit_view(vt, doc, measure, child, child_x, child_y, x, y) {
                    best = Some(hit);
                }
            }
            if best.is_some() {
                return best;
            }
            if rect.contains(x, y) {
                return Some(HitResult {
                    view: id,
                    text_offset: None,
                });
            }
            None
        }
        ViewData::Inline(_) => {
            // Inline boxes have no geometry of their own; the block
            // offset passes straight through.
            let mut best = None;
            for child in vt.children(id) {
                if let Some(hit) = hit_view(vt, doc, measure, child, block_x, block_y, x, y) {
                    best = Some(hit);
                }
            }
            best
        }
        ViewData::Image(img) => {
            let rect = Rect::new(block_x + img.x, block_y + img.y, img.width, img.height);
            rect.contains(x, y).then_some(HitResult {
                view: id,
                text_offset: None,
            })
        }
        ViewData::Text(run) => {
            let rect = Rect::new(block_x + run.x, block_y + run.y, run.width, run.height);
            if !rect.contains(x, y) {
                return None;
            }
            // Find the character under the cursor with the same
            // advances layout used.
            let text = crate::layout::node_text(doc, run.node);
            let slice = &text[run.start..(run.start + run.len).min(text.len())];
            let mut pen = block_x + run.x;
            let mut offset = run.start;
            for c in slice.chars() {
                let w = measure.advance(run.font, c);
                if x < pen + w {
                    break;
                }
                pen += w;
                offset += c.len_utf8();
            }
            Some(HitResult {
                view: id,
                text_offset: Some(offset),
            })
        }
    }
}

/// Scroll-pane interaction state plus click tracking.
#[derive(Default)]
pub struct Overlay {
    /// Pane capturing mouse input during a drag.
    drag: Option<PaneId>,
    /// View the last button-down landed on, for click navigation.
    pressed: Option<ViewId>,
}

impl Overlay {
    pub fn new() -> Overlay {
        Overlay::default()
    }

    pub fn handle_event(
        &mut self,
        doc: &Document,
        vt: &mut ViewTree,
        measure: &mut dyn TextMeasure,
        event: &MouseEvent,
    ) -> Vec<Outcome> {
        let mut out = vec![];

        // A drag captures everything until button-up.
        if let Some(pane_id) = self.drag {
            match event.kind {
                MouseEventKind::Move => {
                    if drag_update(vt.pane_mut(pane_id), event) {
                        out.push(Outcome::Repaint);
                    }
                }
                MouseEventKind::ButtonUp => {
                    let pane = vt.pane_mut(pane_id);
                    pane.is_h_dragging = false;
                    pane.is_v_dragging = false;
                    pane.drag_start_x = 0;
                    pane.drag_start_y = 0;
                    pane.drag_start_h_scroll = 0;
                    pane.drag_start_v_scroll = 0;
                    self.drag = None;
                }
                _ => (),
            }
            return out;
        }

        if self.handle_scrollbars(vt, event, &mut out) {
            return out;
        }

        match event.kind {
            MouseEventKind::Move => {
                if let Some(hit) = hit_test(vt, doc, measure, event.x, event.y) {
                    out.push(Outcome::CursorChange(view_cursor(vt, hit.view)));
                }
            }
            MouseEventKind::ButtonDown => {
                self.pressed = hit_test(vt, doc, measure, event.x, event.y).map(|h| h.view);
            }
            MouseEventKind::ButtonUp => {
                let pressed = self.pressed.take();
                if let Some(hit) = hit_test(vt, doc, measure, event.x, event.y) {
                    if pressed == Some(hit.view) {
                        if let Some(href) = enclosing_link(doc, vt, hit.view) {
                            out.push(Outcome::Navigate(href));
                        }
                    }
                }
            }
            MouseEventKind::WheelScroll => (),
        }
        out
    }

    /// Returns true when the event was consumed by a scrollbar.
    fn handle_scrollbars(
        &mut self,
        vt: &mut ViewTree,
        event: &MouseEvent,
        out: &mut Vec<Outcome>,
    ) -> bool {
        for i in 0..vt.panes.len() {
            let block_view = vt.panes[i].block;
            let (abs_x, abs_y) = absolute_origin(vt, block_view);
            let (block_x, block_y, width, height) = {
                let b = vt.block(block_view);
                (abs_x + b.x, abs_y + b.y, b.width, b.height)
            };
            let block_rect = Rect::new(block_x, block_y, width, height);

            let pane = &mut vt.panes[i];
            let v_bar = Rect::new(
                block_x + width - SCROLLBAR_SIZE,
                block_y,
                SCROLLBAR_SIZE,
                height,
            );
            let h_bar = Rect::new(
                block_x,
                block_y + height - SCROLLBAR_SIZE,
                width,
                SCROLLBAR_SIZE,
            );

            match event.kind {
                MouseEventKind::Move => {
                    pane.is_v_hovered = pane.has_v && v_bar.contains(event.x, event.y);
                    pane.is_h_hovered = pane.has_h && h_bar.contains(event.x, event.y);
                    if pane.is_v_hovered || pane.is_h_hovered {
                        return true;
                    }
                }
                MouseEventKind::ButtonDown => {
                    if pane.has_v && v_bar.contains(event.x, event.y) {
                        let handle_top = block_y + pane.v_handle_y;
                        if event.y < handle_top {
                            pane.v_scroll = (pane.v_scroll - height * 85 / 100).max(0);
                            pane.update_handles();
                            out.push(Outcome::Repaint);
                        } else if event.y >= handle_top + pane.v_handle_h {
                            pane.v_scroll = (pane.v_scroll + height * 85 / 100).min(pane.v_max);
                            pane.update_handles();
                            out.push(Outcome::Repaint);
                        } else {
                            pane.is_v_dragging = true;
                            pane.drag_start_y = event.y;
                            pane.drag_start_v_scroll = pane.v_scroll;
                            self.drag = Some(PaneId::from_index(i));
                        }
                        return true;
                    }
                    if pane.has_h && h_bar.contains(event.x, event.y) {
                        let handle_left = block_x + pane.h_handle_x;
                        if event.x < handle_left {
                            pane.h_scroll = (pane.h_scroll - width * 85 / 100).max(0);
                            pane.update_handles();
                            out.push(Outcome::Repaint);
                        } else if event.x >= handle_left + pane.h_handle_w {
                            pane.h_scroll = (pane.h_scroll + width * 85 / 100).min(pane.h_max);
                            pane.update_handles();
                            out.push(Outcome::Repaint);
                        } else {
                            pane.is_h_dragging = true;
                            pane.drag_start_x = event.x;
                            pane.drag_start_h_scroll = pane.h_scroll;
                            self.drag = Some(PaneId::from_index(i));
                        }
                        return true;
                    }
                }
                MouseEventKind::WheelScroll => {
                    if block_rect.contains(event.x, event.y) {
                        let mut changed = false;
                        if event.dy != 0 && pane.v_max > 0 {
                            let next =
                                (pane.v_scroll + event.dy * WHEEL_STEP).clamp(0, pane.v_max);
                            changed |= next != pane.v_scroll;
                            pane.v_scroll = next;
                        }
                        if event.dx != 0 && pane.h_max > 0 {
                            let next =
                                (pane.h_scroll + event.dx * WHEEL_STEP).clamp(0, pane.h_max);
                            changed |= next != pane.h_scroll;
                            pane.h_scroll = next;
                        }
                        if changed {
                            pane.update_handles();
                            out.push(Outcome::Repaint);
                        }
                        return true;
                    }
                }
                MouseEventKind::ButtonUp => (),
            }
        }
        false
    }
}

/// Drag positions map linearly from handle travel to scroll range.
fn drag_update(pane: &mut ScrollPane, event: &MouseEvent) -> bool {
    let mut changed = false;
    if pane.is_v_dragging {
        let travel = pane.v_bar_len - pane.v_handle_h;
        if travel > 0 {
            let delta = event.y - pane.drag_start_y;
            let next = (pane.drag_start_v_scroll + delta * pane.v_max / travel).clamp(0, pane.v_max);
            if next != pane.v_scroll {
                pane.v_scroll = next;
                changed = true;
            }
        }
    }
    if pane.is_h_dragging {
        let travel = pane.h_bar_len - pane.h_handle_w;
        if travel > 0 {
            let delta = event.x - pane.drag_start_x;
            let next = (pane.drag_start_h_scroll + delta * pane.h_max / travel).clamp(0, pane.h_max);
            if next != pane.h_scroll {
                pane.h_scroll = next;
                changed = true;
            }
        }
    }
    if changed {
        pane.update_handles();
    }
    changed
}

fn view_cursor(vt: &ViewTree, id: ViewId) -> Cursor {
    match &vt.view(id).data {
        ViewData::Block(b) => b.inline.cursor,
        ViewData::Inline(ib) => ib.inline.cursor,
        ViewData::Text(run) => run.cursor,
        ViewData::Image(img) => img.cursor,
    }
}

/// Walk from the hit view's DOM node up to an `<a href>` ancestor.
fn enclosing_link(doc: &Document, vt: &ViewTree, view: ViewId) -> Option<String> {
    let mut node: Option<NodeId> = vt.view(view).node;
    while let Some(n) = node {
        if doc.is_element_named(n, "a") {
            if let Some(href) = doc.attr(n, "href") {
                return Some(href.to_string());
            }
        }
        node = doc.parent(n);
    }
    None
}
