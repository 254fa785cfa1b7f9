//! Interaction tests: hit-testing and the scroll-pane state machine.

use vellum::dom::Document;
use vellum::fonts::FixedMeasure;
use vellum::interact::{hit_test, MouseEvent, MouseEventKind, Outcome, Overlay};
use vellum::layout::{layout_document, LayoutContext, PaneId, ViewTree};
use vellum::parse_html;
use vellum::style::{Cursor, UaStyles};

fn layout(html: &str) -> (Document, ViewTree, FixedMeasure) {
    let doc = parse_html(html);
    let styles = UaStyles;
    let mut measure = FixedMeasure::new();
    let vt = {
        let mut ctx = LayoutContext {
            doc: &doc,
            styles: &styles,
            measure: &mut measure,
            images: None,
            viewport_width: 800,
            viewport_height: 600,
        };
        layout_document(&mut ctx)
    };
    (doc, vt, measure)
}

fn event(kind: MouseEventKind, x: i32, y: i32) -> MouseEvent {
    MouseEvent {
        kind,
        x,
        y,
        button: 0,
        dx: 0,
        dy: 0,
    }
}

fn wheel(x: i32, y: i32, dx: i32, dy: i32) -> MouseEvent {
    MouseEvent {
        kind: MouseEventKind::WheelScroll,
        x,
        y,
        button: 0,
        dx,
        dy,
    }
}

const SCROLL_DOC: &str = "<div style=\"width:200px;height:200px;overflow-y:auto\">\
                          <div style=\"height:600px\"></div></div>";

#[test]
fn scrollbar_drag_moves_proportionally() {
    let (doc, mut vt, mut measure) = layout(SCROLL_DOC);
    let mut overlay = Overlay::new();

    // Button-down on the handle (bar occupies x 176..200, handle y 2..68).
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 180, 40));
    assert!(out.is_empty());
    let pane = vt.pane(PaneId::from_index(0));
    assert!(pane.is_v_dragging);
    assert_eq!(pane.drag_start_y, 40);

    // Drag 80px down: handle travel is 172 - 66 = 106, so the scroll
    // moves 80 * 400 / 106.
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 180, 120));
    assert_eq!(out, vec![Outcome::Repaint]);
    let pane = vt.pane(PaneId::from_index(0));
    assert_eq!(pane.v_scroll, 80 * 400 / 106);
    assert!(pane.v_scroll <= pane.v_max);

    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonUp, 180, 120));
    assert!(out.is_empty());
    assert!(!vt.pane(PaneId::from_index(0)).is_v_dragging);
}

#[test]
fn drag_captures_events_outside_the_pane() {
    let (doc, mut vt, mut measure) = layout(SCROLL_DOC);
    let mut overlay = Overlay::new();

    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 180, 40));
    // The cursor leaves the block entirely; the drag still tracks it.
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 700, 93));
    assert_eq!(out, vec![Outcome::Repaint]);
    let pane = vt.pane(PaneId::from_index(0));
    assert_eq!(pane.v_scroll, 53 * 400 / 106);

    // Dragging far past the end clamps at v_max.
    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 700, 5000));
    let pane = vt.pane(PaneId::from_index(0));
    assert_eq!(pane.v_scroll, pane.v_max);
}

#[test]
fn clicking_the_bar_outside_the_handle_pages() {
    let (doc, mut vt, mut measure) = layout(SCROLL_DOC);
    let mut overlay = Overlay::new();

    // Below the handle: page down by 0.85 of the block height.
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 180, 150));
    assert_eq!(out, vec![Outcome::Repaint]);
    assert_eq!(vt.pane(PaneId::from_index(0)).v_scroll, 170);

    // Above the handle: page back up, clamped at zero.
    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonUp, 180, 150));
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 180, 3));
    assert_eq!(out, vec![Outcome::Repaint]);
    assert_eq!(vt.pane(PaneId::from_index(0)).v_scroll, 0);
}

#[test]
fn wheel_scrolls_by_steps_and_clamps() {
    let (doc, mut vt, mut measure) = layout(SCROLL_DOC);
    let mut overlay = Overlay::new();

    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &wheel(100, 100, 0, 1));
    assert_eq!(out, vec![Outcome::Repaint]);
    assert_eq!(vt.pane(PaneId::from_index(0)).v_scroll, 50);

    // Scrolling up past the top is a no-op, and not a repaint.
    overlay.handle_event(&doc, &mut vt, &mut measure, &wheel(100, 100, 0, -1));
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &wheel(100, 100, 0, -1));
    assert!(out.is_empty());
    let pane = vt.pane(PaneId::from_index(0));
    assert_eq!(pane.v_scroll, 0);
    assert!(pane.v_scroll >= 0 && pane.v_scroll <= pane.v_max);
}

#[test]
fn hovering_the_bar_sets_the_flag() {
    let (doc, mut vt, mut measure) = layout(SCROLL_DOC);
    let mut overlay = Overlay::new();

    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 180, 100));
    assert!(vt.pane(PaneId::from_index(0)).is_v_hovered);

    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 50, 100));
    assert!(!vt.pane(PaneId::from_index(0)).is_v_hovered);
}

#[test]
fn hit_test_finds_the_deepest_view() {
    let (doc, vt, mut measure) = layout(
        "<div style=\"width:300px;height:100px\">\
         <div style=\"width:100px;height:40px\"></div></div>",
    );
    let root = vt.root.unwrap();
    let outer = vt.child_ids(root)[0];
    let inner = vt.child_ids(outer)[0];

    let hit = hit_test(&vt, &doc, &mut measure, 50, 20).unwrap();
    assert_eq!(hit.view, inner);
    // Outside the inner box but inside the outer.
    let hit = hit_test(&vt, &doc, &mut measure, 250, 20).unwrap();
    assert_eq!(hit.view, outer);
    // Outside everything but the body.
    let hit = hit_test(&vt, &doc, &mut measure, 700, 50).unwrap();
    assert_eq!(hit.view, root);
}

#[test]
fn text_hit_reports_the_character_offset() {
    let (doc, vt, mut measure) = layout("<div>abcdef</div>");
    let root = vt.root.unwrap();
    let div = vt.child_ids(root)[0];
    let run = vt.child_ids(div)[0];

    // Fixed advance is 8px; x=20 lands in the third character.
    let hit = hit_test(&vt, &doc, &mut measure, 20, 10).unwrap();
    assert_eq!(hit.view, run);
    assert_eq!(hit.text_offset, Some(2));
}

#[test]
fn click_on_a_link_navigates() {
    let (doc, mut vt, mut measure) =
        layout("<p><a href=\"https://example.com\">link</a></p>");
    let mut overlay = Overlay::new();

    // The paragraph's collapsed top margin puts the line around y=18.
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::Move, 5, 20));
    assert_eq!(out, vec![Outcome::CursorChange(Cursor::Pointer)]);

    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 5, 20));
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonUp, 5, 20));
    assert_eq!(out, vec![Outcome::Navigate("https://example.com".to_string())]);
}

#[test]
fn press_and_release_on_different_views_does_not_navigate() {
    let (doc, mut vt, mut measure) =
        layout("<p><a href=\"https://example.com\">link</a> plain trailing text</p>");
    let mut overlay = Overlay::new();

    overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonDown, 5, 20));
    let out = overlay.handle_event(&doc, &mut vt, &mut measure, &event(MouseEventKind::ButtonUp, 100, 20));
    assert!(out.is_empty());
}

#[test]
fn empty_tree_hits_nothing() {
    let doc = parse_html("<p>text</p>");
    let vt = ViewTree::new();
    let mut measure = FixedMeasure::new();
    assert!(hit_test(&vt, &doc, &mut measure, 10, 10).is_none());
}

#[test]
fn scrolled_content_shifts_hit_targets() {
    let (doc, mut vt, mut measure) = layout(
        "<div style=\"width:200px;height:200px;overflow-y:auto\">\
         <div style=\"height:300px\"></div>\
         <div style=\"height:300px\"></div></div>",
    );
    let root = vt.root.unwrap();
    let outer = vt.child_ids(root)[0];
    let children = vt.child_ids(outer);

    // Unscrolled, y=100 lands in the first child.
    let hit = hit_test(&vt, &doc, &mut measure, 50, 100).unwrap();
    assert_eq!(hit.view, children[0]);

    // Scroll down far enough that the second child is under the cursor.
    let mut overlay = Overlay::new();
    for _ in 0..6 {
        overlay.handle_event(&doc, &mut vt, &mut measure, &wheel(100, 100, 0, 1));
    }
    assert_eq!(vt.pane(PaneId::from_index(0)).v_scroll, 300);
    let hit = hit_test(&vt, &doc, &mut measure, 50, 100).unwrap();
    assert_eq!(hit.view, children[1]);
}
