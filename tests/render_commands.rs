//! Display-list tests: the render walk must emit the right draw
//! commands, in document order, with scroll-pane clipping applied.

use vellum::dom::Document;
use vellum::fonts::FixedMeasure;
use vellum::layout::{layout_document, LayoutContext, Rect, ViewTree};
use vellum::parse_html;
use vellum::render::{render, DrawCommand, RecordingPainter};
use vellum::style::{Color, UaStyles};

fn paint(html: &str) -> (Document, ViewTree, Vec<DrawCommand>) {
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
    let mut painter = RecordingPainter::new();
    render(&doc, &vt, &mut measure, &mut painter);
    (doc, vt, painter.commands)
}

#[test]
fn background_fills_the_border_box() {
    let (_doc, _vt, commands) = paint(
        "<div style=\"width:100px;height:50px;background:red\"></div>",
    );
    assert!(commands.contains(&DrawCommand::FillRect {
        rect: Rect::new(0, 0, 100, 50),
        color: Color::rgb(255, 0, 0),
        clip: None,
    }));
}

#[test]
fn text_emits_one_glyph_per_character() {
    let (_doc, _vt, commands) = paint("<div>hi</div>");
    let glyphs: Vec<_> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Glyph { glyph, x, y, .. } => Some((*glyph, *x, *y)),
            _ => None,
        })
        .collect();
    // Fixed advance 8px; both glyphs share the baseline.
    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs[0], (b'h' as u16, 0, 14));
    assert_eq!(glyphs[1], (b'i' as u16, 8, 14));
}

#[test]
fn spaces_advance_but_do_not_draw() {
    let (_doc, _vt, commands) = paint("<div>a b</div>");
    let xs: Vec<i32> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Glyph { x, .. } => Some(*x),
            _ => None,
        })
        .collect();
    assert_eq!(xs, vec![0, 16]);
}

#[test]
fn borders_are_four_edge_fills() {
    let (_doc, _vt, commands) = paint(
        "<div style=\"width:50px;height:20px;border:3px solid blue\"></div>",
    );
    let blue = Color::rgb(0, 0, 255);
    let edges: Vec<Rect> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { rect, color, .. } if *color == blue => Some(*rect),
            _ => None,
        })
        .collect();
    // 56x26 border box: top, bottom, left, right strips.
    assert_eq!(
        edges,
        vec![
            Rect::new(0, 0, 56, 3),
            Rect::new(0, 23, 56, 3),
            Rect::new(0, 0, 3, 26),
            Rect::new(53, 0, 3, 26),
        ]
    );
}

#[test]
fn scrolled_content_is_clipped_to_the_pane() {
    let (_doc, vt, commands) = paint(
        "<div style=\"width:200px;height:200px;overflow-y:auto\">\
         <div style=\"height:600px;background:green\"></div></div>",
    );
    assert_eq!(vt.panes.len(), 1);
    let green = Color::rgb(0, 128, 0);
    let fill = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::FillRect { rect, color, clip } if *color == green => {
                Some((*rect, *clip))
            }
            _ => None,
        })
        .expect("no fill for the inner block");
    assert_eq!(fill.0, Rect::new(0, 0, 200, 600));
    assert_eq!(fill.1, Some(Rect::new(0, 0, 200, 200)));
}

#[test]
fn underlined_text_draws_a_rule() {
    let (_doc, _vt, commands) = paint("<p><a href=\"x\">go</a></p>");
    // A 1px rule under the 16px-wide run.
    let rules: Vec<Rect> = commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillRect { rect, .. } if rect.h == 1 => Some(*rect),
            _ => None,
        })
        .collect();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].w, 16);
}

#[test]
fn images_blit_with_their_intrinsic_source_rect() {
    let (_doc, _vt, commands) = paint("<img src=\"pic.png\" width=\"40\" height=\"30\">");
    let blit = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::BlitImage { src, dst_rect, .. } => Some((src.clone(), *dst_rect)),
            _ => None,
        })
        .expect("no blit command");
    assert_eq!(blit.0, "pic.png");
    assert_eq!((blit.1.w, blit.1.h), (40, 30));
}

#[test]
fn empty_layout_paints_nothing() {
    let doc = parse_html("<p>text</p>");
    let vt = ViewTree::new();
    let mut measure = FixedMeasure::new();
    let mut painter = RecordingPainter::new();
    render(&doc, &vt, &mut measure, &mut painter);
    assert!(painter.commands.is_empty());
}

#[test]
fn list_markers_paint_in_the_margin_area() {
    let (_doc, vt, commands) = paint("<ul><li>item</li></ul>");
    let root = vt.root.unwrap();
    let ul = vt.child_ids(root)[0];
    let li = vt.child_ids(ul)[0];
    let li_abs_x = vt.block(ul).x + vt.block(li).x;
    // The disc is a small fill to the left of the item's content edge.
    let disc = commands
        .iter()
        .find_map(|c| match c {
            DrawCommand::FillRect { rect, .. } if rect.w == 5 && rect.h == 5 => Some(*rect),
            _ => None,
        })
        .expect("no disc marker");
    assert!(disc.x < li_abs_x);
}
