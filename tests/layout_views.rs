//! Layout tests over the view tree, driven with the fixed-advance
//! measurer so every position is deterministic.

use vellum::dom::Document;
use vellum::fonts::FixedMeasure;
use vellum::layout::{layout_document, BlockKind, LayoutContext, Marker, ViewData, ViewId, ViewTree};
use vellum::parse_html;
use vellum::style::UaStyles;

fn layout(html: &str, width: i32, height: i32) -> (Document, ViewTree) {
    let doc = parse_html(html);
    let styles = UaStyles;
    let mut measure = FixedMeasure::new();
    let vt = {
        let mut ctx = LayoutContext {
            doc: &doc,
            styles: &styles,
            measure: &mut measure,
            images: None,
            viewport_width: width,
            viewport_height: height,
        };
        layout_document(&mut ctx)
    };
    (doc, vt)
}

fn block_rect(vt: &ViewTree, id: ViewId) -> (i32, i32, i32, i32) {
    let b = vt.block(id);
    (b.x, b.y, b.width, b.height)
}

/// Every positioned box in pre-order, for idempotence comparisons.
fn geometry(vt: &ViewTree) -> Vec<(i32, i32, i32, i32)> {
    let mut out = vec![];
    let mut stack: Vec<ViewId> = vt.root.into_iter().collect();
    while let Some(id) = stack.pop() {
        match &vt.view(id).data {
            ViewData::Block(b) => out.push((b.x, b.y, b.width, b.height)),
            ViewData::Text(r) => out.push((r.x, r.y, r.width, r.height)),
            ViewData::Image(i) => out.push((i.x, i.y, i.width, i.height)),
            ViewData::Inline(_) => (),
        }
        let children: Vec<ViewId> = vt.children(id).collect();
        stack.extend(children.into_iter().rev());
    }
    out
}

#[test]
fn flex_wrap_and_alignment() {
    // Three basis-200 items in a 500px row container: two lines.
    let (_doc, vt) = layout(
        "<div style=\"display:flex;width:500px;height:300px;flex-wrap:wrap;\
         justify-content:space-around;align-items:center;align-content:space-between\">\
         <div style=\"flex-basis:200px;height:50px\"></div>\
         <div style=\"flex-basis:200px;height:50px\"></div>\
         <div style=\"flex-basis:200px;height:50px\"></div>\
         </div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let container = vt.child_ids(root)[0];
    assert_eq!(block_rect(&vt, container).2, 500);
    let items = vt.child_ids(container);
    assert_eq!(items.len(), 3);

    // Line 1 holds items 0 and 1 (400 <= 500); free space 100 split
    // space-around: half-gap 25 at each end, 50 between.
    assert_eq!(block_rect(&vt, items[0]), (25, 0, 200, 50));
    assert_eq!(block_rect(&vt, items[1]), (275, 0, 200, 50));
    // Line 2 is pushed to the bottom by align-content: space-between.
    assert_eq!(block_rect(&vt, items[2]), (150, 250, 200, 50));

    // No line overflows the container main size.
    for line in [&items[0..2], &items[2..3]] {
        let sum: i32 = line.iter().map(|&i| vt.block(i).width).sum();
        assert!(sum <= 500);
    }
}

#[test]
fn flex_column_stacks_items() {
    let (_doc, vt) = layout(
        "<div style=\"display:flex;flex-direction:column;width:300px;height:400px\">\
         <div style=\"height:50px\"></div>\
         <div style=\"height:50px\"></div>\
         </div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let container = vt.child_ids(root)[0];
    let items = vt.child_ids(container);
    // Stretch fills the cross axis; main positions stack.
    assert_eq!(block_rect(&vt, items[0]), (0, 0, 300, 50));
    assert_eq!(block_rect(&vt, items[1]), (0, 50, 300, 50));
}

#[test]
fn flex_grow_distributes_free_space() {
    let (_doc, vt) = layout(
        "<div style=\"display:flex;width:600px\">\
         <div style=\"flex-basis:100px;flex-grow:1;height:10px\"></div>\
         <div style=\"flex-basis:100px;flex-grow:3;height:10px\"></div>\
         </div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let container = vt.child_ids(root)[0];
    let items = vt.child_ids(container);
    // free = 400; 1:3 split adds 100 and 300.
    assert_eq!(vt.block(items[0]).width, 200);
    assert_eq!(vt.block(items[1]).width, 400);
    assert_eq!(vt.block(items[1]).x, 200);
}

#[test]
fn border_box_identity() {
    let (_doc, vt) = layout(
        "<div style=\"width:100px;height:40px;padding:5px;border:2px solid black;margin:7px\">\
         </div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let div = vt.child_ids(root)[0];
    let b = vt.block(div);
    // border-box = content + padding + border on each axis.
    assert_eq!(b.width, 100 + 2 * 5 + 2 * 2);
    assert_eq!(b.height, 40 + 2 * 5 + 2 * 2);
    assert_eq!(b.content_box(), (100, 40));
    assert_eq!(b.x, 7);
}

#[test]
fn sibling_margins_collapse_to_the_maximum() {
    let (_doc, vt) = layout(
        "<div style=\"height:30px;margin-bottom:20px\"></div>\
         <div style=\"height:30px;margin-top:10px\"></div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let children = vt.child_ids(root);
    assert_eq!(vt.block(children[0]).y, 0);
    // Gap is max(20, 10), not 30.
    assert_eq!(vt.block(children[1]).y, 30 + 20);
}

#[test]
fn first_child_top_margin_collapses_into_parent() {
    let (_doc, vt) = layout("<p>text</p>", 800, 600);
    let root = vt.root.unwrap();
    // The <p>'s 16px default top margin moves to the body.
    assert_eq!(vt.block(root).y, 16);
    assert_eq!(vt.block(vt.child_ids(root)[0]).y, 0);
}

#[test]
fn layout_is_idempotent() {
    let html = "<h1>Title</h1><p>some wrapped text in a paragraph</p>\
                <div style=\"display:flex\"><div style=\"flex-grow:1\">a</div>\
                <div style=\"flex-grow:1\">b</div></div>\
                <ul><li>one</li><li>two</li></ul>";
    let (_doc1, vt1) = layout(html, 400, 300);
    let (_doc2, vt2) = layout(html, 400, 300);
    assert_eq!(geometry(&vt1), geometry(&vt2));
}

#[test]
fn inline_text_wraps_at_break_opportunities() {
    // Fixed advance: 8px per glyph at 16px font.  Words are 32px,
    // spaces 8px, so "aaaa bbbb" fills 72 of 80 and "cccc" wraps.
    let (_doc, vt) = layout(
        "<div style=\"width:80px\">aaaa bbbb cccc</div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let div = vt.child_ids(root)[0];
    let runs: Vec<ViewId> = vt
        .child_ids(div)
        .into_iter()
        .filter(|&c| matches!(vt.view(c).data, ViewData::Text(_)))
        .collect();
    assert_eq!(runs.len(), 2);
    let first = match &vt.view(runs[0]).data {
        ViewData::Text(r) => r,
        _ => unreachable!(),
    };
    let second = match &vt.view(runs[1]).data {
        ViewData::Text(r) => r,
        _ => unreachable!(),
    };
    assert_eq!((first.start, first.len, first.width), (0, 9, 72));
    // The breaking space is consumed; the second run starts below.
    assert_eq!((second.start, second.len, second.width), (10, 4, 32));
    assert!(second.y > first.y);
    assert_eq!(second.x, 0);
}

#[test]
fn text_align_center_shifts_the_line() {
    let (_doc, vt) = layout(
        "<div style=\"width:100px;text-align:center\">abcd</div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let div = vt.child_ids(root)[0];
    let run = vt.child_ids(div)[0];
    match &vt.view(run).data {
        // 32px of text in 100px: centered at (100-32)/2.
        ViewData::Text(r) => assert_eq!(r.x, 34),
        _ => panic!("expected a text run"),
    }
}

#[test]
fn display_none_produces_no_views() {
    let (_doc, vt) = layout(
        "<div style=\"display:none\"><p>hidden</p></div><p>shown</p>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let children = vt.child_ids(root);
    assert_eq!(children.len(), 1);
    let run = vt.child_ids(children[0])[0];
    match &vt.view(run).data {
        ViewData::Text(r) => assert_eq!(r.len, "shown".len()),
        _ => panic!("expected a text run"),
    }
}

#[test]
fn zero_viewport_yields_an_empty_tree() {
    let (_doc, vt) = layout("<p>text</p>", 0, 600);
    assert!(vt.root.is_none());
    assert!(vt.is_empty());
}

#[test]
fn list_items_are_numbered_with_markers() {
    let (_doc, vt) = layout(
        "<ol style=\"list-style-type:lower-roman\">\
         <li>a</li><li>b</li><li>c</li><li>d</li></ol>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let ol = vt.child_ids(root)[0];
    assert_eq!(vt.block(ol).kind, BlockKind::List);
    let items = vt.child_ids(ol);
    assert_eq!(items.len(), 4);
    let fourth = vt.block(items[3]);
    assert_eq!(fourth.kind, BlockKind::ListItem);
    assert_eq!(fourth.list_index, 4);
    assert_eq!(fourth.marker, Some(Marker::Text("iv".to_string())));
}

#[test]
fn unstyled_list_gets_disc_markers() {
    let (_doc, vt) = layout("<ul><li>a</li></ul>", 800, 600);
    let root = vt.root.unwrap();
    let ul = vt.child_ids(root)[0];
    let li = vt.child_ids(ul)[0];
    assert_eq!(vt.block(li).marker, Some(Marker::Disc));
}

#[test]
fn image_attributes_size_the_box() {
    let (_doc, vt) = layout("<img src=\"x.png\" width=\"40\" height=\"30\">", 800, 600);
    let root = vt.root.unwrap();
    let img = vt.child_ids(root)[0];
    match &vt.view(img).data {
        ViewData::Image(i) => {
            assert_eq!((i.width, i.height), (40, 30));
            assert_eq!(i.src, "x.png");
        }
        _ => panic!("expected an image box"),
    }
}

#[test]
fn overflow_attaches_a_scroll_pane() {
    let (_doc, vt) = layout(
        "<div style=\"width:200px;height:200px;overflow-y:auto\">\
         <div style=\"height:600px\"></div></div>",
        800,
        600,
    );
    let root = vt.root.unwrap();
    let outer = vt.child_ids(root)[0];
    let pane_id = vt.block(outer).scroller.expect("no scroll pane");
    let pane = vt.pane(pane_id);
    assert!(pane.has_v);
    assert!(!pane.has_h);
    assert_eq!(pane.v_max, 400);
    assert_eq!(pane.v_bar_len, 172);
    assert_eq!(pane.v_handle_h, 66);
    assert_eq!(pane.v_scroll, 0);
}
