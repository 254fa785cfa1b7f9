//! The layout engine: view construction from the DOM, then box layout
//! in block, inline, and flex formatting contexts.

use crate::dom::{Document, NodeData, NodeId};
use crate::fonts::TextMeasure;
use crate::images::ImageCache;
use crate::markdown::EMOJI;
use crate::style::{Display, Length, Px, Style, StyleResolver, WhiteSpace};

mod block;
mod flex;
mod inline;
mod list;
pub mod view;

pub use view::*;

/// Everything layout needs besides the document itself.
pub struct LayoutContext<'a> {
    pub doc: &'a Document,
    pub styles: &'a dyn StyleResolver,
    pub measure: &'a mut dyn TextMeasure,
    pub images: Option<&'a ImageCache>,
    pub viewport_width: Px,
    pub viewport_height: Px,
}

/// Lay out the document into a fresh view tree.  A degenerate viewport
/// produces an empty tree.
pub fn layout_document(ctx: &mut LayoutContext<'_>) -> ViewTree {
    let mut vt = ViewTree::new();
    if ctx.viewport_width <= 0 || ctx.viewport_height <= 0 {
        return vt;
    }
    let root_node = match ctx.doc.body().or_else(|| ctx.doc.html()) {
        Some(node) => node,
        None => return vt,
    };
    let style = ctx.styles.style_of(ctx.doc, root_node, None);
    let root = match build_element(ctx, &mut vt, root_node, &style) {
        Some(root) if vt.is_block(root) => root,
        _ => return vt,
    };
    vt.root = Some(root);

    let exported = block::layout_block(ctx, &mut vt, root, ctx.viewport_width, Some(ctx.viewport_height));
    let margins = resolve_margins(&vt.block(root).margin_spec, ctx.viewport_width);
    let b = vt.block_mut(root);
    b.x = margins[3];
    b.y = margins[0].max(exported);
    vt
}

/// Re-running layout on the same document must be a pure function of
/// the inputs; this just builds a new tree.
pub fn relayout(ctx: &mut LayoutContext<'_>) -> ViewTree {
    layout_document(ctx)
}

pub(crate) fn resolve_margins(spec: &[Length; 4], cb_width: Px) -> [Px; 4] {
    [
        spec[0].resolve(cb_width, 0),
        spec[1].resolve(cb_width, 0),
        spec[2].resolve(cb_width, 0),
        spec[3].resolve(cb_width, 0),
    ]
}

/// The character data a text-like node contributes to layout.
pub(crate) fn node_text<'d>(doc: &'d Document, node: NodeId) -> &'d str {
    match doc.data(node) {
        NodeData::Text(text) => text,
        NodeData::Symbol(name) => EMOJI.get(name.as_ref()).copied().unwrap_or("\u{fffd}"),
        _ => "",
    }
}

fn font_props(ctx: &mut LayoutContext<'_>, style: &Style) -> FontProps {
    let f = &style.font;
    FontProps {
        font: ctx.measure.resolve_font(&f.family, f.bold, f.italic, f.size),
        family: f.family.clone(),
        size: f.size,
        bold: f.bold,
        italic: f.italic,
        underline: f.underline,
        strikethrough: f.strikethrough,
    }
}

fn boundary_of(style: &Style) -> Boundary {
    Boundary {
        margin: Default::default(),
        padding: style.padding,
        border: if style.border_style == crate::style::BorderStyle::None {
            Default::default()
        } else {
            style.border_width
        },
        border_color: style.border_color,
        border_style: style.border_style,
        radius: style.radius,
        background: style.background_color,
        background_image: style.background_image.clone(),
    }
}

fn inline_props(style: &Style) -> InlineProps {
    InlineProps {
        color: style.color,
        cursor: style.cursor,
        vertical_align: style.vertical_align,
    }
}

fn flex_item_props(style: &Style) -> FlexItemProps {
    FlexItemProps {
        basis: style.flex_basis,
        grow: style.flex_grow,
        shrink: style.flex_shrink,
        align_self: style.align_self,
        order: style.order,
    }
}

fn block_props(style: &Style) -> BlockProps {
    BlockProps {
        text_align: style.text_align,
        white_space: style.white_space,
        line_height: style.line_height,
        text_indent: style.text_indent,
        min_width: style.min_width,
        max_width: style.max_width,
        min_height: style.min_height,
        max_height: style.max_height,
        list_style_type: style.list_style_type,
    }
}

/// First pass: allocate the matching view for each element whose
/// display is not `none`, and link the tree together.
fn build_element(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    node: NodeId,
    style: &Style,
) -> Option<ViewId> {
    if style.display == Display::None {
        return None;
    }

    // Replaced elements become image boxes no matter the display.
    if ctx.doc.is_element_named(node, "img") || ctx.doc.is_element_named(node, "iframe") {
        return Some(build_image(ctx, vt, node, style));
    }

    if style.display == Display::Inline {
        let is_br = ctx.doc.is_element_named(node, "br");
        let view = vt.alloc(
            Some(node),
            ViewData::Inline(Box::new(InlineBox {
                font: font_props(ctx, style),
                boundary: boundary_of(style),
                inline: inline_props(style),
                flex_item: flex_item_props(style),
                is_br,
            })),
        );
        if !is_br {
            build_children(ctx, vt, node, view, style);
        }
        return Some(view);
    }

    let kind = match (style.display, ctx.doc.tag_name(node).map(|t| t.as_ref())) {
        (Display::InlineBlock, _) => BlockKind::InlineBlock,
        (Display::ListItem, _) => BlockKind::ListItem,
        (_, Some("ul")) | (_, Some("ol")) => BlockKind::List,
        _ => BlockKind::Block,
    };

    let flex_container = if style.display == Display::Flex {
        Some(FlexContainerProps {
            direction: style.flex_direction,
            wrap: style.flex_wrap,
            justify_content: style.justify_content,
            align_items: style.align_items,
            align_content: style.align_content,
        })
    } else {
        None
    };

    let view = vt.alloc(
        Some(node),
        ViewData::Block(Box::new(BlockBox {
            kind,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            content_width: 0,
            content_height: 0,
            font: font_props(ctx, style),
            boundary: boundary_of(style),
            inline: inline_props(style),
            blockp: block_props(style),
            overflow_x: style.overflow_x,
            overflow_y: style.overflow_y,
            flex_container,
            flex_item: flex_item_props(style),
            width_spec: style.width,
            height_spec: style.height,
            margin_spec: style.margin,
            list_index: 0,
            marker: None,
            scroller: None,
        })),
    );
    build_children(ctx, vt, node, view, style);

    if kind == BlockKind::List {
        list::number_items(vt, view);
    }
    Some(view)
}

fn build_image(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    node: NodeId,
    style: &Style,
) -> ViewId {
    let src = ctx.doc.attr(node, "src").unwrap_or("").to_string();
    let entry = ctx.images.and_then(|c| c.lookup(&src));
    let (mut iw, mut ih) = entry.as_ref().map(|e| e.size()).unwrap_or((0, 0));
    let is_picture = matches!(
        entry.as_deref(),
        Some(crate::images::ImageData::Picture { .. })
    );

    let attr_px = |name: &str| -> Option<Px> {
        ctx.doc
            .attr(node, name)
            .and_then(|v| v.trim().parse::<Px>().ok())
    };
    if let Some(w) = attr_px("width") {
        ih = if iw > 0 { w * ih / iw } else { ih };
        iw = w;
    }
    if let Some(h) = attr_px("height") {
        ih = h;
    }

    let mut width = style
        .width
        .resolve_opt(ctx.viewport_width)
        .unwrap_or(iw);
    let mut height = style
        .height
        .resolve_opt(ctx.viewport_height)
        .unwrap_or(0)
        .max(0);
    if height == 0 {
        height = if width != iw && iw > 0 {
            width * ih / iw
        } else {
            ih
        };
    }
    if width == 0 && height != 0 && ih > 0 {
        width = height * iw / ih;
    }

    vt.alloc(
        Some(node),
        ViewData::Image(Box::new(ImageBox {
            src,
            intrinsic_width: iw,
            intrinsic_height: ih,
            x: 0,
            y: 0,
            width,
            height,
            is_picture,
            cursor: style.cursor,
        })),
    )
}

fn build_children(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    node: NodeId,
    parent_view: ViewId,
    parent_style: &Style,
) {
    for &child in ctx.doc.children(node).to_vec().iter() {
        match ctx.doc.data(child) {
            NodeData::Text(text) => {
                if text.is_empty() {
                    continue;
                }
                let view = build_text(ctx, vt, child, text.len(), parent_style);
                vt.append_child(parent_view, view);
            }
            NodeData::Symbol(_) => {
                let len = node_text(ctx.doc, child).len();
                let view = build_text(ctx, vt, child, len, parent_style);
                vt.append_child(parent_view, view);
            }
            NodeData::Element { .. } => {
                let style = ctx.styles.style_of(ctx.doc, child, Some(parent_style));
                if let Some(view) = build_element(ctx, vt, child, &style) {
                    vt.append_child(parent_view, view);
                }
            }
            NodeData::Comment(_) | NodeData::Document => (),
        }
    }
}

fn build_text(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    node: NodeId,
    len: usize,
    parent_style: &Style,
) -> ViewId {
    let f = &parent_style.font;
    let font = ctx.measure.resolve_font(&f.family, f.bold, f.italic, f.size);
    vt.alloc(
        Some(node),
        ViewData::Text(Box::new(TextRun {
            node,
            start: 0,
            len,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            font,
            color: parent_style.color,
            cursor: parent_style.cursor,
            underline: f.underline,
            strikethrough: f.strikethrough,
        })),
    )
}

/// A view participates in inline layout rather than block stacking.
pub(crate) fn is_inline_level(vt: &ViewTree, id: ViewId) -> bool {
    match &vt.view(id).data {
        ViewData::Inline(_) | ViewData::Text(_) | ViewData::Image(_) => true,
        ViewData::Block(b) => b.kind == BlockKind::InlineBlock,
    }
}

/// Attach a scroll pane when overflow is enabled and the content
/// exceeds the content box.
pub(crate) fn attach_scroll_pane(vt: &mut ViewTree, id: ViewId) {
    let (need_h, need_v, width, height, cbw, cbh, origin, content_w, content_h) = {
        let b = vt.block(id);
        let (cbw, cbh) = b.content_box();
        (
            b.overflow_x.is_scrollable() && b.content_width > cbw,
            b.overflow_y.is_scrollable() && b.content_height > cbh,
            b.width,
            b.height,
            cbw,
            cbh,
            b.content_origin(),
            b.content_width,
            b.content_height,
        )
    };
    if !need_h && !need_v {
        return;
    }

    let h_bar_len = width - SCROLLBAR_SIZE - 2 * SCROLL_BORDER_MAIN;
    let v_bar_len = height - SCROLLBAR_SIZE - 2 * SCROLL_BORDER_MAIN;
    let h_handle_w = if content_w > 0 {
        (width * cbw / content_w).max(MIN_HANDLE_SIZE)
    } else {
        MIN_HANDLE_SIZE
    };
    let v_handle_h = if content_h > 0 {
        (height * cbh / content_h).max(MIN_HANDLE_SIZE)
    } else {
        MIN_HANDLE_SIZE
    };

    let mut pane = ScrollPane {
        block: id,
        clip: Rect::new(origin.0, origin.1, cbw, cbh),
        view_width: width,
        view_height: height,
        has_h: need_h,
        has_v: need_v,
        h_scroll: 0,
        v_scroll: 0,
        h_max: (content_w - cbw).max(0),
        v_max: (content_h - cbh).max(0),
        h_bar_len,
        v_bar_len,
        h_handle_x: 0,
        h_handle_w,
        v_handle_y: 0,
        v_handle_h,
        is_h_hovered: false,
        is_v_hovered: false,
        is_h_dragging: false,
        is_v_dragging: false,
        drag_start_x: 0,
        drag_start_y: 0,
        drag_start_h_scroll: 0,
        drag_start_v_scroll: 0,
    };
    pane.update_handles();
    let pane_id = vt.alloc_pane(pane);
    vt.block_mut(id).scroller = Some(pane_id);
}

pub(crate) fn resolve_line_height(spec: Length, metrics_line: Px) -> Px {
    match spec {
        Length::Auto => metrics_line,
        other => other.resolve(metrics_line, metrics_line),
    }
}

pub(crate) fn collapses_whitespace(ws: WhiteSpace) -> bool {
    ws != WhiteSpace::Pre
}
