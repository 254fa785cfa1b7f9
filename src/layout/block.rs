//! Block formatting: used widths top-down, heights bottom-up, with
//! vertical margin collapsing.

use crate::style::{Length, Px};

use super::view::*;
use super::{
    attach_scroll_pane, flex, inline, is_inline_level, resolve_margins, LayoutContext,
};

/// Lay out one block box against its containing block.  Returns the
/// top margin that collapsed out of the first child, which the caller
/// folds into this box's own top margin.
pub(crate) fn layout_block(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    id: ViewId,
    cb_width: Px,
    cb_height: Option<Px>,
) -> Px {
    layout_block_with(ctx, vt, id, cb_width, cb_height, None, None)
}

/// As `layout_block`, but with the border-box main sizes forced by a
/// flex container.
pub(crate) fn layout_block_with(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    id: ViewId,
    cb_width: Px,
    cb_height: Option<Px>,
    forced_width: Option<Px>,
    forced_height: Option<Px>,
) -> Px {
    let (width_spec, height_spec, margin_spec, edge_h, edge_v, min_w, max_w, min_h, max_h, is_flex) = {
        let b = vt.block(id);
        (
            b.width_spec,
            b.height_spec,
            b.margin_spec,
            b.boundary.border.horizontal() + b.boundary.padding.horizontal(),
            b.boundary.border.vertical() + b.boundary.padding.vertical(),
            b.blockp.min_width,
            b.blockp.max_width,
            b.blockp.min_height,
            b.blockp.max_height,
            b.flex_container.is_some(),
        )
    };

    let margins = resolve_margins(&margin_spec, cb_width);

    let mut content_w = match forced_width {
        Some(w) => w - edge_h,
        None => match width_spec.resolve_opt(cb_width) {
            Some(w) => w,
            None => cb_width - margins[1] - margins[3] - edge_h,
        },
    };
    if let Some(min) = min_w.resolve_opt(cb_width) {
        content_w = content_w.max(min);
    }
    if let Some(max) = max_w.resolve_opt(cb_width) {
        content_w = content_w.min(max);
    }
    content_w = content_w.max(0);

    // Record the content width before descending so children can
    // resolve percentages against it.
    {
        let b = vt.block_mut(id);
        b.width = content_w + edge_h;
    }

    // Percentage heights only resolve when the containing block has a
    // definite height.
    let explicit_h = match forced_height {
        Some(h) => Some(h - edge_v),
        None => match (height_spec, cb_height) {
            (Length::Px(h), _) => Some(h),
            (Length::Percent(p), Some(cb)) => Some((cb as f32 * p / 100.0) as Px),
            _ => None,
        },
    };

    let (children_w, children_h, exported_top) = if is_flex {
        let (w, h) = flex::layout_flex(ctx, vt, id, content_w, explicit_h);
        (w, h, 0)
    } else {
        layout_flow_children(ctx, vt, id, content_w, explicit_h)
    };

    let mut content_h = explicit_h.unwrap_or(children_h);
    if let Some(min) = min_h.resolve_opt(cb_height.unwrap_or(0)) {
        content_h = content_h.max(min);
    }
    if let Some(max) = max_h.resolve_opt(cb_height.unwrap_or(0)) {
        content_h = content_h.min(max);
    }
    content_h = content_h.max(0);

    {
        let b = vt.block_mut(id);
        b.boundary.margin = crate::style::Edges {
            top: margins[0],
            right: margins[1],
            bottom: margins[2],
            left: margins[3],
        };
        b.width = content_w + edge_h;
        b.height = content_h + edge_v;
        b.content_width = children_w;
        b.content_height = children_h;
    }

    attach_scroll_pane(vt, id);
    exported_top
}

/// Stack block children vertically and flow inline runs between them.
/// Returns (children extent width, height, exported top margin).
fn layout_flow_children(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    id: ViewId,
    content_w: Px,
    content_h: Option<Px>,
) -> (Px, Px, Px) {
    let children = vt.child_ids(id);
    let (origin, collapsible_top) = {
        let b = vt.block(id);
        (
            b.content_origin(),
            b.boundary.border.top == 0 && b.boundary.padding.top == 0,
        )
    };

    let mut y = 0;
    let mut max_w = 0;
    let mut prev_margin_bottom = 0;
    let mut first = true;
    let mut exported_top = 0;

    let mut inline_run: Vec<ViewId> = vec![];
    let mut i = 0;
    while i <= children.len() {
        let child = children.get(i).copied();
        let child_is_inline = child.map_or(false, |c| is_inline_level(vt, c));

        if let (Some(c), true) = (child, child_is_inline) {
            inline_run.push(c);
            i += 1;
            continue;
        }

        // Flush any pending inline content as an anonymous area.
        if !inline_run.is_empty() {
            let run = std::mem::take(&mut inline_run);
            let (h, w) = inline::layout_inline_run(
                ctx,
                vt,
                id,
                &run,
                origin.0,
                origin.1 + y + prev_margin_bottom,
                content_w,
            );
            if h > 0 {
                y += prev_margin_bottom + h;
                prev_margin_bottom = 0;
                first = false;
            }
            max_w = max_w.max(w);
        }

        let c = match child {
            None => break,
            Some(c) => c,
        };

        // A block-level child.
        let child_exported = layout_block(ctx, vt, c, content_w, content_h);
        let child_margins = {
            let b = vt.block(c);
            resolve_margins(&b.margin_spec, content_w)
        };
        let effective_top = child_margins[0].max(child_exported);

        let gap = if first && collapsible_top {
            exported_top = exported_top.max(effective_top);
            0
        } else {
            effective_top.max(prev_margin_bottom) - prev_margin_bottom
        };

        let (child_w, child_h) = {
            let b = vt.block(c);
            (b.width, b.height)
        };

        // Auto horizontal margins center an explicitly sized box.
        let margin_spec = vt.block(c).margin_spec;
        let x = if margin_spec[3].is_auto() && margin_spec[1].is_auto() && child_w < content_w {
            origin.0 + (content_w - child_w) / 2
        } else {
            origin.0 + child_margins[3]
        };

        {
            let b = vt.block_mut(c);
            b.x = x;
            b.y = origin.1 + y + prev_margin_bottom + gap;
        }

        y += prev_margin_bottom + gap + child_h;
        prev_margin_bottom = child_margins[2];
        first = false;
        max_w = max_w.max(child_margins[3] + child_w + child_margins[1]);
        i += 1;
    }

    y += prev_margin_bottom;
    (max_w, y, exported_top)
}
