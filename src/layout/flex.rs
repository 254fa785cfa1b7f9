//! Flex formatting: line collection, flexible length resolution, and
//! main/cross positioning.

use crate::style::{
    AlignContent, AlignItems, FlexDirection, FlexWrap, JustifyContent, Length, Px,
};

use super::view::*;
use super::{block, resolve_margins, LayoutContext};

struct Item {
    view: ViewId,
    /// Resolved main size (border box), after flexing.
    main: Px,
    cross: Px,
    margins: [Px; 4],
    main_margin_auto: (bool, bool),
    cross_margin_auto: (bool, bool),
    grow: f32,
    shrink: f32,
    align_self: Option<AlignItems>,
    has_explicit_cross: bool,
    main_pos: Px,
    cross_pos: Px,
}

struct Line {
    items: Vec<usize>,
    main_used: Px,
    cross_size: Px,
    cross_pos: Px,
}

/// Lay out the container's children as flex items.  Returns the
/// children extent in content-box coordinates.
pub(crate) fn layout_flex(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    container: ViewId,
    content_w: Px,
    content_h: Option<Px>,
) -> (Px, Px) {
    let props = *vt
        .block(container)
        .flex_container
        .as_ref()
        .expect("not a flex container");
    let is_row = props.direction.is_row();

    let main_avail: Option<Px> = if is_row { Some(content_w) } else { content_h };
    let cross_avail: Option<Px> = if is_row { content_h } else { Some(content_w) };

    // Gather the flex items: every block-level child view.  Text runs
    // directly inside a flex container are not laid out.
    let child_views: Vec<ViewId> = vt
        .child_ids(container)
        .into_iter()
        .filter(|&c| vt.is_block(c) || matches!(vt.view(c).data, ViewData::Image(_)))
        .collect();

    let mut items: Vec<Item> = vec![];
    for view in child_views {
        items.push(measure_item(ctx, vt, view, content_w, content_h, is_row));
    }
    items.sort_by_key(|item| match &vt.view(item.view).data {
        ViewData::Block(b) => b.flex_item.order,
        _ => 0,
    });

    // Collect into lines.
    let mut lines: Vec<Line> = vec![];
    let wrap = props.wrap != FlexWrap::NoWrap && main_avail.is_some();
    {
        let mut current: Vec<usize> = vec![];
        let mut used = 0;
        for (i, item) in items.iter().enumerate() {
            let outer = item.main + item_main_margins(item, is_row);
            if wrap && !current.is_empty() && used + outer > main_avail.unwrap() {
                lines.push(Line {
                    items: std::mem::take(&mut current),
                    main_used: used,
                    cross_size: 0,
                    cross_pos: 0,
                });
                used = 0;
            }
            current.push(i);
            used += outer;
        }
        if !current.is_empty() {
            lines.push(Line {
                items: current,
                main_used: used,
                cross_size: 0,
                cross_pos: 0,
            });
        }
    }

    // Resolve flexible lengths per line.
    for line in &mut lines {
        if let Some(avail) = main_avail {
            let free = avail - line.main_used;
            let total_grow: f32 = line.items.iter().map(|&i| items[i].grow).sum();
            let total_shrink: f32 = line.items.iter().map(|&i| items[i].shrink).sum();
            if free > 0 && total_grow > 0.0 {
                for &i in &line.items {
                    let item = &mut items[i];
                    if item.grow > 0.0 {
                        item.main += (free as f32 * item.grow / total_grow) as Px;
                    }
                }
            } else if free < 0 && total_shrink > 0.0 {
                let deficit = -free;
                for &i in &line.items {
                    let item = &mut items[i];
                    if item.shrink > 0.0 {
                        let cut = (deficit as f32 * item.shrink / total_shrink) as Px;
                        item.main = (item.main - cut).max(0);
                    }
                }
            }
            line.main_used = line
                .items
                .iter()
                .map(|&i| items[i].main + item_main_margins(&items[i], is_row))
                .sum();
        }

        // Re-lay items at their final main size and find line cross.
        for &i in &line.items {
            relayout_item(ctx, vt, &mut items[i], content_w, content_h, is_row, None);
            line.cross_size = line.cross_size.max(
                items[i].cross + item_cross_margins(&items[i], is_row),
            );
        }
    }

    // Cross-axis packing of the lines.
    let total_cross: Px = lines.iter().map(|l| l.cross_size).sum();
    let cross_extent = cross_avail.unwrap_or(total_cross);
    let free_cross = (cross_extent - total_cross).max(0);
    let n_lines = lines.len() as Px;
    let (mut cross_cursor, between, stretch_add) = if n_lines == 0 {
        (0, 0, 0)
    } else {
        match props.align_content {
            AlignContent::FlexStart => (0, 0, 0),
            AlignContent::FlexEnd => (free_cross, 0, 0),
            AlignContent::Center => (free_cross / 2, 0, 0),
            AlignContent::SpaceBetween if n_lines > 1 => (0, free_cross / (n_lines - 1), 0),
            AlignContent::SpaceBetween => (0, 0, 0),
            AlignContent::SpaceAround => (free_cross / (2 * n_lines), free_cross / n_lines, 0),
            AlignContent::Stretch => (0, 0, free_cross / n_lines),
        }
    };
    for line in &mut lines {
        line.cross_size += stretch_add;
        line.cross_pos = cross_cursor;
        cross_cursor += line.cross_size + between;
    }

    // Main-axis positioning, then per-item cross alignment.
    for line in &lines {
        let mut order: Vec<usize> = line.items.clone();
        if props.direction.is_reverse() {
            order.reverse();
        }

        let avail = main_avail.unwrap_or(line.main_used);
        let mut free = avail - line.main_used;

        // Auto margins on the main axis absorb free space first.
        if free > 0 {
            let auto_count: Px = order
                .iter()
                .map(|&i| {
                    let (a, b) = items[i].main_margin_auto;
                    (a as Px) + (b as Px)
                })
                .sum();
            if auto_count > 0 {
                let per = free / auto_count;
                for &i in &order {
                    let (a, b) = items[i].main_margin_auto;
                    let item = &mut items[i];
                    if is_row {
                        if a {
                            item.margins[3] += per;
                        }
                        if b {
                            item.margins[1] += per;
                        }
                    } else {
                        if a {
                            item.margins[0] += per;
                        }
                        if b {
                            item.margins[2] += per;
                        }
                    }
                }
                free = 0;
            }
        }

        let n = order.len() as Px;
        let (mut pos, gap) = if free <= 0 {
            (0, 0)
        } else {
            match props.justify_content {
                JustifyContent::FlexStart => (0, 0),
                JustifyContent::FlexEnd => (free, 0),
                JustifyContent::Center => (free / 2, 0),
                JustifyContent::SpaceBetween if n > 1 => (0, free / (n - 1)),
                JustifyContent::SpaceBetween => (0, 0),
                JustifyContent::SpaceAround => (free / (2 * n), free / n),
                JustifyContent::SpaceEvenly => (free / (n + 1), free / (n + 1)),
            }
        };

        for &i in &order {
            let lead = item_main_margin_lead(&items[i], is_row);
            items[i].main_pos = pos + lead;
            pos += items[i].main + item_main_margins(&items[i], is_row) + gap;
        }

        // Cross alignment within the line.
        for &i in &order {
            let align = items[i]
                .align_self
                .unwrap_or(props.align_items);
            let outer = items[i].cross + item_cross_margins(&items[i], is_row);
            let slack = line.cross_size - outer;
            let (auto_a, auto_b) = items[i].cross_margin_auto;
            let offset = if auto_a && auto_b {
                slack / 2
            } else {
                match align {
                    AlignItems::FlexStart | AlignItems::Baseline => 0,
                    AlignItems::FlexEnd => slack,
                    AlignItems::Center => slack / 2,
                    AlignItems::Stretch => {
                        if !items[i].has_explicit_cross && slack > 0 {
                            let target = line.cross_size - item_cross_margins(&items[i], is_row);
                            relayout_item(
                                ctx,
                                vt,
                                &mut items[i],
                                content_w,
                                content_h,
                                is_row,
                                Some(target),
                            );
                        }
                        0
                    }
                }
            };
            items[i].cross_pos = line.cross_pos + offset + item_cross_margin_lead(&items[i], is_row);
        }
    }

    // Write positions back, translating main/cross to x/y relative to
    // the container's box origin.
    let origin = vt.block(container).content_origin();
    let mut extent_main = 0;
    for item in &items {
        let (x, y) = if is_row {
            (origin.0 + item.main_pos, origin.1 + item.cross_pos)
        } else {
            (origin.0 + item.cross_pos, origin.1 + item.main_pos)
        };
        match &mut vt.view_mut(item.view).data {
            ViewData::Block(b) => {
                b.x = x;
                b.y = y;
            }
            ViewData::Image(img) => {
                img.x = x;
                img.y = y;
            }
            _ => (),
        }
        extent_main = extent_main.max(item.main_pos + item.main);
    }
    let extent_cross = lines
        .last()
        .map(|l| l.cross_pos + l.cross_size)
        .unwrap_or(0);

    if is_row {
        (extent_main, extent_cross)
    } else {
        (extent_cross, extent_main)
    }
}

fn item_main_margins(item: &Item, is_row: bool) -> Px {
    if is_row {
        item.margins[1] + item.margins[3]
    } else {
        item.margins[0] + item.margins[2]
    }
}

fn item_main_margin_lead(item: &Item, is_row: bool) -> Px {
    if is_row {
        item.margins[3]
    } else {
        item.margins[0]
    }
}

fn item_cross_margins(item: &Item, is_row: bool) -> Px {
    if is_row {
        item.margins[0] + item.margins[2]
    } else {
        item.margins[1] + item.margins[3]
    }
}

fn item_cross_margin_lead(item: &Item, is_row: bool) -> Px {
    if is_row {
        item.margins[0]
    } else {
        item.margins[3]
    }
}

/// Determine the hypothetical main size: the flex basis when explicit,
/// otherwise the intrinsic size from a content measurement.
fn measure_item(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    view: ViewId,
    content_w: Px,
    content_h: Option<Px>,
    is_row: bool,
) -> Item {
    if let ViewData::Image(img) = &vt.view(view).data {
        let (main, cross) = if is_row {
            (img.width, img.height)
        } else {
            (img.height, img.width)
        };
        return Item {
            view,
            main,
            cross,
            margins: [0; 4],
            main_margin_auto: (false, false),
            cross_margin_auto: (false, false),
            grow: 0.0,
            shrink: 1.0,
            align_self: None,
            has_explicit_cross: true,
            main_pos: 0,
            cross_pos: 0,
        };
    }

    let (fi, margin_spec, width_spec, height_spec) = {
        let b = vt.block(view);
        (b.flex_item, b.margin_spec, b.width_spec, b.height_spec)
    };
    let margins = resolve_margins(&margin_spec, content_w);
    let (main_spec, cross_spec) = if is_row {
        (width_spec, height_spec)
    } else {
        (height_spec, width_spec)
    };
    let main_cb = if is_row { content_w } else { content_h.unwrap_or(0) };

    let hypothetical = fi
        .basis
        .resolve_opt(main_cb)
        .or_else(|| main_spec.resolve_opt(main_cb));

    let main = match hypothetical {
        Some(m) => m,
        None => {
            // Content measurement: lay out unconstrained and read back
            // the resulting size.
            block::layout_block(ctx, vt, view, content_w, content_h);
            let b = vt.block(view);
            if is_row {
                // Shrink to the content extent rather than filling.
                let edge = b.boundary.border.horizontal() + b.boundary.padding.horizontal();
                b.content_width.min(b.width - edge) + edge
            } else {
                b.height
            }
        }
    };

    let main_margin_auto = if is_row {
        (margin_spec[3].is_auto(), margin_spec[1].is_auto())
    } else {
        (margin_spec[0].is_auto(), margin_spec[2].is_auto())
    };
    let cross_margin_auto = if is_row {
        (margin_spec[0].is_auto(), margin_spec[2].is_auto())
    } else {
        (margin_spec[3].is_auto(), margin_spec[1].is_auto())
    };

    let mut item = Item {
        view,
        main,
        cross: 0,
        margins,
        main_margin_auto,
        cross_margin_auto,
        grow: fi.grow,
        shrink: fi.shrink,
        align_self: fi.align_self,
        has_explicit_cross: !cross_spec.is_auto(),
        main_pos: 0,
        cross_pos: 0,
    };
    // Clamp between min and max main sizes.
    item.main = clamp_main(vt, view, item.main, main_cb, is_row);
    item
}

fn clamp_main(vt: &ViewTree, view: ViewId, main: Px, main_cb: Px, is_row: bool) -> Px {
    let b = vt.block(view);
    let (min, max) = if is_row {
        (b.blockp.min_width, b.blockp.max_width)
    } else {
        (b.blockp.min_height, b.blockp.max_height)
    };
    let mut main = main;
    if let Some(min) = min.resolve_opt(main_cb) {
        main = main.max(min);
    }
    if let Some(max) = max.resolve_opt(main_cb) {
        main = main.min(max);
    }
    main
}

/// Lay the item out at its final main size (and optionally a stretched
/// cross size), then record the resulting cross size.
fn relayout_item(
    ctx: &mut LayoutContext<'_>,
    vt: &mut ViewTree,
    item: &mut Item,
    content_w: Px,
    content_h: Option<Px>,
    is_row: bool,
    forced_cross: Option<Px>,
) {
    if matches!(vt.view(item.view).data, ViewData::Image(_)) {
        if let Some(cross) = forced_cross {
            item.cross = cross;
        }
        return;
    }
    let (fw, fh) = if is_row {
        (Some(item.main), forced_cross)
    } else {
        (forced_cross, Some(item.main))
    };
    block::layout_block_with(ctx, vt, item.view, content_w, content_h, fw, fh);
    let b = vt.block(item.view);
    item.cross = if is_row { b.height } else { b.width };
}
