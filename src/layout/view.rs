//! The view tree: positioned, sized boxes produced by layout.
//!
//! Views live in an arena owned by the tree; they reference DOM nodes
//! by id but never own them.  Box coordinates are relative to the
//! parent box origin; text run coordinates are relative to the
//! containing block.

use crate::dom::NodeId;
use crate::fonts::FontId;
use crate::style::{
    AlignContent, AlignItems, BorderStyle, Color, Cursor, Edges, FlexDirection, FlexWrap,
    JustifyContent, Length, ListStyleType, Overflow, Px, TextAlign, VerticalAlign, WhiteSpace,
};

/// Scrollbar thickness in device pixels.
pub const SCROLLBAR_SIZE: Px = 24;
pub const MIN_HANDLE_SIZE: Px = 32;
pub const SCROLL_BORDER_MAIN: Px = 2;
pub const SCROLL_BORDER_CROSS: Px = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ViewId(u32);

impl ViewId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaneId(u32);

impl PaneId {
    pub fn from_index(i: usize) -> PaneId {
        PaneId(i as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: Px,
    pub y: Px,
    pub w: Px,
    pub h: Px,
}

impl Rect {
    pub fn new(x: Px, y: Px, w: Px, h: Px) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, x: Px, y: Px) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn translate(&self, dx: Px, dy: Px) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.w).min(other.x + other.w);
        let bottom = (self.y + self.h).min(other.y + other.h);
        Rect {
            x,
            y,
            w: (right - x).max(0),
            h: (bottom - y).max(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }
}

/// Resolved font selection for a box.
#[derive(Clone, Debug)]
pub struct FontProps {
    pub font: FontId,
    pub family: String,
    pub size: Px,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

/// Box decoration: margins, padding, borders, and background.
#[derive(Clone, Debug)]
pub struct Boundary {
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
    pub border_color: Color,
    pub border_style: BorderStyle,
    pub radius: Edges,
    pub background: Color,
    pub background_image: Option<String>,
}

impl Default for Boundary {
    fn default() -> Boundary {
        Boundary {
            margin: Edges::default(),
            padding: Edges::default(),
            border: Edges::default(),
            border_color: Color::BLACK,
            border_style: BorderStyle::None,
            radius: Edges::default(),
            background: Color::TRANSPARENT,
            background_image: None,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InlineProps {
    pub color: Color,
    pub cursor: Cursor,
    pub vertical_align: VerticalAlign,
}

#[derive(Copy, Clone, Debug)]
pub struct FlexItemProps {
    pub basis: Length,
    pub grow: f32,
    pub shrink: f32,
    pub align_self: Option<AlignItems>,
    pub order: i32,
}

impl Default for FlexItemProps {
    fn default() -> FlexItemProps {
        FlexItemProps {
            basis: Length::Auto,
            grow: 0.0,
            shrink: 1.0,
            align_self: None,
            order: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BlockProps {
    pub text_align: TextAlign,
    pub white_space: WhiteSpace,
    pub line_height: Length,
    pub text_indent: Px,
    pub min_width: Length,
    pub max_width: Length,
    pub min_height: Length,
    pub max_height: Length,
    pub list_style_type: ListStyleType,
}

#[derive(Copy, Clone, Debug)]
pub struct FlexContainerProps {
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Block,
    InlineBlock,
    List,
    ListItem,
}

/// The bullet or text drawn in a list item's left margin area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Marker {
    Disc,
    Circle,
    Square,
    Text(String),
}

pub struct BlockBox {
    pub kind: BlockKind,

    /// Border-box position relative to the parent box origin.
    pub x: Px,
    pub y: Px,
    /// Border-box size.
    pub width: Px,
    pub height: Px,
    /// Extent of the children (used overflow), in content-box
    /// coordinates.
    pub content_width: Px,
    pub content_height: Px,

    pub font: FontProps,
    pub boundary: Boundary,
    pub inline: InlineProps,
    pub blockp: BlockProps,

    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    pub flex_container: Option<FlexContainerProps>,
    pub flex_item: FlexItemProps,

    /// Styled dimensions, kept for re-resolution during flex sizing.
    pub width_spec: Length,
    pub height_spec: Length,
    pub margin_spec: [Length; 4],

    /// 1-based position among list siblings; meaningful for ListItem.
    pub list_index: u32,
    pub marker: Option<Marker>,

    pub scroller: Option<PaneId>,
}

impl BlockBox {
    /// Content-box origin relative to the border-box origin.
    pub fn content_origin(&self) -> (Px, Px) {
        (
            self.boundary.border.left + self.boundary.padding.left,
            self.boundary.border.top + self.boundary.padding.top,
        )
    }

    /// Content-box size.
    pub fn content_box(&self) -> (Px, Px) {
        (
            self.width - self.boundary.border.horizontal() - self.boundary.padding.horizontal(),
            self.height - self.boundary.border.vertical() - self.boundary.padding.vertical(),
        )
    }
}

pub struct InlineBox {
    pub font: FontProps,
    pub boundary: Boundary,
    pub inline: InlineProps,
    pub flex_item: FlexItemProps,
    /// Forced line break.
    pub is_br: bool,
}

pub struct TextRun {
    pub node: NodeId,
    /// Byte range into the node's character data.
    pub start: usize,
    pub len: usize,
    /// Position within the containing block.
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
    pub font: FontId,
    pub color: Color,
    pub cursor: Cursor,
    pub underline: bool,
    pub strikethrough: bool,
}

pub struct ImageBox {
    pub src: String,
    pub intrinsic_width: Px,
    pub intrinsic_height: Px,
    pub x: Px,
    pub y: Px,
    pub width: Px,
    pub height: Px,
    /// Scalable picture rather than raster pixels.
    pub is_picture: bool,
    pub cursor: Cursor,
}

pub enum ViewData {
    Block(Box<BlockBox>),
    Inline(Box<InlineBox>),
    Text(Box<TextRun>),
    Image(Box<ImageBox>),
}

pub struct View {
    pub node: Option<NodeId>,
    pub parent: Option<ViewId>,
    pub next_sibling: Option<ViewId>,
    pub first_child: Option<ViewId>,
    pub last_child: Option<ViewId>,
    pub data: ViewData,
}

/// Scroll state for one overflowing block.  Created at layout; mutated
/// only by the interaction overlay.
pub struct ScrollPane {
    pub block: ViewId,
    /// Content-box clip rectangle, relative to the block origin.
    pub clip: Rect,

    pub view_width: Px,
    pub view_height: Px,
    pub has_h: bool,
    pub has_v: bool,

    pub h_scroll: Px,
    pub v_scroll: Px,
    pub h_max: Px,
    pub v_max: Px,

    pub h_bar_len: Px,
    pub v_bar_len: Px,
    pub h_handle_x: Px,
    pub h_handle_w: Px,
    pub v_handle_y: Px,
    pub v_handle_h: Px,

    pub is_h_hovered: bool,
    pub is_v_hovered: bool,
    pub is_h_dragging: bool,
    pub is_v_dragging: bool,
    pub drag_start_x: Px,
    pub drag_start_y: Px,
    pub drag_start_h_scroll: Px,
    pub drag_start_v_scroll: Px,
}

impl ScrollPane {
    /// Recompute handle geometry from the current scroll positions.
    pub fn update_handles(&mut self) {
        if self.has_v {
            let travel = self.v_bar_len - self.v_handle_h;
            self.v_handle_y = SCROLL_BORDER_MAIN
                + if self.v_max > 0 {
                    self.v_scroll * travel / self.v_max
                } else {
                    0
                };
        }
        if self.has_h {
            let travel = self.h_bar_len - self.h_handle_w;
            self.h_handle_x = SCROLL_BORDER_MAIN
                + if self.h_max > 0 {
                    self.h_scroll * travel / self.h_max
                } else {
                    0
                };
        }
    }
}

/// The arena of views for one laid-out document.
pub struct ViewTree {
    views: Vec<View>,
    pub root: Option<ViewId>,
    pub panes: Vec<ScrollPane>,
}

impl Default for ViewTree {
    fn default() -> ViewTree {
        ViewTree::new()
    }
}

impl ViewTree {
    pub fn new() -> ViewTree {
        ViewTree {
            views: vec![],
            root: None,
            panes: vec![],
        }
    }

    pub fn alloc(&mut self, node: Option<NodeId>, data: ViewData) -> ViewId {
        let id = ViewId(self.views.len() as u32);
        self.views.push(View {
            node,
            parent: None,
            next_sibling: None,
            first_child: None,
            last_child: None,
            data,
        });
        id
    }

    pub fn view(&self, id: ViewId) -> &View {
        &self.views[id.idx()]
    }

    pub fn view_mut(&mut self, id: ViewId) -> &mut View {
        &mut self.views[id.idx()]
    }

    pub fn append_child(&mut self, parent: ViewId, child: ViewId) {
        self.views[child.idx()].parent = Some(parent);
        match self.views[parent.idx()].last_child {
            None => {
                self.views[parent.idx()].first_child = Some(child);
                self.views[parent.idx()].last_child = Some(child);
            }
            Some(last) => {
                self.views[last.idx()].next_sibling = Some(child);
                self.views[parent.idx()].last_child = Some(child);
            }
        }
    }

    /// Link `new` as the sibling immediately after `prev`.
    pub fn insert_after(&mut self, prev: ViewId, new: ViewId) {
        let parent = self.views[prev.idx()].parent;
        self.views[new.idx()].parent = parent;
        self.views[new.idx()].next_sibling = self.views[prev.idx()].next_sibling;
        self.views[prev.idx()].next_sibling = Some(new);
        if let Some(parent) = parent {
            if self.views[parent.idx()].last_child == Some(prev) {
                self.views[parent.idx()].last_child = Some(new);
            }
        }
    }

    pub fn children(&self, id: ViewId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            next: self.views[id.idx()].first_child,
        }
    }

    pub fn child_ids(&self, id: ViewId) -> Vec<ViewId> {
        self.children(id).collect()
    }

    pub fn block(&self, id: ViewId) -> &BlockBox {
        match &self.views[id.idx()].data {
            ViewData::Block(b) => b,
            _ => panic!("view is not a block"),
        }
    }

    pub fn block_mut(&mut self, id: ViewId) -> &mut BlockBox {
        match &mut self.views[id.idx()].data {
            ViewData::Block(b) => b,
            _ => panic!("view is not a block"),
        }
    }

    pub fn is_block(&self, id: ViewId) -> bool {
        matches!(self.views[id.idx()].data, ViewData::Block(_))
    }

    pub fn alloc_pane(&mut self, pane: ScrollPane) -> PaneId {
        let id = PaneId(self.panes.len() as u32);
        self.panes.push(pane);
        id
    }

    pub fn pane(&self, id: PaneId) -> &ScrollPane {
        &self.panes[id.0 as usize]
    }

    pub fn pane_mut(&mut self, id: PaneId) -> &mut ScrollPane {
        &mut self.panes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

pub struct ChildIter<'a> {
    tree: &'a ViewTree,
    next: Option<ViewId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = ViewId;

    fn next(&mut self) -> Option<ViewId> {
        let cur = self.next?;
        self.next = self.tree.views[cur.idx()].next_sibling;
        Some(cur)
    }
}
