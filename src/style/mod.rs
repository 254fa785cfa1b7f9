//! The used-value facade.  The caller owns the CSS cascade; this
//! module normalises whatever it produces into the enumerations and
//! device-pixel lengths the layout engine consumes.

use crate::dom::{Document, NodeId};

/// Device pixels.
pub type Px = i32;

/// A length that may still be relative to the containing block, or the
/// AUTO sentinel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    Auto,
    Px(Px),
    Percent(f32),
}

impl Length {
    pub fn is_auto(self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Resolve against the containing-block dimension; AUTO maps to
    /// the given fallback.
    pub fn resolve(self, containing: Px, auto: Px) -> Px {
        match self {
            Length::Auto => auto,
            Length::Px(px) => px,
            Length::Percent(pct) => ((containing as f32) * pct / 100.0) as Px,
        }
    }

    /// Resolve, treating AUTO as absent.
    pub fn resolve_opt(self, containing: Px) -> Option<Px> {
        match self {
            Length::Auto => None,
            other => Some(other.resolve(containing, 0)),
        }
    }
}

/// 32-bit RGBA color, red in the high byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0);
    pub const BLACK: Color = Color(0x0000_00FF);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | 0xFF)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }
    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }
    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }
    pub fn a(self) -> u8 {
        self.0 as u8
    }

    pub fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, or a small set of named
    /// colors.  Unknown values are None; the caller falls back to a
    /// sentinel.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return match hex.len() {
                3 => {
                    let v = u32::from_str_radix(hex, 16).ok()?;
                    let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
                    Some(Color::rgb(
                        (r | (r << 4)) as u8,
                        (g | (g << 4)) as u8,
                        (b | (b << 4)) as u8,
                    ))
                }
                6 => {
                    let v = u32::from_str_radix(hex, 16).ok()?;
                    Some(Color((v << 8) | 0xFF))
                }
                8 => u32::from_str_radix(hex, 16).ok().map(Color),
                _ => None,
            };
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => Color::rgb(0, 0, 0),
            "white" => Color::rgb(255, 255, 255),
            "red" => Color::rgb(255, 0, 0),
            "green" => Color::rgb(0, 128, 0),
            "blue" => Color::rgb(0, 0, 255),
            "yellow" => Color::rgb(255, 255, 0),
            "orange" => Color::rgb(255, 165, 0),
            "purple" => Color::rgb(128, 0, 128),
            "gray" | "grey" => Color::rgb(128, 128, 128),
            "silver" => Color::rgb(192, 192, 192),
            "maroon" => Color::rgb(128, 0, 0),
            "navy" => Color::rgb(0, 0, 128),
            "teal" => Color::rgb(0, 128, 128),
            "aqua" | "cyan" => Color::rgb(0, 255, 255),
            "fuchsia" | "magenta" => Color::rgb(255, 0, 255),
            "lime" => Color::rgb(0, 255, 0),
            "olive" => Color::rgb(128, 128, 0),
            "transparent" => Color::TRANSPARENT,
            _ => return None,
        };
        Some(named)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Display {
    None,
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Flex,
    Table,
    TableRow,
    TableCell,
}

impl Display {
    pub fn is_inline_level(self) -> bool {
        matches!(self, Display::Inline | Display::InlineBlock)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Position {
    Static,
    Absolute,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
    Scroll,
    Auto,
}

impl Overflow {
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Scroll | Overflow::Auto)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WhiteSpace {
    Normal,
    NoWrap,
    Pre,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ListStyleType {
    Disc,
    Circle,
    Square,
    Decimal,
    LowerRoman,
    UpperRoman,
    LowerAlpha,
    UpperAlpha,
    None,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
    Text,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VerticalAlign {
    Baseline,
    Top,
    Middle,
    Bottom,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BorderStyle {
    None,
    Solid,
    Dotted,
    Dashed,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }
    pub fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlexWrap {
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JustifyContent {
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlignItems {
    FlexStart,
    FlexEnd,
    Center,
    Baseline,
    Stretch,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlignContent {
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceAround,
    Stretch,
}

/// Per-side pixel amounts, already resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub top: Px,
    pub right: Px,
    pub bottom: Px,
    pub left: Px,
}

impl Edges {
    pub fn uniform(v: Px) -> Edges {
        Edges {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn horizontal(&self) -> Px {
        self.left + self.right
    }

    pub fn vertical(&self) -> Px {
        self.top + self.bottom
    }
}

/// Font-selection properties, pre-cascade.
#[derive(Clone, Debug, PartialEq)]
pub struct FontStyleProps {
    pub family: String,
    pub size: Px,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Default for FontStyleProps {
    fn default() -> FontStyleProps {
        FontStyleProps {
            family: "serif".to_string(),
            size: 16,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }
}

/// The used values for one element, normalised for layout.
#[derive(Clone, Debug)]
pub struct Style {
    pub display: Display,
    pub position: Position,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    pub width: Length,
    pub height: Length,
    pub min_width: Length,
    pub max_width: Length,
    pub min_height: Length,
    pub max_height: Length,

    // Margins may be AUTO; padding and borders may not.
    pub margin: [Length; 4],
    pub padding: Edges,
    pub border_width: Edges,
    pub border_color: Color,
    pub border_style: BorderStyle,
    pub radius: Edges,

    pub background_color: Color,
    pub background_image: Option<String>,

    pub color: Color,
    pub cursor: Cursor,
    pub vertical_align: VerticalAlign,

    pub text_align: TextAlign,
    pub white_space: WhiteSpace,
    pub line_height: Length,
    pub text_indent: Px,
    pub list_style_type: ListStyleType,

    pub font: FontStyleProps,

    pub flex_direction: FlexDirection,
    pub flex_wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,

    pub flex_basis: Length,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub align_self: Option<AlignItems>,
    pub order: i32,
}

impl Default for Style {
    fn default() -> Style {
        Style {
            display: Display::Inline,
            position: Position::Static,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            width: Length::Auto,
            height: Length::Auto,
            min_width: Length::Auto,
            max_width: Length::Auto,
            min_height: Length::Auto,
            max_height: Length::Auto,
            margin: [Length::Px(0); 4],
            padding: Edges::default(),
            border_width: Edges::default(),
            border_color: Color::BLACK,
            border_style: BorderStyle::None,
            radius: Edges::default(),
            background_color: Color::TRANSPARENT,
            background_image: None,
            color: Color::BLACK,
            cursor: Cursor::Default,
            vertical_align: VerticalAlign::Baseline,
            text_align: TextAlign::Left,
            white_space: WhiteSpace::Normal,
            line_height: Length::Auto,
            text_indent: 0,
            list_style_type: ListStyleType::Disc,
            font: FontStyleProps::default(),
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::NoWrap,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_content: AlignContent::Stretch,
            flex_basis: Length::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            align_self: None,
            order: 0,
        }
    }
}

/// Produces used values for elements.  Implementations own the
/// cascade; the layout engine only calls `style_of`.  The parent's
/// used style is supplied so inherited properties can flow without the
/// resolver keeping tree state.
pub trait StyleResolver {
    fn style_of(&self, doc: &Document, node: NodeId, parent: Option<&Style>) -> Style;
}

/// Copy the inherited properties from a parent style into a fresh one.
pub fn inherit_from(parent: &Style) -> Style {
    Style {
        color: parent.color,
        cursor: parent.cursor,
        text_align: parent.text_align,
        white_space: parent.white_space,
        line_height: parent.line_height,
        list_style_type: parent.list_style_type,
        font: parent.font.clone(),
        ..Style::default()
    }
}

/// A resolver that applies a small set of user-agent defaults by tag
/// name and then any inline `style` attribute declarations.
#[derive(Default)]
pub struct UaStyles;

impl StyleResolver for UaStyles {
    fn style_of(&self, doc: &Document, node: NodeId, parent: Option<&Style>) -> Style {
        let mut style = match parent {
            Some(parent) => inherit_from(parent),
            None => Style::default(),
        };
        let tag = match doc.tag_name(node) {
            Some(tag) => tag.clone(),
            None => return style,
        };
        apply_ua_defaults(&mut style, tag.as_ref());
        if let Some(decls) = doc.attr(node, "style") {
            apply_declarations(&mut style, decls);
        }
        // Presentational alignment from the markup (table cells).
        if let Some(align) = doc.attr(node, "align") {
            apply_property(&mut style, "text-align", align);
        }
        style
    }
}

fn apply_ua_defaults(style: &mut Style, tag: &str) {
    match tag {
        "html" | "body" | "div" | "section" | "article" | "nav" | "header" | "footer"
        | "main" | "aside" | "address" | "figure" | "figcaption" | "details" | "summary"
        | "fieldset" | "form" | "hgroup" | "dl" | "dd" | "dt" | "center" | "dir" => {
            style.display = Display::Block;
        }
        "p" => {
            style.display = Display::Block;
            style.margin[0] = Length::Px(16);
            style.margin[2] = Length::Px(16);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            style.display = Display::Block;
            style.font.bold = true;
            let (size, margin) = match tag {
                "h1" => (32, 21),
                "h2" => (24, 20),
                "h3" => (19, 19),
                "h4" => (16, 21),
                "h5" => (13, 22),
                _ => (11, 25),
            };
            style.font.size = size;
            style.margin[0] = Length::Px(margin);
            style.margin[2] = Length::Px(margin);
        }
        "ul" | "ol" => {
            style.display = Display::Block;
            style.margin[0] = Length::Px(16);
            style.margin[2] = Length::Px(16);
            style.padding.left = 40;
            style.list_style_type = if tag == "ol" {
                ListStyleType::Decimal
            } else {
                ListStyleType::Disc
            };
        }
        "li" => {
            style.display = Display::ListItem;
        }
        "blockquote" => {
            style.display = Display::Block;
            style.margin[0] = Length::Px(16);
            style.margin[2] = Length::Px(16);
            style.margin[1] = Length::Px(40);
            style.margin[3] = Length::Px(40);
        }
        "pre" => {
            style.display = Display::Block;
            style.white_space = WhiteSpace::Pre;
            style.font.family = "monospace".to_string();
            style.margin[0] = Length::Px(16);
            style.margin[2] = Length::Px(16);
        }
        "hr" => {
            style.display = Display::Block;
            style.border_width = Edges::uniform(1);
            style.border_style = BorderStyle::Solid;
            style.border_color = Color::rgb(128, 128, 128);
            style.margin[0] = Length::Px(8);
            style.margin[2] = Length::Px(8);
        }
        "table" => style.display = Display::Table,
        "thead" | "tbody" | "tfoot" => style.display = Display::Block,
        "tr" => style.display = Display::TableRow,
        "td" | "th" => {
            style.display = Display::TableCell;
            style.padding = Edges::uniform(4);
            if tag == "th" {
                style.font.bold = true;
                style.text_align = TextAlign::Center;
            }
        }
        "a" => {
            style.color = Color::rgb(0, 0, 238);
            style.cursor = Cursor::Pointer;
            style.font.underline = true;
        }
        "b" | "strong" => style.font.bold = true,
        "i" | "em" => style.font.italic = true,
        "u" | "ins" => style.font.underline = true,
        "s" | "strike" | "del" => style.font.strikethrough = true,
        "code" | "tt" | "kbd" | "samp" => {
            style.font.family = "monospace".to_string();
        }
        "small" => style.font.size = 13,
        "big" => style.font.size = 19,
        "img" | "iframe" => style.display = Display::InlineBlock,
        "head" | "script" | "style" | "title" | "meta" | "link" | "base" | "template"
        | "#comment" => {
            style.display = Display::None;
        }
        _ => (),
    }
}

/// Apply `prop: value;` declarations, last one wins.
pub fn apply_declarations(style: &mut Style, decls: &str) {
    for decl in decls.split(';') {
        let mut parts = decl.splitn(2, ':');
        let prop = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let value = parts.next().unwrap_or("").trim();
        if !prop.is_empty() && !value.is_empty() {
            apply_property(style, &prop, value);
        }
    }
}

fn parse_length(value: &str, font_size: Px) -> Option<Length> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("auto") {
        return Some(Length::Auto);
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(Length::Percent);
    }
    if let Some(px) = value.strip_suffix("px") {
        return px.trim().parse::<f32>().ok().map(|v| Length::Px(v as Px));
    }
    if let Some(em) = value.strip_suffix("em") {
        return em
            .trim()
            .parse::<f32>()
            .ok()
            .map(|v| Length::Px((v * font_size as f32) as Px));
    }
    value.parse::<f32>().ok().map(|v| Length::Px(v as Px))
}

fn parse_px(value: &str, font_size: Px) -> Option<Px> {
    match parse_length(value, font_size)? {
        Length::Px(px) => Some(px),
        _ => None,
    }
}

pub fn apply_property(style: &mut Style, prop: &str, value: &str) {
    let font_size = style.font.size;
    match prop {
        "display" => {
            style.display = match value {
                "none" => Display::None,
                "inline" => Display::Inline,
                "block" => Display::Block,
                "inline-block" => Display::InlineBlock,
                "list-item" => Display::ListItem,
                "flex" => Display::Flex,
                "table" => Display::Table,
                "table-row" => Display::TableRow,
                "table-cell" => Display::TableCell,
                other => {
                    log::warn!("unknown display value {:?}", other);
                    return;
                }
            };
        }
        "position" => {
            style.position = match value {
                "absolute" => Position::Absolute,
                _ => Position::Static,
            };
        }
        "overflow" => {
            if let Some(o) = parse_overflow(value) {
                style.overflow_x = o;
                style.overflow_y = o;
            }
        }
        "overflow-x" => {
            if let Some(o) = parse_overflow(value) {
                style.overflow_x = o;
            }
        }
        "overflow-y" => {
            if let Some(o) = parse_overflow(value) {
                style.overflow_y = o;
            }
        }
        "width" => set_length(&mut style.width, value, font_size),
        "height" => set_length(&mut style.height, value, font_size),
        "min-width" => set_length(&mut style.min_width, value, font_size),
        "max-width" => set_length(&mut style.max_width, value, font_size),
        "min-height" => set_length(&mut style.min_height, value, font_size),
        "max-height" => set_length(&mut style.max_height, value, font_size),
        "margin" => {
            if let Some(values) = parse_edge_lengths(value, font_size) {
                style.margin = values;
            }
        }
        "margin-top" => set_length(&mut style.margin[0], value, font_size),
        "margin-right" => set_length(&mut style.margin[1], value, font_size),
        "margin-bottom" => set_length(&mut style.margin[2], value, font_size),
        "margin-left" => set_length(&mut style.margin[3], value, font_size),
        "padding" => {
            if let Some([t, r, b, l]) = parse_edge_px(value, font_size) {
                style.padding = Edges {
                    top: t,
                    right: r,
                    bottom: b,
                    left: l,
                };
            }
        }
        "padding-top" => set_px(&mut style.padding.top, value, font_size),
        "padding-right" => set_px(&mut style.padding.right, value, font_size),
        "padding-bottom" => set_px(&mut style.padding.bottom, value, font_size),
        "padding-left" => set_px(&mut style.padding.left, value, font_size),
        "border" => {
            // width style color, any of which may be missing
            for part in value.split_whitespace() {
                if let Some(px) = parse_px(part, font_size) {
                    style.border_width = Edges::uniform(px);
                } else if let Some(c) = Color::parse(part) {
                    style.border_color = c;
                } else if let Some(bs) = parse_border_style(part) {
                    style.border_style = bs;
                }
            }
        }
        "border-width" => {
            if let Some([t, r, b, l]) = parse_edge_px(value, font_size) {
                style.border_width = Edges {
                    top: t,
                    right: r,
                    bottom: b,
                    left: l,
                };
            }
        }
        "border-style" => {
            if let Some(bs) = parse_border_style(value) {
                style.border_style = bs;
            }
        }
        "border-color" => {
            if let Some(c) = Color::parse(value) {
                style.border_color = c;
            }
        }
        "border-radius" => {
            if let Some(px) = parse_px(value, font_size) {
                style.radius = Edges::uniform(px);
            }
        }
        "background" | "background-color" => {
            if let Some(c) = Color::parse(value) {
                style.background_color = c;
            } else {
                log::warn!("unknown background value {:?}", value);
            }
        }
        "background-image" => {
            let url = value
                .strip_prefix("url(")
                .and_then(|v| v.strip_suffix(')'))
                .map(|v| v.trim_matches(|c| c == '"' || c == '\'').to_string());
            style.background_image = url;
        }
        "color" => {
            if let Some(c) = Color::parse(value) {
                style.color = c;
            }
        }
        "cursor" => {
            style.cursor = match value {
                "pointer" => Cursor::Pointer,
                "text" => Cursor::Text,
                _ => Cursor::Default,
            };
        }
        "vertical-align" => {
            style.vertical_align = match value {
                "top" => VerticalAlign::Top,
                "middle" => VerticalAlign::Middle,
                "bottom" => VerticalAlign::Bottom,
                _ => VerticalAlign::Baseline,
            };
        }
        "text-align" => {
            style.text_align = match value {
                "left" => TextAlign::Left,
                "right" => TextAlign::Right,
                "center" => TextAlign::Center,
                "justify" => TextAlign::Justify,
                _ => return,
            };
        }
        "white-space" => {
            style.white_space = match value {
                "nowrap" => WhiteSpace::NoWrap,
                "pre" => WhiteSpace::Pre,
                _ => WhiteSpace::Normal,
            };
        }
        "line-height" => {
            if let Ok(mult) = value.parse::<f32>() {
                style.line_height = Length::Px((mult * font_size as f32) as Px);
            } else {
                set_length(&mut style.line_height, value, font_size);
            }
        }
        "text-indent" => set_px(&mut style.text_indent, value, font_size),
        "list-style-type" => {
            style.list_style_type = match value {
                "disc" => ListStyleType::Disc,
                "circle" => ListStyleType::Circle,
                "square" => ListStyleType::Square,
                "decimal" => ListStyleType::Decimal,
                "lower-roman" => ListStyleType::LowerRoman,
                "upper-roman" => ListStyleType::UpperRoman,
                "lower-alpha" => ListStyleType::LowerAlpha,
                "upper-alpha" => ListStyleType::UpperAlpha,
                "none" => ListStyleType::None,
                _ => return,
            };
        }
        "font-family" => {
            style.font.family = value
                .split(',')
                .next()
                .unwrap_or(value)
                .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
                .to_string();
        }
        "font-size" => {
            if let Some(px) = parse_px(value, font_size) {
                style.font.size = px;
            }
        }
        "font-weight" => {
            style.font.bold = value == "bold" || value.parse::<u32>().map_or(false, |w| w >= 600);
        }
        "font-style" => {
            style.font.italic = value == "italic" || value == "oblique";
        }
        "text-decoration" => {
            style.font.underline = value.contains("underline");
            style.font.strikethrough = value.contains("line-through");
        }
        "flex-direction" => {
            style.flex_direction = match value {
                "row" => FlexDirection::Row,
                "row-reverse" => FlexDirection::RowReverse,
                "column" => FlexDirection::Column,
                "column-reverse" => FlexDirection::ColumnReverse,
                _ => return,
            };
        }
        "flex-wrap" => {
            style.flex_wrap = match value {
                "nowrap" => FlexWrap::NoWrap,
                "wrap" => FlexWrap::Wrap,
                "wrap-reverse" => FlexWrap::WrapReverse,
                _ => return,
            };
        }
        "justify-content" => {
            style.justify_content = match value {
                "flex-start" | "start" => JustifyContent::FlexStart,
                "flex-end" | "end" => JustifyContent::FlexEnd,
                "center" => JustifyContent::Center,
                "space-between" => JustifyContent::SpaceBetween,
                "space-around" => JustifyContent::SpaceAround,
                "space-evenly" => JustifyContent::SpaceEvenly,
                _ => return,
            };
        }
        "align-items" => {
            if let Some(a) = parse_align(value) {
                style.align_items = a;
            }
        }
        "align-self" => {
            style.align_self = parse_align(value);
        }
        "align-content" => {
            style.align_content = match value {
                "flex-start" | "start" => AlignContent::FlexStart,
                "flex-end" | "end" => AlignContent::FlexEnd,
                "center" => AlignContent::Center,
                "space-between" => AlignContent::SpaceBetween,
                "space-around" => AlignContent::SpaceAround,
                "stretch" => AlignContent::Stretch,
                _ => return,
            };
        }
        "flex-basis" => set_length(&mut style.flex_basis, value, font_size),
        "flex-grow" => {
            if let Ok(v) = value.parse() {
                style.flex_grow = v;
            }
        }
        "flex-shrink" => {
            if let Ok(v) = value.parse() {
                style.flex_shrink = v;
            }
        }
        "flex" => {
            // grow [shrink] [basis]
            let parts: Vec<&str> = value.split_whitespace().collect();
            if let Some(g) = parts.first().and_then(|v| v.parse().ok()) {
                style.flex_grow = g;
            }
            if let Some(s) = parts.get(1).and_then(|v| v.parse().ok()) {
                style.flex_shrink = s;
            }
            if let Some(b) = parts.get(2).and_then(|v| parse_length(v, font_size)) {
                style.flex_basis = b;
            }
        }
        "order" => {
            if let Ok(v) = value.parse() {
                style.order = v;
            }
        }
        other => {
            log::debug!("ignoring property {:?}", other);
        }
    }
}

fn set_length(slot: &mut Length, value: &str, font_size: Px) {
    if let Some(len) = parse_length(value, font_size) {
        *slot = len;
    }
}

fn set_px(slot: &mut Px, value: &str, font_size: Px) {
    if let Some(px) = parse_px(value, font_size) {
        *slot = px;
    }
}

fn parse_overflow(value: &str) -> Option<Overflow> {
    Some(match value {
        "visible" => Overflow::Visible,
        "hidden" => Overflow::Hidden,
        "scroll" => Overflow::Scroll,
        "auto" => Overflow::Auto,
        _ => return None,
    })
}

fn parse_border_style(value: &str) -> Option<BorderStyle> {
    Some(match value {
        "none" => BorderStyle::None,
        "solid" => BorderStyle::Solid,
        "dotted" => BorderStyle::Dotted,
        "dashed" => BorderStyle::Dashed,
        _ => return None,
    })
}

fn parse_align(value: &str) -> Option<AlignItems> {
    Some(match value {
        "flex-start" | "start" => AlignItems::FlexStart,
        "flex-end" | "end" => AlignItems::FlexEnd,
        "center" => AlignItems::Center,
        "baseline" => AlignItems::Baseline,
        "stretch" => AlignItems::Stretch,
        _ => return None,
    })
}

/// Shorthand expansion: 1-4 values in top/right/bottom/left order.
fn parse_edge_lengths(value: &str, font_size: Px) -> Option<[Length; 4]> {
    let parts: Vec<Length> = value
        .split_whitespace()
        .filter_map(|v| parse_length(v, font_size))
        .collect();
    expand_edges(&parts)
}

fn parse_edge_px(value: &str, font_size: Px) -> Option<[Px; 4]> {
    let lengths = parse_edge_lengths(value, font_size)?;
    let mut out = [0; 4];
    for (i, len) in lengths.iter().enumerate() {
        out[i] = len.resolve(0, 0);
    }
    Some(out)
}

fn expand_edges(parts: &[Length]) -> Option<[Length; 4]> {
    Some(match parts {
        [all] => [*all; 4],
        [tb, rl] => [*tb, *rl, *tb, *rl],
        [t, rl, b] => [*t, *rl, *b, *rl],
        [t, r, b, l] => [*t, *r, *b, *l],
        _ => return None,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#000000"), Some(Color::BLACK));
        assert_eq!(Color::parse("#11223344"), Some(Color(0x11223344)));
        assert_eq!(Color::parse("red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("bogus"), None);
    }

    #[test]
    fn declaration_parsing() {
        let mut style = Style::default();
        apply_declarations(
            &mut style,
            "display: flex; width: 500px; height: 50%; margin: 1px 2px; overflow-y: auto",
        );
        assert_eq!(style.display, Display::Flex);
        assert_eq!(style.width, Length::Px(500));
        assert_eq!(style.height, Length::Percent(50.0));
        assert_eq!(style.margin[0], Length::Px(1));
        assert_eq!(style.margin[1], Length::Px(2));
        assert_eq!(style.margin[2], Length::Px(1));
        assert_eq!(style.overflow_y, Overflow::Auto);
    }

    #[test]
    fn percent_resolution() {
        assert_eq!(Length::Percent(50.0).resolve(500, 0), 250);
        assert_eq!(Length::Auto.resolve(500, 123), 123);
        assert_eq!(Length::Px(7).resolve(500, 0), 7);
    }

    #[test]
    fn flex_shorthand() {
        let mut style = Style::default();
        apply_declarations(&mut style, "flex: 2 0 200px");
        assert_eq!(style.flex_grow, 2.0);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(style.flex_basis, Length::Px(200));
    }
}
