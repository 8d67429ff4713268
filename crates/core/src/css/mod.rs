//! Inline-style subset that determines element boxes on a headless page.
//!
//! Only geometry matters here: display, sizes, spacing and flex direction.
//! Viewport-relative units are resolved to pixels while styling, so a page
//! has to be restyled when the viewport changes.

pub mod selector;

use crate::dom::{DomNode, NodeType};

/// Root font size used for `rem`.
const ROOT_FONT_SIZE: f32 = 16.0;
/// Height of one line of text in an otherwise unsized element.
pub const LINE_HEIGHT: f32 = 19.2;

#[derive(Debug, Clone)]
pub struct LayoutStyle {
    pub display: Display,
    pub width: Dimension,
    pub height: Dimension,
    pub min_height: Dimension,
    pub margin: Edges,
    pub padding: Edges,
    pub flex_direction: FlexDirection,
    pub gap: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_height: Dimension::Auto,
            margin: Edges::zero(),
            padding: Edges::zero(),
            flex_direction: FlexDirection::Row,
            gap: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Display {
    Block,
    Flex,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Px(f32),
    /// Fraction of the containing block, `0.5` for `50%`.
    Percent(f32),
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn zero() -> Self {
        Self {
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
            left: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexDirection {
    Row,
    Column,
}

/// Viewport size used to resolve `vh`/`vw`.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// A DOM node with its resolved layout style.
#[derive(Debug, Clone)]
pub struct StyledNode<'a> {
    pub node: &'a DomNode,
    pub style: LayoutStyle,
    pub children: Vec<StyledNode<'a>>,
}

pub fn compute_styles(dom: &DomNode, viewport: Viewport) -> StyledNode<'_> {
    style_node(dom, viewport)
}

fn style_node(node: &DomNode, viewport: Viewport) -> StyledNode<'_> {
    let mut style = default_style_for_tag(node);

    if let Some(inline) = node.get_attr("style") {
        parse_inline_style(inline, viewport, &mut style);
    }
    if node.attributes.contains_key("hidden") {
        style.display = Display::None;
    }

    let children = node
        .children
        .iter()
        .map(|c| style_node(c, viewport))
        .collect();

    StyledNode {
        node,
        style,
        children,
    }
}

fn default_style_for_tag(node: &DomNode) -> LayoutStyle {
    let mut style = LayoutStyle::default();
    if node.node_type != NodeType::Element {
        return style;
    }
    match node.tag.as_str() {
        "head" | "meta" | "link" | "title" | "script" | "style" | "noscript" | "template" => {
            style.display = Display::None;
        }
        // Inline content is approximated as a row that shrinks to its text.
        "a" | "span" | "strong" | "em" | "b" | "i" | "small" | "label" | "img" | "button" => {
            style.display = Display::Flex;
        }
        _ => {}
    }
    style
}

fn parse_inline_style(style_str: &str, viewport: Viewport, style: &mut LayoutStyle) {
    for declaration in style_str.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_lowercase();
        let value = value.trim();

        match property.as_str() {
            "display" => {
                style.display = match value {
                    "none" => Display::None,
                    "flex" | "inline-flex" => Display::Flex,
                    _ => Display::Block,
                };
            }
            "flex-direction" => {
                style.flex_direction = match value {
                    "column" | "column-reverse" => FlexDirection::Column,
                    _ => FlexDirection::Row,
                };
            }
            "width" => {
                if let Some(dim) = parse_dimension(value, viewport) {
                    style.width = dim;
                }
            }
            "height" => {
                if let Some(dim) = parse_dimension(value, viewport) {
                    style.height = dim;
                }
            }
            "min-height" => {
                if let Some(dim) = parse_dimension(value, viewport) {
                    style.min_height = dim;
                }
            }
            "margin" => style.margin = parse_edges(value, viewport),
            "margin-top" => set_edge(&mut style.margin.top, value, viewport),
            "margin-right" => set_edge(&mut style.margin.right, value, viewport),
            "margin-bottom" => set_edge(&mut style.margin.bottom, value, viewport),
            "margin-left" => set_edge(&mut style.margin.left, value, viewport),
            "padding" => style.padding = parse_edges(value, viewport),
            "padding-top" => set_edge(&mut style.padding.top, value, viewport),
            "padding-right" => set_edge(&mut style.padding.right, value, viewport),
            "padding-bottom" => set_edge(&mut style.padding.bottom, value, viewport),
            "padding-left" => set_edge(&mut style.padding.left, value, viewport),
            "gap" => {
                if let Some(v) = parse_length(value, viewport) {
                    style.gap = v;
                }
            }
            _ => {}
        }
    }
}

fn set_edge(edge: &mut f32, value: &str, viewport: Viewport) {
    if let Some(v) = parse_length(value, viewport) {
        *edge = v;
    }
}

/// Parse a CSS dimension: a length, a percentage or `auto`.
pub fn parse_dimension(value: &str, viewport: Viewport) -> Option<Dimension> {
    let value = value.trim();
    if value == "auto" {
        return Some(Dimension::Auto);
    }
    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| Dimension::Percent(v / 100.0));
    }
    parse_length(value, viewport).map(Dimension::Px)
}

/// Parse an absolute or viewport-relative length into pixels.
pub fn parse_length(value: &str, viewport: Viewport) -> Option<f32> {
    let value = value.trim();
    if value == "0" {
        return Some(0.0);
    }
    let (number, scale) = if let Some(n) = value.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("rem") {
        (n, ROOT_FONT_SIZE)
    } else if let Some(n) = value.strip_suffix("vh") {
        (n, viewport.height / 100.0)
    } else if let Some(n) = value.strip_suffix("vw") {
        (n, viewport.width / 100.0)
    } else {
        (value, 1.0)
    };
    number.trim().parse::<f32>().ok().map(|v| v * scale)
}

/// Margin/padding shorthand with one to four values.
fn parse_edges(value: &str, viewport: Viewport) -> Edges {
    let values: Vec<f32> = value
        .split_whitespace()
        .map(|v| parse_length(v, viewport).unwrap_or(0.0))
        .collect();
    match values.as_slice() {
        [all] => Edges {
            top: *all,
            right: *all,
            bottom: *all,
            left: *all,
        },
        [vertical, horizontal] => Edges {
            top: *vertical,
            right: *horizontal,
            bottom: *vertical,
            left: *horizontal,
        },
        [top, horizontal, bottom] => Edges {
            top: *top,
            right: *horizontal,
            bottom: *bottom,
            left: *horizontal,
        },
        [top, right, bottom, left, ..] => Edges {
            top: *top,
            right: *right,
            bottom: *bottom,
            left: *left,
        },
        [] => Edges::zero(),
    }
}
