use crate::css::{self, StyledNode, LINE_HEIGHT};
use crate::dom::{DomNode, NodeType};
use taffy::prelude::*;

/// A node with its computed box in document coordinates.
#[derive(Debug, Clone)]
pub struct LayoutNode<'a> {
    pub node: &'a DomNode,
    pub bounds: Bounds,
    pub children: Vec<LayoutNode<'a>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Lay out a styled tree at the given viewport width. The document grows
/// vertically as far as its content needs.
pub fn compute_layout<'a>(
    root: &StyledNode<'a>,
    viewport: css::Viewport,
) -> Result<LayoutNode<'a>, taffy::TaffyError> {
    let mut tree: TaffyTree<()> = TaffyTree::new();
    let root_id = build_taffy_tree(&mut tree, root)?;

    tree.compute_layout(
        root_id,
        Size {
            width: AvailableSpace::Definite(viewport.width),
            height: AvailableSpace::MaxContent,
        },
    )?;

    extract_layout(&tree, root_id, root, 0.0, 0.0)
}

fn build_taffy_tree(tree: &mut TaffyTree<()>, node: &StyledNode<'_>) -> Result<NodeId, taffy::TaffyError> {
    if node.style.display == css::Display::None {
        return tree.new_leaf(Style {
            display: Display::None,
            ..Default::default()
        });
    }

    if node.node.node_type == NodeType::Text {
        return tree.new_leaf(Style {
            size: Size {
                width: Dimension::Auto,
                height: Dimension::Length(LINE_HEIGHT),
            },
            ..Default::default()
        });
    }

    let children = node
        .children
        .iter()
        .map(|c| build_taffy_tree(tree, c))
        .collect::<Result<Vec<_>, _>>()?;

    tree.new_with_children(to_taffy_style(&node.style), &children)
}

fn to_taffy_style(style: &css::LayoutStyle) -> Style {
    Style {
        display: match style.display {
            css::Display::Block => Display::Block,
            css::Display::Flex => Display::Flex,
            css::Display::None => Display::None,
        },
        size: Size {
            width: to_taffy_dim(style.width),
            height: to_taffy_dim(style.height),
        },
        min_size: Size {
            width: Dimension::Auto,
            height: to_taffy_dim(style.min_height),
        },
        margin: Rect {
            top: LengthPercentageAuto::Length(style.margin.top),
            right: LengthPercentageAuto::Length(style.margin.right),
            bottom: LengthPercentageAuto::Length(style.margin.bottom),
            left: LengthPercentageAuto::Length(style.margin.left),
        },
        padding: Rect {
            top: LengthPercentage::Length(style.padding.top),
            right: LengthPercentage::Length(style.padding.right),
            bottom: LengthPercentage::Length(style.padding.bottom),
            left: LengthPercentage::Length(style.padding.left),
        },
        flex_direction: match style.flex_direction {
            css::FlexDirection::Row => FlexDirection::Row,
            css::FlexDirection::Column => FlexDirection::Column,
        },
        gap: Size {
            width: LengthPercentage::Length(style.gap),
            height: LengthPercentage::Length(style.gap),
        },
        ..Default::default()
    }
}

fn to_taffy_dim(dim: css::Dimension) -> Dimension {
    match dim {
        css::Dimension::Px(v) => Dimension::Length(v),
        css::Dimension::Percent(v) => Dimension::Percent(v),
        css::Dimension::Auto => Dimension::Auto,
    }
}

fn extract_layout<'a>(
    tree: &TaffyTree<()>,
    node_id: NodeId,
    styled: &StyledNode<'a>,
    parent_x: f32,
    parent_y: f32,
) -> Result<LayoutNode<'a>, taffy::TaffyError> {
    let layout = tree.layout(node_id)?;
    let x = parent_x + layout.location.x;
    let y = parent_y + layout.location.y;

    let taffy_children = tree.children(node_id)?;
    let children = styled
        .children
        .iter()
        .zip(taffy_children)
        .map(|(child, child_id)| extract_layout(tree, child_id, child, x, y))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LayoutNode {
        node: styled.node,
        bounds: Bounds {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
        },
        children,
    })
}
