//! Geometry and hit testing.
//!
//! The runtime does no layout of its own. Whatever renders the preview
//! supplies element boxes through a [`LayoutProvider`], the way a browser
//! answers `getBoundingClientRect()`.

use serde::{Deserialize, Serialize};
use vellum_dom::{DomTree, NodeId};

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance from the left edge of the viewport.
    pub x: f32,
    /// Distance from the top edge of the viewport.
    pub y: f32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether `point` lies inside the rectangle. The left and top edges
    /// are inside; the right and bottom edges are not.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

/// Supplies element boxes for the preview document.
pub trait LayoutProvider {
    /// The border box of `node`, or `None` if it generates no box.
    fn bounding_rect(&self, document: &DomTree, node: NodeId) -> Option<Rect>;
}

/// Children of `node` in the composed tree: a shadow host shows its shadow
/// root's children instead of its own.
fn composed_children(document: &DomTree, node: NodeId) -> &[NodeId] {
    document
        .shadow_root(node)
        .map_or_else(|| document.children(node), |root| document.children(root))
}

/// The topmost element under `point` in the subtree rooted at `node`.
///
/// Later siblings paint over earlier ones and descendants over their
/// ancestors. An element without a box does not catch the point itself but
/// its descendants still can.
#[must_use]
pub fn hit_test(
    document: &DomTree,
    node: NodeId,
    point: Point,
    layout: &dyn LayoutProvider,
) -> Option<NodeId> {
    for &child in composed_children(document, node).iter().rev() {
        if let Some(hit) = hit_test(document, child, point, layout) {
            return Some(hit);
        }
    }
    if document.as_element(node).is_none() {
        return None;
    }
    layout
        .bounding_rect(document, node)
        .filter(|rect| rect.contains(point))
        .map(|_| node)
}
