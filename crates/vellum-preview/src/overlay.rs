//! Hover and selection outlines.

use vellum_dom::{DomTree, NodeId};

use crate::layout::Rect;

/// An outlined element.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    /// The outlined element.
    pub node: NodeId,
    /// Its identity token.
    pub token: String,
    /// Where to draw the box; `None` without layout.
    pub rect: Option<Rect>,
}

/// The two outline boxes the preview draws over its content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    hover: Option<Highlight>,
    selection: Option<Highlight>,
}

impl Overlay {
    /// The element under the pointer.
    #[must_use]
    pub const fn hover(&self) -> Option<&Highlight> {
        self.hover.as_ref()
    }

    /// The last clicked element.
    #[must_use]
    pub const fn selection(&self) -> Option<&Highlight> {
        self.selection.as_ref()
    }

    /// Outline `highlight` as hovered.
    pub fn set_hover(&mut self, highlight: Highlight) {
        self.hover = Some(highlight);
    }

    /// Remove the hover outline.
    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Outline `highlight` as selected.
    pub fn set_selection(&mut self, highlight: Highlight) {
        self.selection = Some(highlight);
    }

    /// Remove the selection outline.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub(crate) const fn selection_mut(&mut self) -> Option<&mut Highlight> {
        self.selection.as_mut()
    }

    pub(crate) const fn hover_mut(&mut self) -> Option<&mut Highlight> {
        self.hover.as_mut()
    }
}

/// The closest element at or above `node` carrying `attribute`, crossing
/// shadow boundaries, together with its token.
#[must_use]
pub fn nearest_identified<'a>(
    document: &'a DomTree,
    node: NodeId,
    attribute: &str,
) -> Option<(NodeId, &'a str)> {
    document.composed_path(node).find_map(|id| {
        document
            .as_element(id)
            .and_then(|element| element.get_attribute(attribute))
            .map(|token| (id, token))
    })
}
