//! Mapping identity tokens back to editable regions of the source text, and
//! rewriting those regions without touching anything else.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vellum_dom::{
    Attribute, DomTree, ElementLocation, Namespace, NodeId, NodeType, SourceRange,
    is_void_element,
};
use vellum_html::{escape_attribute, parse_fragment};

use crate::identity::{IdentityScheme, find_token, is_valid_attribute_name};

/// Inline elements whose markup may appear inside flat editable text.
pub const INLINE_PASSTHROUGH: &[&str] = &["br", "span"];

/// Errors from surgical edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// No editable region could be located for the token.
    #[error("no editable source range for token {token:?}")]
    Unlocatable {
        /// The token that was looked up.
        token: String,
    },
    /// An attribute name cannot be written into markup.
    #[error("invalid attribute name {0:?}")]
    InvalidAttributeName(String),
}

/// An element's inner text and where it sits in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditableText {
    /// The raw source between the element's tags.
    pub text: String,
    /// The range `text` was taken from.
    pub range: SourceRange,
}

/// An element's opening tag, broken into parts that can be edited and
/// written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableAttributes {
    /// Attributes in source order, values decoded, without the identity
    /// attribute.
    pub attributes: Vec<Attribute>,
    /// The opening tag's range.
    pub range: SourceRange,
    /// The element's tag name.
    pub tag_name: String,
    /// Whether the element is void.
    pub is_void: bool,
    /// Whether the source used `/>` syntax.
    pub self_closing: bool,
    /// The identity attribute as written in the source, kept so a rewritten
    /// tag keeps its token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<Attribute>,
}

impl EditableAttributes {
    /// Write the opening tag back out.
    ///
    /// Values are escaped for a double-quoted attribute; an empty value is
    /// written as a bare attribute name.
    #[must_use]
    pub fn render_opening_tag(&self) -> String {
        let mut tag = format!("<{}", self.tag_name);
        for attribute in self.attributes.iter().chain(self.identity.as_ref()) {
            tag.push(' ');
            tag.push_str(&attribute.name);
            if !attribute.value.is_empty() {
                tag.push_str("=\"");
                tag.push_str(&escape_attribute(&attribute.value));
                tag.push('"');
            }
        }
        tag.push_str(if self.self_closing { " />" } else { ">" });
        tag
    }
}

/// Find the end tag that closes an element named `tag_name` whose content
/// starts at `from`.
///
/// Start and end tags of the same name are matched case-insensitively and
/// balanced with a depth counter. Void element names and `/>` start tags
/// leave the depth alone. Tags inside comments are skipped; an
/// unterminated comment runs to the end of the source. Returns the offset of
/// the closing tag's `<`.
#[must_use]
pub fn locate_closing_tag(source: &str, tag_name: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let void = is_void_element(&tag_name.to_ascii_lowercase());
    let mut depth = 0usize;
    let mut pos = from;

    while pos < bytes.len() {
        let open = pos + source.get(pos..)?.find('<')?;
        if bytes[open..].starts_with(b"<!--") {
            pos = open + 2 + source.get(open + 2..)?.find("-->")? + 3;
            continue;
        }
        let is_end = bytes.get(open + 1) == Some(&b'/');
        let name_start = open + 1 + usize::from(is_end);

        if !names_tag_at(bytes, name_start, tag_name) {
            pos = open + 1;
            continue;
        }
        let tag_end = scan_tag_end(bytes, name_start + tag_name.len());

        if is_end {
            if depth == 0 {
                return Some(open);
            }
            depth -= 1;
        } else {
            let self_closing = tag_end >= 2 && bytes.get(tag_end - 2) == Some(&b'/');
            if !void && !self_closing {
                depth += 1;
            }
        }
        pos = tag_end.max(open + 1);
    }
    None
}

/// Whether `bytes[at..]` starts with `tag_name` followed by the end of a
/// tag name.
fn names_tag_at(bytes: &[u8], at: usize, tag_name: &str) -> bool {
    let Some(candidate) = bytes.get(at..at + tag_name.len()) else {
        return false;
    };
    candidate.eq_ignore_ascii_case(tag_name.as_bytes())
        && bytes
            .get(at + tag_name.len())
            .is_none_or(|&b| b.is_ascii_whitespace() || b == b'/' || b == b'>')
}

/// Offset just past the `>` that ends a tag, skipping quoted attribute
/// values, or the input length for an unterminated tag.
fn scan_tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote = None;
    for (offset, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return offset + 1,
            None => {}
        }
    }
    bytes.len()
}

/// The content range between an element's tags.
///
/// Starts at the end of the opening tag. Ends at the parser-reported
/// closing tag, or, when the parser closed the element implicitly, at the
/// closing tag [`locate_closing_tag`] finds. `None` if neither exists or the
/// result would be inverted.
#[must_use]
pub fn inner_range(
    source: &str,
    tag_name: &str,
    location: &ElementLocation,
) -> Option<SourceRange> {
    let start = location.start_tag.end;
    let end = match location.end_tag {
        Some(end_tag) => end_tag.start,
        None => locate_closing_tag(source, tag_name, start)?,
    };
    SourceRange::new(start, end).filter(|range| range.end <= source.len())
}

/// [§ 4.9 valid element name](https://dom.spec.whatwg.org/#valid-element-local-name)
///
/// Loosely: an ASCII letter followed by letters, digits, `-`, `_`, `.`,
/// `:` or non-ASCII characters.
fn is_valid_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':') || !c.is_ascii()
        })
}

/// Whether `child` can sit inside text that is edited as one flat string.
fn is_flat_text_child(tree: &DomTree, child: NodeId) -> bool {
    match tree.get(child).map(|node| &node.node_type) {
        Some(NodeType::Text(_) | NodeType::Comment(_)) => true,
        Some(NodeType::Element(data)) => {
            (data.namespace == Namespace::Html
                && INLINE_PASSTHROUGH.contains(&data.tag_name.as_str()))
                || !is_valid_element_name(&data.tag_name)
        }
        _ => false,
    }
}

/// Finds editable regions of source text by identity token.
///
/// Every lookup re-parses the text and numbers its elements exactly as
/// [`crate::Canonicalizer`] does, so a token from a canonicalization pass
/// over the same text names the same element here.
#[derive(Debug, Clone, Default)]
pub struct SourceTextLocator {
    scheme: IdentityScheme,
}

impl SourceTextLocator {
    /// Create a locator using `scheme`.
    #[must_use]
    pub const fn new(scheme: IdentityScheme) -> Self {
        Self { scheme }
    }

    /// Parse `html` and find the element `token` names.
    fn locate(&self, html: &str, token: &str) -> Option<(DomTree, NodeId)> {
        let tree = match parse_fragment(html) {
            Ok(tree) => tree,
            Err(err) => {
                log::debug!("cannot locate {token}: {err}");
                return None;
            }
        };
        let node = find_token(&tree, &self.scheme, html.len(), token)?.node;
        Some((tree, node))
    }

    /// The flat inner text of the element `token` names.
    ///
    /// `None` for void elements, for elements without both boundaries in
    /// the source, and for elements with structural children: only text,
    /// comments, [`INLINE_PASSTHROUGH`] elements and elements with invalid
    /// names may appear inside.
    #[must_use]
    pub fn editable_text(&self, html: &str, token: &str) -> Option<EditableText> {
        let (tree, node) = self.locate(html, token)?;
        let element = tree.as_element(node)?;
        if element.is_void() {
            return None;
        }
        let location = element.location?;
        let range = inner_range(html, &element.tag_name, &location)?;

        let content = tree.template_contents(node).unwrap_or(node);
        if !tree
            .children(content)
            .iter()
            .all(|&child| is_flat_text_child(&tree, child))
        {
            return None;
        }

        Some(EditableText {
            text: range.slice(html)?.to_string(),
            range,
        })
    }

    /// The opening tag of the element `token` names.
    ///
    /// `None` if the parser did not record where the opening tag is.
    #[must_use]
    pub fn editable_attributes(&self, html: &str, token: &str) -> Option<EditableAttributes> {
        let (tree, node) = self.locate(html, token)?;
        let element = tree.as_element(node)?;
        let location = element.location?;

        let (identity, attributes): (Vec<Attribute>, Vec<Attribute>) = element
            .attrs
            .iter()
            .cloned()
            .partition(|attr| attr.name.eq_ignore_ascii_case(&self.scheme.attribute));

        Some(EditableAttributes {
            attributes,
            range: location.start_tag,
            tag_name: element.tag_name.clone(),
            is_void: element.is_void(),
            self_closing: location.self_closing,
            identity: identity.into_iter().next(),
        })
    }

    /// Replace the inner text of the element `token` names with `new_text`,
    /// inserted as written.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::Unlocatable`] when [`Self::editable_text`] finds
    /// nothing to replace.
    pub fn apply_text_edit(
        &self,
        html: &str,
        token: &str,
        new_text: &str,
    ) -> Result<String, EditError> {
        let located = self
            .editable_text(html, token)
            .ok_or_else(|| EditError::Unlocatable {
                token: token.to_string(),
            })?;
        Ok(splice(html, located.range, new_text))
    }

    /// Replace the attributes of the element `token` names, rewriting only
    /// its opening tag.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidAttributeName`] for a name that cannot be
    /// written into markup and [`EditError::Unlocatable`] when
    /// [`Self::editable_attributes`] finds no opening tag.
    pub fn apply_attribute_edit(
        &self,
        html: &str,
        token: &str,
        attributes: &[Attribute],
    ) -> Result<String, EditError> {
        if let Some(bad) = attributes
            .iter()
            .find(|attr| !is_valid_attribute_name(&attr.name))
        {
            return Err(EditError::InvalidAttributeName(bad.name.clone()));
        }

        let mut located =
            self.editable_attributes(html, token)
                .ok_or_else(|| EditError::Unlocatable {
                    token: token.to_string(),
                })?;
        located.attributes = attributes
            .iter()
            .filter(|attr| !attr.name.eq_ignore_ascii_case(&self.scheme.attribute))
            .cloned()
            .collect();
        Ok(splice(html, located.range, &located.render_opening_tag()))
    }
}

fn splice(source: &str, range: SourceRange, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() - range.len() + replacement.len());
    out.push_str(&source[..range.start]);
    out.push_str(replacement);
    out.push_str(&source[range.end..]);
    out
}
