//! Canonical markup with identity tokens and the offset map back to the
//! source text.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vellum_dom::{NodeId, SourceRange};
use vellum_html::{ParseError, parse_fragment, serialize_children};

use crate::identity::{IdentityScheme, assign_tokens};

/// Errors that stop a canonicalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizeError {
    /// The tree builder refused the input.
    #[error("cannot parse source: {0}")]
    Parse(#[from] ParseError),
    /// The identity attribute name cannot be written into markup.
    #[error("invalid identity attribute name {0:?}")]
    InvalidAttributeName(String),
}

/// Output of one canonicalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalizationResult {
    /// Serialized markup with the identity attribute on every element, or
    /// the source unchanged when the pass failed.
    #[serde(rename = "canonicalHTML")]
    pub canonical_html: String,
    /// Token to the range of source text that produced the element.
    pub map: HashMap<String, SourceRange>,
    /// Why the pass failed, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CanonicalizationResult {
    /// The result shown when canonicalization fails: the raw source and an
    /// empty map.
    #[must_use]
    pub fn degraded(html: &str, error: &CanonicalizeError) -> Self {
        Self {
            canonical_html: html.to_string(),
            map: HashMap::new(),
            error: Some(error.to_string()),
        }
    }

    /// Whether the pass failed.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// The source range `token` maps to.
    #[must_use]
    pub fn range_of(&self, token: &str) -> Option<SourceRange> {
        self.map.get(token).copied()
    }

    /// Map entries ordered by where they start in the source, outer
    /// elements first.
    #[must_use]
    pub fn entries_by_offset(&self) -> Vec<(&str, SourceRange)> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(token, range)| (token.as_str(), *range))
            .collect();
        entries.sort_by(|(a_token, a), (b_token, b)| {
            a.start
                .cmp(&b.start)
                .then(b.end.cmp(&a.end))
                .then(a_token.cmp(b_token))
        });
        entries
    }
}

/// Parse `html`, tag every element with its token and serialize it again.
///
/// # Errors
///
/// Returns [`CanonicalizeError::Parse`] if the tree builder gives up.
pub fn try_canonicalize(
    html: &str,
    scheme: &IdentityScheme,
) -> Result<CanonicalizationResult, CanonicalizeError> {
    let mut tree = parse_fragment(html)?;
    let assignments = assign_tokens(&tree, scheme, html.len());

    let mut map = HashMap::with_capacity(assignments.len());
    for assignment in assignments {
        if let Some(element) = tree.as_element_mut(assignment.node) {
            element.set_attribute(&scheme.attribute, assignment.token.as_str());
        }
        let _ = map.insert(assignment.token, assignment.range);
    }

    Ok(CanonicalizationResult {
        canonical_html: serialize_children(&tree, NodeId::ROOT),
        map,
        error: None,
    })
}

/// Canonicalize `html`, degrading to the raw source on failure.
#[must_use]
pub fn canonicalize(html: &str, scheme: &IdentityScheme) -> CanonicalizationResult {
    try_canonicalize(html, scheme).unwrap_or_else(|err| {
        log::warn!("canonicalization failed, previewing raw source: {err}");
        CanonicalizationResult::degraded(html, &err)
    })
}

/// Canonicalizer with a one-entry cache keyed on the exact source text.
///
/// Minted tokens restart at one on every pass, so results for different
/// inputs are never comparable; the cache only saves re-parsing text that
/// has not changed.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    scheme: IdentityScheme,
    cached: Option<(String, CanonicalizationResult)>,
}

impl Canonicalizer {
    /// Create a canonicalizer using `scheme`.
    #[must_use]
    pub const fn new(scheme: IdentityScheme) -> Self {
        Self {
            scheme,
            cached: None,
        }
    }

    /// The identity scheme in use.
    #[must_use]
    pub const fn scheme(&self) -> &IdentityScheme {
        &self.scheme
    }

    /// Canonicalize `html`, reusing the previous result if `html` is the
    /// same text.
    pub fn canonicalize(&mut self, html: &str) -> &CanonicalizationResult {
        let hit = self
            .cached
            .as_ref()
            .is_some_and(|(source, _)| source == html);
        if !hit {
            self.cached = None;
        }
        let (_, result) = self
            .cached
            .get_or_insert_with(|| (html.to_string(), canonicalize(html, &self.scheme)));
        result
    }

    /// The most recent result, if any.
    #[must_use]
    pub fn cached(&self) -> Option<&CanonicalizationResult> {
        self.cached.as_ref().map(|(_, result)| result)
    }

    /// Forget the cached result.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
