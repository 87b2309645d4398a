//! Identity tokens.
//!
//! Every element of a canonicalized fragment carries a token in a reserved
//! attribute. Tokens are assigned by one depth-first walk in document order,
//! shared by the canonicalizer and the locator so that two separate parses
//! of the same text agree on which element a token names.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use vellum_common::protocol::DEFAULT_IDENTITY_ATTRIBUTE;
use vellum_dom::{DomTree, NodeId, SourceRange};

use crate::CanonicalizeError;

/// Default prefix of minted tokens.
pub const DEFAULT_TOKEN_PREFIX: &str = "v";

/// The reserved attribute and the token format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityScheme {
    /// Attribute written onto every element.
    pub attribute: String,
    /// Prefix of minted tokens; the rest is a decimal counter.
    pub prefix: String,
}

impl Default for IdentityScheme {
    fn default() -> Self {
        Self {
            attribute: DEFAULT_IDENTITY_ATTRIBUTE.to_string(),
            prefix: DEFAULT_TOKEN_PREFIX.to_string(),
        }
    }
}

impl IdentityScheme {
    /// Create a scheme, checking that `attribute` can be written into markup.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalizeError::InvalidAttributeName`] if `attribute` is
    /// empty or contains whitespace, quotes, `<`, `>`, `/` or `=`.
    pub fn new(
        attribute: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Result<Self, CanonicalizeError> {
        let attribute = attribute.into().to_ascii_lowercase();
        if !is_valid_attribute_name(&attribute) {
            return Err(CanonicalizeError::InvalidAttributeName(attribute));
        }
        Ok(Self {
            attribute,
            prefix: prefix.into(),
        })
    }

    /// The `n`th minted token.
    #[must_use]
    pub fn mint(&self, n: usize) -> String {
        format!("{}{n}", self.prefix)
    }
}

/// [§ 13.1.2.3 Attributes](https://html.spec.whatwg.org/multipage/syntax.html#attributes-2)
///
/// "Attribute names must consist of one or more characters other than
/// controls, U+0020 SPACE, U+0022 ("), U+0027 ('), U+003E (>), U+002F (/),
/// U+003D (=), and noncharacters."
#[must_use]
pub fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| {
            !c.is_control() && !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}

/// One element's token and the source range it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAssignment {
    /// The element.
    pub node: NodeId,
    /// Its token.
    pub token: String,
    /// Where the element came from: its own source span, or the nearest
    /// located ancestor's span for elements the parser implied.
    pub range: SourceRange,
}

/// Assign a token to every element of `tree`, in document order.
///
/// Template contents are walked right after their `<template>` element. An
/// element that already carries the scheme's attribute keeps that value,
/// unless an earlier element claimed it; every other element gets the next
/// minted token not already written somewhere in the tree.
///
/// `source_len` is the length of the parsed text, the range of the
/// fragment itself.
#[must_use]
pub fn assign_tokens(
    tree: &DomTree,
    scheme: &IdentityScheme,
    source_len: usize,
) -> Vec<TokenAssignment> {
    let written: HashSet<&str> = tree
        .descendants(NodeId::ROOT)
        .chain(template_descendants(tree))
        .filter_map(|id| tree.as_element(id)?.get_attribute(&scheme.attribute))
        .filter(|value| !value.is_empty())
        .collect();

    let mut walk = TokenWalk {
        tree,
        scheme,
        written,
        claimed: HashSet::new(),
        counter: 0,
        assignments: Vec::new(),
    };
    walk.visit_children(NodeId::ROOT, SourceRange { start: 0, end: source_len });
    walk.assignments
}

/// Elements inside template contents, which plain descendant iteration
/// skips.
fn template_descendants(tree: &DomTree) -> impl Iterator<Item = NodeId> + '_ {
    let mut contents = Vec::new();
    let mut pending = vec![NodeId::ROOT];
    while let Some(node) = pending.pop() {
        for id in tree.descendants(node) {
            if let Some(fragment) = tree.template_contents(id) {
                contents.push(fragment);
                pending.push(fragment);
            }
        }
    }
    contents
        .into_iter()
        .flat_map(move |fragment| tree.descendants(fragment))
}

struct TokenWalk<'a> {
    tree: &'a DomTree,
    scheme: &'a IdentityScheme,
    /// Every non-empty token already present in the markup.
    written: HashSet<&'a str>,
    /// Tokens handed out so far.
    claimed: HashSet<String>,
    counter: usize,
    assignments: Vec<TokenAssignment>,
}

impl TokenWalk<'_> {
    fn visit_children(&mut self, parent: NodeId, parent_range: SourceRange) {
        for &child in self.tree.children(parent) {
            self.visit(child, parent_range);
        }
    }

    fn visit(&mut self, node: NodeId, parent_range: SourceRange) {
        let Some(element) = self.tree.as_element(node) else {
            return;
        };
        let range = element.location.map_or(parent_range, |location| location.span);

        let existing = element
            .get_attribute(&self.scheme.attribute)
            .filter(|value| !value.is_empty() && !self.claimed.contains(*value))
            .map(str::to_string);
        let token = existing.unwrap_or_else(|| self.mint());
        let _ = self.claimed.insert(token.clone());
        self.assignments.push(TokenAssignment { node, token, range });

        if let Some(contents) = self.tree.template_contents(node) {
            self.visit_children(contents, range);
        }
        self.visit_children(node, range);
    }

    fn mint(&mut self) -> String {
        loop {
            self.counter += 1;
            let token = self.scheme.mint(self.counter);
            if !self.written.contains(token.as_str()) && !self.claimed.contains(&token) {
                return token;
            }
        }
    }
}

/// Find the element `token` names in `tree`.
#[must_use]
pub fn find_token(
    tree: &DomTree,
    scheme: &IdentityScheme,
    source_len: usize,
    token: &str,
) -> Option<TokenAssignment> {
    assign_tokens(tree, scheme, source_len)
        .into_iter()
        .find(|assignment| assignment.token == token)
}
