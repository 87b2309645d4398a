//! Selector matching against the arena DOM.
//!
//! [§ 3.2 Matching](https://www.w3.org/TR/selectors-4/#match-against-element)
//!
//! Complex selectors are evaluated right to left: the subject compound is
//! tested on the element, then each combinator walks to the candidates for
//! the next compound. Descendant and subsequent-sibling combinators try
//! every candidate, so `a b c` is not fooled by an inner `b` that lacks an
//! `a` ancestor.

use vellum_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

use super::{
    AttributeOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Nth,
    PseudoClass, SelectorList, SimpleSelector,
};

impl SelectorList {
    /// Whether any selector in the list matches `node`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        self.0.iter().any(|complex| complex.matches(tree, node))
    }
}

impl ComplexSelector {
    /// Whether `node` is matched by this selector as its subject.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        match self.compounds.len() {
            0 => false,
            len => self.matches_from(tree, node, len - 1),
        }
    }

    /// Match `compounds[index]` against `node`, then the compounds to its
    /// left against the elements its combinator reaches.
    fn matches_from(&self, tree: &DomTree, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        let next = index - 1;
        match self.combinators.get(next) {
            Some(Combinator::Descendant) => ancestor_elements(tree, node)
                .any(|ancestor| self.matches_from(tree, ancestor, next)),
            Some(Combinator::Child) => parent_element(tree, node)
                .is_some_and(|parent| self.matches_from(tree, parent, next)),
            Some(Combinator::NextSibling) => previous_element_sibling(tree, node)
                .is_some_and(|sibling| self.matches_from(tree, sibling, next)),
            Some(Combinator::SubsequentSibling) => tree
                .preceding_siblings(node)
                .filter(|&sibling| tree.as_element(sibling).is_some())
                .any(|sibling| self.matches_from(tree, sibling, next)),
            None => false,
        }
    }
}

impl CompoundSelector {
    /// Whether every simple selector holds for `node`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        self.simple_selectors
            .iter()
            .all(|simple| simple.matches(tree, node, element))
    }
}

impl SimpleSelector {
    fn matches(&self, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
        match self {
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Universal => true,
            // [§ 6.6 Class selectors]
            // "the class selector represents an element belonging to the class
            // identified by the identifier"
            Self::Class(class) => element.classes().contains(class.as_str()),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Attribute(attribute) => attribute.matches(element),
            Self::PseudoClass(pseudo) => pseudo.matches(tree, node, element),
            Self::NeverMatch(_) => false,
        }
    }
}

impl AttributeSelector {
    /// [§ 6.1 Attribute presence and value selectors](https://www.w3.org/TR/selectors-4/#attribute-representation)
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let Some(actual) = element.get_attribute(&self.name) else {
            return false;
        };
        let Some((operator, expected)) = &self.operator else {
            return true;
        };

        let (actual, expected) = if self.case_insensitive {
            (actual.to_ascii_lowercase(), expected.to_ascii_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };

        match operator {
            AttributeOperator::Equals => actual == expected,
            // "If 'val' contains whitespace, it will never represent anything
            // (since the words are separated by spaces). Also if 'val' is the
            // empty string, it will never represent anything."
            AttributeOperator::Includes => {
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && actual.split_ascii_whitespace().any(|word| word == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            // "If 'val' is the empty string then the selector does not
            // represent anything."
            AttributeOperator::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttributeOperator::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttributeOperator::Substring => !expected.is_empty() && actual.contains(&expected),
        }
    }
}

impl PseudoClass {
    fn matches(&self, tree: &DomTree, node: NodeId, element: &ElementData) -> bool {
        match self {
            // "The :root pseudo-class represents an element that is the root
            // of the document."
            Self::Root => tree
                .parent(node)
                .and_then(|parent| tree.get(parent))
                .is_some_and(|parent| matches!(parent.node_type, NodeType::Document)),
            Self::FirstChild => previous_element_sibling(tree, node).is_none(),
            Self::LastChild => next_element_sibling(tree, node).is_none(),
            Self::OnlyChild => {
                previous_element_sibling(tree, node).is_none()
                    && next_element_sibling(tree, node).is_none()
            }
            Self::FirstOfType => same_type_siblings(tree, node, element, false).next().is_none(),
            Self::LastOfType => same_type_siblings(tree, node, element, true).next().is_none(),
            Self::OnlyOfType => {
                same_type_siblings(tree, node, element, false).next().is_none()
                    && same_type_siblings(tree, node, element, true).next().is_none()
            }
            // "The :empty pseudo-class represents an element that has no
            // children at all." Comments are not children for this purpose;
            // whitespace text is, as in browsers.
            Self::Empty => tree.children(node).iter().all(|&child| {
                tree.get(child).is_none_or(|child| match &child.node_type {
                    NodeType::Comment(_) => true,
                    NodeType::Text(text) => text.is_empty(),
                    _ => false,
                })
            }),
            Self::NthChild(nth, of) => {
                let position = 1 + preceding_elements(tree, node)
                    .filter(|&sibling| of.as_ref().is_none_or(|of| of.matches(tree, sibling)))
                    .count();
                of.as_ref().is_none_or(|of| of.matches(tree, node)) && nth.matches(position)
            }
            Self::NthLastChild(nth, of) => {
                let position = 1 + following_elements(tree, node)
                    .filter(|&sibling| of.as_ref().is_none_or(|of| of.matches(tree, sibling)))
                    .count();
                of.as_ref().is_none_or(|of| of.matches(tree, node)) && nth.matches(position)
            }
            Self::NthOfType(nth) => {
                nth_of_type(*nth, same_type_siblings(tree, node, element, false).count())
            }
            Self::NthLastOfType(nth) => {
                nth_of_type(*nth, same_type_siblings(tree, node, element, true).count())
            }
            Self::Not(list) => !list.matches(tree, node),
            Self::Is(list) | Self::Where(list) => list.matches(tree, node),
            Self::AnyLink => {
                is_html(element, &["a", "area"]) && element.has_attribute("href")
            }
            Self::Checked => {
                let checkable = is_html(element, &["input"])
                    && element.get_attribute("type").is_some_and(|kind| {
                        kind.eq_ignore_ascii_case("checkbox") || kind.eq_ignore_ascii_case("radio")
                    });
                (checkable && element.has_attribute("checked"))
                    || (is_html(element, &["option"]) && element.has_attribute("selected"))
            }
            Self::Disabled => is_html(element, FORM_CONTROLS) && element.has_attribute("disabled"),
            Self::Enabled => is_html(element, FORM_CONTROLS) && !element.has_attribute("disabled"),
            Self::Required => is_html(element, INPUTS) && element.has_attribute("required"),
            Self::Optional => is_html(element, INPUTS) && !element.has_attribute("required"),
        }
    }
}

/// Elements that can be disabled.
const FORM_CONTROLS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

/// Elements that can be required.
const INPUTS: &[&str] = &["input", "select", "textarea"];

fn is_html(element: &ElementData, names: &[&str]) -> bool {
    element.namespace == Namespace::Html
        && names
            .iter()
            .any(|name| element.tag_name.eq_ignore_ascii_case(name))
}

fn nth_of_type(nth: Nth, siblings_before: usize) -> bool {
    nth.matches(siblings_before + 1)
}

fn parent_element(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.parent(node).filter(|&parent| tree.as_element(parent).is_some())
}

/// Element ancestors, nearest first. Stops at the document or at a
/// template-contents fragment.
fn ancestor_elements(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.ancestors(node)
        .take_while(move |&ancestor| tree.as_element(ancestor).is_some())
}

fn preceding_elements(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.preceding_siblings(node)
        .filter(move |&sibling| tree.as_element(sibling).is_some())
}

fn following_elements(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.following_siblings(node)
        .filter(move |&sibling| tree.as_element(sibling).is_some())
}

fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    preceding_elements(tree, node).next()
}

fn next_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    following_elements(tree, node).next()
}

/// Element siblings before (or after, with `following`) `node` that share
/// its tag name.
fn same_type_siblings<'a>(
    tree: &'a DomTree,
    node: NodeId,
    element: &'a ElementData,
    following: bool,
) -> impl Iterator<Item = NodeId> + 'a {
    let siblings = if following {
        tree.following_siblings(node)
    } else {
        tree.preceding_siblings(node)
    };
    siblings.filter(move |&sibling| {
        tree.as_element(sibling).is_some_and(|other| {
            other.namespace == element.namespace
                && other.tag_name.eq_ignore_ascii_case(&element.tag_name)
        })
    })
}
