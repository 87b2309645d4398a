//! HTML fragment tree construction.

/// Fragment tree builder.
pub mod core;
/// SVG and `MathML` name adjustments.
pub mod foreign_content;

use std::fmt::Write;

use vellum_dom::{DomTree, NodeId, NodeType};

pub use self::core::{FragmentParser, MAX_OPEN_ELEMENTS, ParseIssue, is_special_element};
use crate::ParseError;
use crate::tokenizer::HTMLTokenizer;

/// Parse `html` as the contents of a `<body>` element.
///
/// Top-level nodes become children of [`NodeId::ROOT`]. Every element built
/// from a start tag carries its [`vellum_dom::ElementLocation`] in `html`.
///
/// # Errors
///
/// Returns [`ParseError::TooDeep`] for pathologically nested input.
pub fn parse_fragment(html: &str) -> Result<DomTree, ParseError> {
    FragmentParser::new(HTMLTokenizer::tokenize(html)).run()
}

/// Like [`parse_fragment`], also returning the recoverable problems found.
///
/// # Errors
///
/// Returns [`ParseError::TooDeep`] for pathologically nested input.
pub fn parse_fragment_with_issues(html: &str) -> Result<(DomTree, Vec<ParseIssue>), ParseError> {
    FragmentParser::new(HTMLTokenizer::tokenize(html)).run_with_issues()
}

/// Render the subtree under `id` as an indented outline, one node per line.
#[must_use]
pub fn tree_outline(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_outline(tree, id, 0, &mut out);
    out
}

fn write_outline(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}#document"),
        NodeType::DocumentFragment { .. } => writeln!(out, "{prefix}#fragment"),
        NodeType::Element(data) => {
            let mut line = format!("{prefix}<{}", data.tag_name);
            for attr in &data.attrs {
                let _ = write!(line, " {}=\"{}\"", attr.name, attr.value);
            }
            line.push('>');
            if let Some(location) = data.location {
                let _ = write!(line, " @{}..{}", location.span.start, location.span.end);
            }
            writeln!(out, "{line}")
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            writeln!(out, "{prefix}\"{display}\"")
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
    };
    if let Some(contents) = tree.template_contents(id) {
        write_outline(tree, contents, indent + 1, out);
    }
    for &child_id in tree.children(id) {
        write_outline(tree, child_id, indent + 1, out);
    }
}
