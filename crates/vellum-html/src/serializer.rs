//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)

use vellum_dom::{DomTree, NodeId, NodeType};

/// Elements whose text children are serialized without escaping.
///
/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element, or if the parent of current node is a
/// noscript element and scripting is enabled for the node, then append the
/// value of current node's data IDL attribute literally."
///
/// Matched on the tag name in every namespace: the tokenizer picks the text
/// state from the start tag name alone, so a `<script>` under `<svg>` or
/// `<math>` holds raw text too.
const RAW_TEXT_PARENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

/// Serialize the children of `node`, i.e. its `innerHTML`.
///
/// For a template element the children of its template contents are
/// serialized instead.
#[must_use]
pub fn serialize_children(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    let container = tree.template_contents(node).unwrap_or(node);
    for &child in tree.children(container) {
        serialize_node_into(tree, child, &mut out);
    }
    out
}

/// Serialize `node` itself, i.e. its `outerHTML`. Document and fragment
/// nodes serialize as their children.
#[must_use]
pub fn serialize_node(tree: &DomTree, node: NodeId) -> String {
    let mut out = String::new();
    serialize_node_into(tree, node, &mut out);
    out
}

fn serialize_node_into(tree: &DomTree, node: NodeId, out: &mut String) {
    let Some(entry) = tree.get(node) else {
        return;
    };
    match &entry.node_type {
        NodeType::Document | NodeType::DocumentFragment { .. } => {
            for &child in tree.children(node) {
                serialize_node_into(tree, child, out);
            }
        }
        NodeType::Element(data) => {
            // "Append a U+003C LESS-THAN SIGN character (<), followed by
            // tagname."
            out.push('<');
            out.push_str(&data.tag_name);
            // "For each attribute that the element has, append a U+0020 SPACE
            // character, the attribute's serialized name, a U+003D EQUALS SIGN
            // character (=), a U+0022 QUOTATION MARK character ("), the
            // attribute's value, escaped as described below in attribute
            // mode, and a second U+0022 QUOTATION MARK character (")."
            for attr in &data.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');

            // "If current node serializes as void, then continue on to the
            // next child node at this point."
            if data.is_void() {
                return;
            }

            let container = data.template_contents.unwrap_or(node);
            for &child in tree.children(container) {
                serialize_node_into(tree, child, out);
            }

            out.push_str("</");
            out.push_str(&data.tag_name);
            out.push('>');
        }
        NodeType::Text(text) => {
            let raw = tree
                .parent(node)
                .and_then(|parent| tree.as_element(parent))
                .is_some_and(|parent| RAW_TEXT_PARENTS.contains(&parent.tag_name.as_str()));
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        // "Append the literal string "<!--" (U+003C LESS-THAN SIGN, U+0021
        // EXCLAMATION MARK, U+002D HYPHEN-MINUS, U+002D HYPHEN-MINUS),
        // followed by the value of current node's data IDL attribute,
        // followed by the literal string "-->""
        NodeType::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// "Replace any occurrence of the "&" character by the string "&amp;".
/// Replace any occurrences of the U+00A0 NO-BREAK SPACE character by the
/// string "&nbsp;". If the algorithm was invoked in the attribute mode,
/// replace any occurrences of the """ character by the string "&quot;".
/// If the algorithm was not invoked in the attribute mode, replace any
/// occurrences of the "<" character by the string "&lt;", and any
/// occurrences of the ">" character by the string "&gt;"."
pub fn escape_into(value: &str, attribute_mode: bool, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

/// Escape `value` for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(value, true, &mut out);
    out
}

/// Escape `value` for use as element text content.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_into(value, false, &mut out);
    out
}
