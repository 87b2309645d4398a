//! Integration tests for fragment serialization.

use vellum_dom::{DomTree, ElementData, NodeId};
use vellum_html::{escape_attribute, escape_text, parse_fragment, serialize_children, serialize_node};

fn reserialize(html: &str) -> String {
    let tree = parse_fragment(html).expect("fragment should parse");
    serialize_children(&tree, NodeId::ROOT)
}

#[test]
fn test_well_formed_markup_is_reproduced() {
    let html = "<div class=\"a\"><p>x <b>y</b></p><img src=\"i.png\"></div>";
    assert_eq!(reserialize(html), html);
}

#[test]
fn test_implied_end_tags_are_written_out() {
    assert_eq!(
        reserialize("<ul><li>a<li>b</ul>"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn test_attributes_are_quoted_and_escaped() {
    assert_eq!(
        reserialize("<a title='say \"hi\"' href=x&amp;y>t</a>"),
        "<a title=\"say &quot;hi&quot;\" href=\"x&amp;y\">t</a>"
    );
}

#[test]
fn test_text_is_escaped() {
    assert_eq!(reserialize("a &lt; b &amp;&nbsp;c"), "a &lt; b &amp;&nbsp;c");
}

#[test]
fn test_raw_text_is_not_escaped() {
    let html = "<style>a > b { content: \"&\" }</style><script>if (a < b && c) {}</script>";
    assert_eq!(reserialize(html), html);
}

#[test]
fn test_raw_text_under_foreign_elements_is_not_escaped() {
    let once = reserialize("<math><script><p>");
    assert_eq!(once, "<math><script><p></script></math>");
    assert_eq!(reserialize(&once), once);

    let html = "<svg><style>a > b {}</style></svg>";
    assert_eq!(reserialize(html), html);
}

#[test]
fn test_void_elements_have_no_end_tag() {
    assert_eq!(reserialize("<br/><hr><input value=1>"), "<br><hr><input value=\"1\">");
}

#[test]
fn test_svg_serializes_adjusted_names() {
    assert_eq!(
        reserialize("<svg viewbox=\"0 0 2 2\"><circle r=\"1\"/></svg>"),
        "<svg viewBox=\"0 0 2 2\"><circle r=\"1\"></circle></svg>"
    );
}

#[test]
fn test_serialize_node_is_outer_html() {
    let tree = parse_fragment("<p id=x>a</p><p>b</p>").expect("fragment should parse");
    let first = tree.element_children(NodeId::ROOT).next().expect("a <p>");
    assert_eq!(serialize_node(&tree, first), "<p id=\"x\">a</p>");
    assert_eq!(serialize_children(&tree, first), "a");
}

#[test]
fn test_serialize_built_tree() {
    let mut tree = DomTree::new();
    let mut data = ElementData::new("span");
    data.set_attribute("data-x", "1 < 2");
    let span = tree.create_element(data);
    tree.append_child(NodeId::ROOT, span);
    let text = tree.create_text("<&>");
    tree.append_child(span, text);

    assert_eq!(
        serialize_node(&tree, NodeId::ROOT),
        "<span data-x=\"1 < 2\">&lt;&amp;&gt;</span>"
    );
}

#[test]
fn test_escape_helpers() {
    assert_eq!(escape_attribute("a\"b&c<d"), "a&quot;b&amp;c<d");
    assert_eq!(escape_text("a\"b&c<d>"), "a\"b&amp;c&lt;d&gt;");
}
