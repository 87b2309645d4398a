//! Integration tests for the fragment tree builder.

use vellum_dom::{DomTree, ElementLocation, Namespace, NodeId, SourceRange};
use vellum_html::{
    FragmentParser, HTMLTokenizer, MAX_OPEN_ELEMENTS, ParseError, parse_fragment,
    parse_fragment_with_issues, serialize_node, tree_outline,
};

fn parse(html: &str) -> DomTree {
    parse_fragment(html).expect("fragment should parse")
}

fn range(start: usize, end: usize) -> SourceRange {
    SourceRange { start, end }
}

/// Tag names of the element children of `parent`.
fn child_tags(tree: &DomTree, parent: NodeId) -> Vec<String> {
    tree.element_children(parent)
        .filter_map(|id| tree.as_element(id).map(|e| e.tag_name.clone()))
        .collect()
}

/// The `n`th element in tree order named `tag`.
fn nth_element(tree: &DomTree, tag: &str, n: usize) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.is_element_named(id, tag))
        .nth(n)
        .unwrap_or_else(|| panic!("no <{tag}> #{n}"))
}

fn location(tree: &DomTree, id: NodeId) -> ElementLocation {
    tree.as_element(id)
        .and_then(|e| e.location)
        .expect("element should have a location")
}

// ========== source locations ==========

#[test]
fn test_explicitly_closed_elements() {
    let html = "<div id=\"a\"><p>x</p></div>";
    let tree = parse(html);

    let div = location(&tree, nth_element(&tree, "div", 0));
    assert_eq!(div.start_tag, range(0, 12));
    assert_eq!(div.end_tag, Some(range(20, 26)));
    assert_eq!(div.span, range(0, 26));

    let p = location(&tree, nth_element(&tree, "p", 0));
    assert_eq!(p.start_tag, range(12, 15));
    assert_eq!(p.end_tag, Some(range(16, 20)));
    assert_eq!(p.inner(), Some(range(15, 16)));
    assert_eq!(p.span.slice(html), Some("<p>x</p>"));
}

#[test]
fn test_implicitly_closed_list_items() {
    let tree = parse("<ul><li>a<li>b</ul>");
    let ul = nth_element(&tree, "ul", 0);
    assert_eq!(child_tags(&tree, ul), vec!["li", "li"]);

    let first = location(&tree, nth_element(&tree, "li", 0));
    assert_eq!(first.end_tag, None);
    assert_eq!(first.span, range(4, 9));
    assert_eq!(first.inner(), None);

    let second = location(&tree, nth_element(&tree, "li", 1));
    assert_eq!(second.span, range(9, 14));

    let ul = location(&tree, ul);
    assert_eq!(ul.span, range(0, 19));
}

#[test]
fn test_unclosed_elements_run_to_end_of_input() {
    let tree = parse("<div><span>x");
    for tag in ["div", "span"] {
        let loc = location(&tree, nth_element(&tree, tag, 0));
        assert_eq!(loc.end_tag, None, "<{tag}>");
        assert_eq!(loc.span.end, 12, "<{tag}>");
    }
}

#[test]
fn test_void_element_span_is_its_tag() {
    let tree = parse("<img src=x>text");
    let img = nth_element(&tree, "img", 0);
    assert!(tree.children(img).is_empty());
    assert_eq!(location(&tree, img).span, range(0, 11));
    assert_eq!(tree.children(NodeId::ROOT).len(), 2);
}

#[test]
fn test_self_closing_flag_on_non_void_element_is_ignored() {
    let tree = parse("<div/>x");
    let div = nth_element(&tree, "div", 0);
    assert!(location(&tree, div).self_closing);
    assert_eq!(tree.text_content(div), "x");
}

#[test]
fn test_multibyte_text_keeps_byte_offsets() {
    let html = "<p>héllo</p><b>x</b>";
    let tree = parse(html);
    let b = location(&tree, nth_element(&tree, "b", 0));
    assert_eq!(b.span.slice(html), Some("<b>x</b>"));
}

// ========== implied end tags ==========

#[test]
fn test_block_start_tag_closes_paragraph() {
    let tree = parse("<p>a<div>b</div>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["p", "div"]);
    let p = location(&tree, nth_element(&tree, "p", 0));
    assert_eq!(p.span, range(0, 4));
}

#[test]
fn test_heading_closes_open_heading() {
    let tree = parse("<h1>a<h2>b</h2>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["h1", "h2"]);
    assert_eq!(location(&tree, nth_element(&tree, "h1", 0)).span, range(0, 5));
}

#[test]
fn test_definition_list_items() {
    let tree = parse("<dl><dt>a<dd>b<dt>c</dl>");
    let dl = nth_element(&tree, "dl", 0);
    assert_eq!(child_tags(&tree, dl), vec!["dt", "dd", "dt"]);
}

#[test]
fn test_options_close_each_other() {
    let tree = parse("<select><option>a<option>b</select>");
    let select = nth_element(&tree, "select", 0);
    assert_eq!(child_tags(&tree, select), vec!["option", "option"]);
    assert!(location(&tree, select).end_tag.is_some());
}

#[test]
fn test_nested_anchor_closes_open_anchor() {
    let tree = parse("<a href=1>x<a href=2>y</a>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["a", "a"]);
    let first = location(&tree, nth_element(&tree, "a", 0));
    assert_eq!(first.span, range(0, 11));
}

#[test]
fn test_end_tag_closes_inner_inline_elements() {
    let tree = parse("<div><b><i>x</div>y");
    let div = nth_element(&tree, "div", 0);
    assert_eq!(tree.text_content(div), "x");
    let b = location(&tree, nth_element(&tree, "b", 0));
    assert_eq!(b.end_tag, None);
    assert_eq!(b.span.end, 12);
}

// ========== stray and ignored tags ==========

#[test]
fn test_stray_end_p_is_ignored() {
    let (tree, issues) = parse_fragment_with_issues("a</p>b").expect("fragment should parse");
    assert_eq!(child_tags(&tree, NodeId::ROOT), Vec::<String>::new());
    assert_eq!(tree.text_content(NodeId::ROOT), "ab");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].offset, 1);
    assert!(issues[0].message.contains("</p>"));
}

#[test]
fn test_stray_end_tag_inside_special_element_is_ignored() {
    let tree = parse("<span><div>x</span></div>");
    let div = location(&tree, nth_element(&tree, "div", 0));
    assert_eq!(div.end_tag, Some(range(19, 25)));
}

#[test]
fn test_document_level_tags_are_ignored() {
    let tree = parse("<html><head></head><body><p>x</p></body></html>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["p"]);
}

#[test]
fn test_end_br_becomes_br() {
    let tree = parse("a</br>b");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["br"]);
}

#[test]
fn test_comments_are_kept() {
    let tree = parse("<!--c--><p></p>");
    assert_eq!(serialize_node(&tree, NodeId::ROOT), "<!--c--><p></p>");
}

#[test]
fn test_doctype_is_reported_and_dropped() {
    let (tree, issues) =
        parse_fragment_with_issues("<!DOCTYPE html><p>x</p>").expect("fragment should parse");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["p"]);
    assert_eq!(issues.len(), 1);
}

// ========== tables ==========

#[test]
fn test_table_gets_implied_tbody() {
    let tree = parse("<table><tr><td>1</td></tr></table>");
    let table = nth_element(&tree, "table", 0);
    assert_eq!(child_tags(&tree, table), vec!["tbody"]);

    let tbody = nth_element(&tree, "tbody", 0);
    assert!(tree.as_element(tbody).is_some_and(|e| e.location.is_none()));
    assert_eq!(child_tags(&tree, tbody), vec!["tr"]);

    let td = location(&tree, nth_element(&tree, "td", 0));
    assert_eq!(td.span, range(11, 21));
    assert_eq!(location(&tree, table).span, range(0, 34));
}

#[test]
fn test_cells_close_each_other() {
    let tree = parse("<table><tr><td>a<td>b<tr><td>c</table>");
    let rows: Vec<NodeId> = tree
        .descendants(NodeId::ROOT)
        .filter(|&id| tree.is_element_named(id, "tr"))
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(child_tags(&tree, rows[0]), vec!["td", "td"]);
    assert_eq!(child_tags(&tree, rows[1]), vec!["td"]);
}

#[test]
fn test_col_gets_implied_colgroup() {
    let tree = parse("<table><col><tr><td>x</td></tr></table>");
    let table = nth_element(&tree, "table", 0);
    assert_eq!(child_tags(&tree, table), vec!["colgroup", "tbody"]);
}

#[test]
fn test_table_parts_outside_table_are_ignored() {
    let tree = parse("<td>x</td>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), Vec::<String>::new());
    assert_eq!(tree.text_content(NodeId::ROOT), "x");
}

#[test]
fn test_text_in_table_is_not_fostered() {
    let tree = parse("<table>x<tr><td>y</td></tr></table>");
    let table = nth_element(&tree, "table", 0);
    assert_eq!(tree.text_content(table), "xy");
}

// ========== foreign content ==========

#[test]
fn test_svg_names_are_adjusted() {
    let tree = parse("<svg viewbox=\"0 0 1 1\"><foreignobject><div></div></foreignobject><circle/></svg>");
    let svg = nth_element(&tree, "svg", 0);
    let data = tree.as_element(svg).expect("svg element");
    assert_eq!(data.namespace, Namespace::Svg);
    assert_eq!(data.get_attribute("viewBox"), Some("0 0 1 1"));
    assert_eq!(child_tags(&tree, svg), vec!["foreignObject", "circle"]);

    let div = nth_element(&tree, "div", 0);
    assert_eq!(tree.as_element(div).map(|e| e.namespace), Some(Namespace::Html));

    let circle = nth_element(&tree, "circle", 0);
    assert_eq!(tree.as_element(circle).map(|e| e.namespace), Some(Namespace::Svg));
    assert!(location(&tree, svg).end_tag.is_some());
}

#[test]
fn test_breakout_tag_leaves_svg() {
    let tree = parse("<svg><g><p>x</p>");
    assert_eq!(child_tags(&tree, NodeId::ROOT), vec!["svg", "p"]);
}

#[test]
fn test_mathml_namespace() {
    let tree = parse("<math><mi>x</mi></math>");
    let mi = nth_element(&tree, "mi", 0);
    assert_eq!(tree.as_element(mi).map(|e| e.namespace), Some(Namespace::MathMl));
}

// ========== template ==========

#[test]
fn test_template_content_goes_to_contents_fragment() {
    let tree = parse("<template><p>x</p></template>");
    let template = nth_element(&tree, "template", 0);
    assert!(tree.children(template).is_empty());

    let contents = tree
        .template_contents(template)
        .expect("template should have contents");
    assert_eq!(child_tags(&tree, contents), vec!["p"]);
    assert_eq!(
        serialize_node(&tree, template),
        "<template><p>x</p></template>"
    );
    assert_eq!(location(&tree, template).span, range(0, 29));
}

// ========== depth limit ==========

#[test]
fn test_deep_nesting_is_rejected() {
    let html = "<div>".repeat(600);
    let err = parse_fragment(&html).expect_err("nesting should be rejected");
    assert_eq!(
        err,
        ParseError::TooDeep {
            limit: MAX_OPEN_ELEMENTS,
            offset: MAX_OPEN_ELEMENTS * "<div>".len(),
        }
    );
}

#[test]
fn test_custom_depth_limit() {
    let tokens = HTMLTokenizer::tokenize("<b><i><u>x");
    let err = FragmentParser::new(tokens)
        .with_max_depth(2)
        .run()
        .expect_err("nesting should be rejected");
    assert_eq!(err, ParseError::TooDeep { limit: 2, offset: 6 });
}

#[test]
fn test_void_elements_do_not_count_toward_depth() {
    let html = "<br>".repeat(1000);
    let tree = parse(&html);
    assert_eq!(tree.children(NodeId::ROOT).len(), 1000);
}

// ========== outline ==========

#[test]
fn test_tree_outline() {
    let tree = parse("<p class=\"a\">hi there</p>");
    let outline = tree_outline(&tree, NodeId::ROOT);
    assert_eq!(
        outline,
        "#document\n  <p class=\"a\"> @0..25\n    \"hi\u{00B7}there\"\n"
    );
}
