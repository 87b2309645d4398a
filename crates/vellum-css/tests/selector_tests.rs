//! Integration tests for CSS selector parsing and matching.

use vellum_css::selector::{
    AttributeOperator, Combinator, Nth, PseudoClass, SelectorError, SimpleSelector, Specificity,
    parse_selector,
};
use vellum_dom::{DomTree, NodeId};
use vellum_html::parse_fragment;

fn tree(html: &str) -> DomTree {
    parse_fragment(html).expect("fragment should parse")
}

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.get_element_by_id(NodeId::ROOT, id)
        .unwrap_or_else(|| panic!("no element #{id}"))
}

fn matches(tree: &DomTree, id: &str, selector: &str) -> bool {
    parse_selector(selector)
        .unwrap_or_else(|e| panic!("`{selector}` should parse: {e}"))
        .matches(tree, by_id(tree, id))
}

// ===== Parsing =====

#[test]
fn test_parse_compound_and_child_combinator() {
    let list = parse_selector("ul > LI.item").expect("valid selector");
    let complex = &list.0[0];

    assert_eq!(complex.combinators, vec![Combinator::Child]);
    assert_eq!(
        complex.compounds[1].simple_selectors,
        vec![
            SimpleSelector::Type("li".to_string()),
            SimpleSelector::Class("item".to_string()),
        ]
    );
}

#[test]
fn test_parse_all_combinators() {
    let list = parse_selector("a b>c + d~e").expect("valid selector");
    assert_eq!(
        list.0[0].combinators,
        vec![
            Combinator::Descendant,
            Combinator::Child,
            Combinator::NextSibling,
            Combinator::SubsequentSibling,
        ]
    );
}

#[test]
fn test_parse_list() {
    let list = parse_selector("a, .b ,#c").expect("valid selector");
    assert_eq!(list.0.len(), 3);
}

#[test]
fn test_parse_attribute_selector() {
    let list = parse_selector("[ data-x ^= \"Y\" i ]").expect("valid selector");
    let SimpleSelector::Attribute(attribute) = &list.0[0].compounds[0].simple_selectors[0] else {
        panic!("expected an attribute selector");
    };
    assert_eq!(attribute.name, "data-x");
    assert_eq!(
        attribute.operator,
        Some((AttributeOperator::Prefix, "Y".to_string()))
    );
    assert!(attribute.case_insensitive);
}

#[test]
fn test_parse_dynamic_pseudo_class_never_matches() {
    let list = parse_selector("a:hover").expect("valid selector");
    assert_eq!(
        list.0[0].compounds[0].simple_selectors[1],
        SimpleSelector::NeverMatch("hover".to_string())
    );
}

#[test]
fn test_parse_nth_child_of() {
    let list = parse_selector("li:nth-child(2n + 1 of .x)").expect("valid selector");
    let SimpleSelector::PseudoClass(PseudoClass::NthChild(nth, Some(of))) =
        &list.0[0].compounds[0].simple_selectors[1]
    else {
        panic!("expected :nth-child with a selector list");
    };
    assert_eq!(*nth, Nth { a: 2, b: 1 });
    assert_eq!(of.0.len(), 1);
}

#[test]
fn test_parse_errors() {
    assert_eq!(parse_selector(""), Err(SelectorError::Empty));
    assert_eq!(parse_selector("a,,b"), Err(SelectorError::Empty));
    assert_eq!(parse_selector("a >"), Err(SelectorError::UnexpectedEnd));
    assert_eq!(parse_selector("[x"), Err(SelectorError::UnexpectedEnd));
    assert_eq!(
        parse_selector("p::before"),
        Err(SelectorError::PseudoElement("::before".to_string()))
    );
    assert_eq!(
        parse_selector("p:after"),
        Err(SelectorError::PseudoElement(":after".to_string()))
    );
    assert_eq!(
        parse_selector("div:has(> p)"),
        Err(SelectorError::Unsupported("has".to_string()))
    );
    assert_eq!(
        parse_selector(":bogus"),
        Err(SelectorError::UnknownPseudoClass("bogus".to_string()))
    );
    assert!(matches!(
        parse_selector("a } b"),
        Err(SelectorError::UnexpectedToken { offset: 2, .. })
    ));
    assert!(matches!(
        parse_selector("#1x"),
        Err(SelectorError::UnexpectedToken { .. })
    ));
    assert!(matches!(
        parse_selector(":nth-child(2x)"),
        Err(SelectorError::InvalidNth(_))
    ));
}

#[test]
fn test_nth_parse() {
    assert_eq!(Nth::parse("odd"), Ok(Nth { a: 2, b: 1 }));
    assert_eq!(Nth::parse("EVEN"), Ok(Nth { a: 2, b: 0 }));
    assert_eq!(Nth::parse("3"), Ok(Nth { a: 0, b: 3 }));
    assert_eq!(Nth::parse("-n+3"), Ok(Nth { a: -1, b: 3 }));
    assert_eq!(Nth::parse("+n"), Ok(Nth { a: 1, b: 0 }));
    assert_eq!(Nth::parse("2n - 1"), Ok(Nth { a: 2, b: -1 }));
    assert!(Nth::parse("2n1").is_err());
    assert!(Nth::parse("").is_err());
}

#[test]
fn test_nth_matches() {
    let first_three = Nth { a: -1, b: 3 };
    assert!(first_three.matches(1));
    assert!(first_three.matches(3));
    assert!(!first_three.matches(4));

    let odd = Nth { a: 2, b: 1 };
    assert!(odd.matches(1));
    assert!(!odd.matches(2));
    assert!(odd.matches(5));

    assert!(Nth { a: 0, b: 2 }.matches(2));
    assert!(!Nth { a: 0, b: 2 }.matches(3));
}

#[test]
fn test_specificity() {
    let specificity = |s: &str| parse_selector(s).expect("valid selector").max_specificity();
    assert_eq!(specificity("#a .b p"), Specificity(1, 1, 1));
    assert_eq!(specificity(":where(#a) p"), Specificity(0, 0, 1));
    assert_eq!(specificity(":is(#a, .b)"), Specificity(1, 0, 0));
    assert_eq!(specificity("li:nth-child(2 of .x)"), Specificity(0, 2, 1));
    assert_eq!(specificity("*"), Specificity(0, 0, 0));
    assert_eq!(specificity("a, #b"), Specificity(1, 0, 0));
}

// ===== Matching: simple selectors =====

#[test]
fn test_type_class_id() {
    let t = tree("<div id=\"d\" class=\"a b\">x</div>");
    assert!(matches(&t, "d", "div"));
    assert!(matches(&t, "d", "DIV"));
    assert!(matches(&t, "d", "*"));
    assert!(matches(&t, "d", ".a.b"));
    assert!(matches(&t, "d", "#d"));
    assert!(!matches(&t, "d", ".c"));
    assert!(!matches(&t, "d", ".A"));
    assert!(!matches(&t, "d", "span"));
}

#[test]
fn test_attribute_operators() {
    let t = tree(
        "<a id=\"l\" href=\"https://x.test/a.png\" lang=\"en-US\" class=\"one two\" data-k=\"MiXed\">l</a>",
    );
    assert!(matches(&t, "l", "[href]"));
    assert!(matches(&t, "l", "[HREF]"));
    assert!(matches(&t, "l", "[href^=https]"));
    assert!(matches(&t, "l", "[href$=\".png\"]"));
    assert!(matches(&t, "l", "[href*=\"x.test\"]"));
    assert!(matches(&t, "l", "[lang|=en]"));
    assert!(!matches(&t, "l", "[lang|=e]"));
    assert!(matches(&t, "l", "[class~=two]"));
    assert!(!matches(&t, "l", "[class~=tw]"));
    assert!(!matches(&t, "l", "[data-k=mixed]"));
    assert!(matches(&t, "l", "[data-k=mixed i]"));
    assert!(!matches(&t, "l", "[href^=\"\"]"));
    assert!(!matches(&t, "l", "[title]"));
}

// ===== Matching: combinators =====

#[test]
fn test_descendant_backtracks() {
    let t = tree(
        "<div class=\"a\"><div class=\"b\"><div class=\"b\"><p class=\"c\" id=\"t\">x</p></div></div></div>",
    );
    // The nearest .b has no .a parent; the outer one does.
    assert!(matches(&t, "t", ".a > .b .c"));
    assert!(matches(&t, "t", ".a .c"));
    assert!(!matches(&t, "t", ".a > .c"));
}

#[test]
fn test_child_combinator() {
    let t = tree("<ul><li id=\"i\"><span id=\"s\">x</span></li></ul>");
    assert!(matches(&t, "i", "ul > li"));
    assert!(!matches(&t, "s", "ul > span"));
    assert!(matches(&t, "s", "ul span"));
}

#[test]
fn test_sibling_combinators() {
    let t = tree("<h1>t</h1>text<p id=\"p1\">a</p><!-- c --><p id=\"p2\">b</p>");
    assert!(matches(&t, "p1", "h1 + p"));
    assert!(!matches(&t, "p2", "h1 + p"));
    assert!(matches(&t, "p2", "p + p"));
    assert!(matches(&t, "p2", "h1 ~ p"));
    assert!(!matches(&t, "p1", "p ~ p"));
}

// ===== Matching: pseudo-classes =====

#[test]
fn test_structural_pseudo_classes() {
    let t = tree(
        "<ul id=\"u\"><li id=\"a\">1</li><li id=\"b\" class=\"x\">2</li><li id=\"c\" class=\"x\">3</li></ul>",
    );
    assert!(matches(&t, "a", "li:first-child"));
    assert!(matches(&t, "c", "li:last-child"));
    assert!(!matches(&t, "b", ":first-child"));
    assert!(matches(&t, "b", ":nth-child(2)"));
    assert!(matches(&t, "c", ":nth-child(odd)"));
    assert!(matches(&t, "a", ":nth-last-child(3)"));
    assert!(matches(&t, "c", ":nth-child(2 of .x)"));
    assert!(!matches(&t, "a", ":nth-child(1 of .x)"));
    assert!(matches(&t, "b", "li:nth-of-type(2)"));
    assert!(matches(&t, "b", "li:nth-last-of-type(2)"));
    assert!(matches(&t, "u", ":only-child"));
    assert!(!matches(&t, "a", ":only-child"));
    assert!(matches(&t, "u", ":root"));
    assert!(!matches(&t, "a", ":root"));
}

#[test]
fn test_of_type_pseudo_classes() {
    let t = tree("<div><span id=\"s\">a</span><em id=\"e1\">b</em><em id=\"e2\">c</em></div>");
    assert!(matches(&t, "s", "span:only-of-type"));
    assert!(matches(&t, "s", "span:first-of-type"));
    assert!(matches(&t, "e1", "em:first-of-type"));
    assert!(!matches(&t, "e1", "em:last-of-type"));
    assert!(matches(&t, "e2", "em:last-of-type"));
    assert!(!matches(&t, "e2", ":only-of-type"));
}

#[test]
fn test_empty_pseudo_class() {
    let t = tree("<p id=\"a\"></p><p id=\"b\"><!-- c --></p><p id=\"c\"> </p><p id=\"d\"><br></p>");
    assert!(matches(&t, "a", ":empty"));
    assert!(matches(&t, "b", ":empty"));
    assert!(!matches(&t, "c", ":empty"));
    assert!(!matches(&t, "d", ":empty"));
}

#[test]
fn test_logical_pseudo_classes() {
    let t = tree("<p id=\"p\" class=\"x\">a</p>");
    assert!(matches(&t, "p", ":not(.y)"));
    assert!(!matches(&t, "p", ":not(.y, .x)"));
    assert!(matches(&t, "p", ":is(.y, #p)"));
    assert!(matches(&t, "p", "p:where(.x)"));
    assert!(!matches(&t, "p", ":where(div)"));
}

#[test]
fn test_link_and_form_pseudo_classes() {
    let t = tree(concat!(
        "<a id=\"a\" href=\"/\">a</a><a id=\"n\">n</a>",
        "<input id=\"c\" type=\"checkbox\" checked>",
        "<input id=\"t\" type=\"text\" checked required>",
        "<select><option id=\"o\" selected>o</option></select>",
        "<button id=\"b\" disabled>b</button>",
    ));
    assert!(matches(&t, "a", ":link"));
    assert!(matches(&t, "a", ":any-link"));
    assert!(!matches(&t, "n", ":link"));
    assert!(!matches(&t, "a", "a:visited"));
    assert!(matches(&t, "c", ":checked"));
    assert!(!matches(&t, "t", ":checked"));
    assert!(matches(&t, "o", ":checked"));
    assert!(matches(&t, "b", ":disabled"));
    assert!(!matches(&t, "b", ":enabled"));
    assert!(matches(&t, "c", ":enabled"));
    assert!(matches(&t, "t", ":required"));
    assert!(matches(&t, "c", ":optional"));
    assert!(!matches(&t, "a", ":optional"));
}

#[test]
fn test_escaped_identifiers() {
    let t = tree("<div id=\"a:b\" class=\"1x\">x</div>");
    assert!(matches(&t, "a:b", "#a\\:b"));
    assert!(matches(&t, "a:b", ".\\31 x"));
}
