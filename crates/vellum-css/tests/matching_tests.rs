//! Integration tests for rule matching and its degrade paths.

use vellum_css::{
    CssRuleIndex, MediaEnvironment, find_matching_rules, match_or_degrade, media_queries_match,
    rule_matches, strip_unsupported_pseudos,
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

fn queries(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

// ===== Pseudo token stripping =====

#[test]
fn test_strip_pseudo_elements() {
    assert_eq!(strip_unsupported_pseudos("p::before"), Some("p".to_string()));
    assert_eq!(strip_unsupported_pseudos("p:after"), Some("p".to_string()));
    assert_eq!(
        strip_unsupported_pseudos("li::marker, p:first-line"),
        Some("li, p".to_string())
    );
    assert_eq!(
        strip_unsupported_pseudos("input::PLACEHOLDER"),
        Some("input".to_string())
    );
    assert_eq!(
        strip_unsupported_pseudos("a::after:hover"),
        Some("a:hover".to_string())
    );
}

#[test]
fn test_strip_functional_pseudo_elements() {
    assert_eq!(
        strip_unsupported_pseudos("::part(label) span"),
        Some("span".to_string())
    );
    assert_eq!(
        strip_unsupported_pseudos("::slotted(span:not(.x)) b"),
        Some("b".to_string())
    );
    assert_eq!(strip_unsupported_pseudos("video::cue(b"), Some("video".to_string()));
}

#[test]
fn test_strip_returns_none_when_nothing_to_strip() {
    assert_eq!(strip_unsupported_pseudos("a:hover"), None);
    assert_eq!(strip_unsupported_pseudos("div > p"), None);
    assert_eq!(strip_unsupported_pseudos(":beforehand"), None);
    assert_eq!(strip_unsupported_pseudos("[title='::before']"), None);
}

// ===== match_or_degrade =====

#[test]
fn test_match_or_degrade() {
    let t = tree("<p id=\"p\" class=\"x\">text</p>");
    let p = by_id(&t, "p");

    assert!(match_or_degrade(&t, p, "p"));
    assert!(match_or_degrade(&t, p, "p::before"));
    assert!(match_or_degrade(&t, p, ".x::after"));
    assert!(match_or_degrade(&t, p, "p::part(thing)"));
    assert!(!match_or_degrade(&t, p, "div::before"));
    assert!(!match_or_degrade(&t, p, "a:hover"));
    assert!(!match_or_degrade(&t, p, "p:has(span)"));
    assert!(!match_or_degrade(&t, p, "p:bogus"));
    assert!(!match_or_degrade(&t, p, "p >"));
    assert!(!match_or_degrade(&t, p, ""));
}

// ===== Media queries =====

#[test]
fn test_media_queries_match() {
    let env = MediaEnvironment::default();
    assert!(media_queries_match(&[], &env));
    assert!(media_queries_match(&queries(&["(min-width: 800px)"]), &env));
    assert!(media_queries_match(
        &queries(&["screen", "(min-width: 800px)"]),
        &env
    ));
    assert!(!media_queries_match(
        &queries(&["(min-width: 800px)", "(max-width: 100px)"]),
        &env
    ));
}

#[test]
fn test_unevaluable_media_query_matches() {
    let env = MediaEnvironment::default();
    assert!(media_queries_match(&queries(&["(color)"]), &env));
    assert!(media_queries_match(&queries(&["garbage ((("]), &env));
    assert!(!media_queries_match(&queries(&["(color)", "print"]), &env));
}

// ===== Rule matching =====

#[test]
fn test_find_matching_rules() {
    let t = tree("<div><p id=\"p\" class=\"x\">text</p></div>");
    let p = by_id(&t, "p");
    let css = concat!(
        ".x { } p { } ",
        "@media (max-width: 600px) { p { } } ",
        "@media (min-width: 600px) { p.x, q { } } ",
        "span { } p::before { } ",
        "/* c */ p /* x */ , span { } ",
        "div > p:first-child { } div + p { }",
    );

    let matched: Vec<String> = find_matching_rules(css, &t, p, &MediaEnvironment::default())
        .into_iter()
        .map(|rule| rule.selector_text)
        .collect();
    assert_eq!(
        matched,
        vec![
            ".x",
            "p",
            "p.x, q",
            "p::before",
            "p /* x */ , span",
            "div > p:first-child",
        ]
    );
}

#[test]
fn test_matching_respects_environment() {
    let t = tree("<p id=\"p\">text</p>");
    let p = by_id(&t, "p");
    let index = CssRuleIndex::parse("@media (max-width: 600px) { p { color: red } }");

    assert!(index.matching(&t, p, &MediaEnvironment::default()).is_empty());
    let phone = MediaEnvironment::with_viewport(375.0, 667.0);
    assert_eq!(index.matching(&t, p, &phone).len(), 1);
}

#[test]
fn test_rule_matches_top_level_root() {
    let t = tree("<main id=\"m\"><p>text</p></main>");
    let m = by_id(&t, "m");
    let rules = CssRuleIndex::parse(":root { } main:root { } :root > main { }").into_rules();
    let env = MediaEnvironment::default();

    assert!(rule_matches(&rules[0], &t, m, &env));
    assert!(rule_matches(&rules[1], &t, m, &env));
    assert!(!rule_matches(&rules[2], &t, m, &env));
}

#[test]
fn test_matching_ranges_point_at_rules() {
    let t = tree("<p id=\"p\">text</p>");
    let p = by_id(&t, "p");
    let css = "a { } p { color: red }";
    let rules = find_matching_rules(css, &t, p, &MediaEnvironment::default());

    assert_eq!(rules.len(), 1);
    assert_eq!(
        &css[rules[0].start_offset..rules[0].end_offset],
        "p { color: red }"
    );
}
