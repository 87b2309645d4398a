//! Property tests: the scanners never panic on arbitrary input and the
//! rule index only reports ranges that slice the stylesheet.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use vellum_css::{
    CssRuleIndex, MediaEnvironment, evaluate_media_query, parse_selector, split_selectors,
    strip_unsupported_pseudos,
};

/// Stylesheet-shaped input built from fragments, so that generated strings
/// hit braces, strings and comments far more often than random text would.
fn stylesheet_from(pieces: &[u8]) -> String {
    const FRAGMENTS: &[&str] = &[
        "{", "}", ";", "/*", "*/", "\"", "'", "\\", "@media", " (min-width: 1px)", "@supports",
        ".a", "p", ",", " ", "\n", "é", "color: red", "[x=\"{\"]", ":not(", ")", "&",
    ];
    pieces
        .iter()
        .map(|&b| FRAGMENTS[usize::from(b) % FRAGMENTS.len()])
        .collect()
}

#[quickcheck]
fn prop_split_selectors_yields_trimmed_non_empty_entries(input: String) -> bool {
    split_selectors(&input)
        .iter()
        .all(|selector| !selector.is_empty() && selector.trim() == selector)
}

#[quickcheck]
fn prop_rule_ranges_slice_the_stylesheet(pieces: Vec<u8>) -> TestResult {
    let css = stylesheet_from(&pieces);
    let index = CssRuleIndex::parse(&css);
    for rule in index.rules() {
        let Some(range) = rule.range() else {
            return TestResult::failed();
        };
        if range.end > css.len() || range.slice(&css).is_none() || rule.selector_text.is_empty() {
            return TestResult::failed();
        }
        if !css[range.start..].starts_with(rule.selector_text.as_str()) {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn prop_random_stylesheets_do_not_panic(input: String) -> bool {
    let index = CssRuleIndex::parse(&input);
    index.rules().iter().all(|rule| rule.end_offset <= input.len())
}

#[quickcheck]
fn prop_stripping_never_grows_the_selector(input: String) -> bool {
    strip_unsupported_pseudos(&input).is_none_or(|stripped| stripped.len() <= input.len())
}

#[quickcheck]
fn prop_selector_and_media_parsers_do_not_panic(input: String) -> bool {
    let _ = parse_selector(&input);
    let _ = evaluate_media_query(&input, &MediaEnvironment::default());
    true
}
