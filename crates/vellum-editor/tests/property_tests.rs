//! Property tests: canonicalization never panics, its offset map always
//! points inside the source, located text is exactly the source slice and
//! canonical markup canonicalizes to itself.

use std::collections::HashSet;

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use vellum_editor::{IdentityScheme, SourceTextLocator, assign_tokens, canonicalize};
use vellum_html::parse_fragment;

fn markup_from(pieces: &[u8]) -> String {
    const FRAGMENTS: &[&str] = &[
        "<div>", "</div>", "<p>", "</p>", "<span>", "</span>", "<li>", "<ul>", "</ul>",
        "<table>", "<tr>", "<td>", "</table>", "<template>", "</template>", "<br>", "<img/>",
        "<!--", "-->", "&amp;", "<", ">", "\"", " ", "é", "x", "\n",
        r#"<b data-vellum-id="v1">"#, r#"<i data-vellum-id="">"#, "</b>", "</i>", "<pre>",
    ];
    pieces
        .iter()
        .map(|&b| FRAGMENTS[usize::from(b) % FRAGMENTS.len()])
        .collect()
}

fn foreign_markup_from(pieces: &[u8]) -> String {
    const FRAGMENTS: &[&str] = &[
        "<svg>", "</svg>", "<math>", "</math>", "<script>", "</script>", "<circle/>", "<p>",
        "</p>", "<div>", "</div>", "<span>", "</span>", "<!--", "-->", "&amp;", " ", "x",
    ];
    pieces
        .iter()
        .map(|&b| FRAGMENTS[usize::from(b) % FRAGMENTS.len()])
        .collect()
}

fn ranges_are_in_bounds(html: &str) -> bool {
    let result = canonicalize(html, &IdentityScheme::default());
    result
        .map
        .values()
        .all(|range| range.start <= range.end && range.end <= html.len())
}

fn tokens_are_unique(html: &str) -> TestResult {
    let Ok(tree) = parse_fragment(html) else {
        return TestResult::discard();
    };
    let assignments = assign_tokens(&tree, &IdentityScheme::default(), html.len());
    let distinct: HashSet<&str> = assignments.iter().map(|a| a.token.as_str()).collect();
    TestResult::from_bool(distinct.len() == assignments.len())
}

fn located_text_is_the_source_slice(html: &str) -> bool {
    let result = canonicalize(html, &IdentityScheme::default());
    let locator = SourceTextLocator::default();
    result.map.keys().all(|token| {
        locator.editable_text(html, token).is_none_or(|located| {
            located.range.slice(html) == Some(located.text.as_str())
                && locator.apply_text_edit(html, token, &located.text).as_deref() == Ok(html)
        })
    })
}

fn canonical_markup_is_a_fixed_point(html: &str) -> TestResult {
    let scheme = IdentityScheme::default();
    let first = canonicalize(html, &scheme);
    if first.error.is_some() {
        return TestResult::discard();
    }
    let second = canonicalize(&first.canonical_html, &scheme);
    TestResult::from_bool(second.error.is_none() && second.canonical_html == first.canonical_html)
}

#[quickcheck]
fn prop_random_text_ranges_are_in_bounds(input: String) -> bool {
    ranges_are_in_bounds(&input)
}

#[quickcheck]
fn prop_markup_ranges_are_in_bounds(pieces: Vec<u8>) -> bool {
    ranges_are_in_bounds(&markup_from(&pieces))
}

#[quickcheck]
fn prop_markup_tokens_are_unique(pieces: Vec<u8>) -> TestResult {
    tokens_are_unique(&markup_from(&pieces))
}

#[quickcheck]
fn prop_random_text_located_text_is_the_source_slice(input: String) -> bool {
    located_text_is_the_source_slice(&input)
}

#[quickcheck]
fn prop_markup_located_text_is_the_source_slice(pieces: Vec<u8>) -> bool {
    located_text_is_the_source_slice(&markup_from(&pieces))
}

#[quickcheck]
fn prop_foreign_markup_canonicalizes_to_itself(pieces: Vec<u8>) -> TestResult {
    canonical_markup_is_a_fixed_point(&foreign_markup_from(&pieces))
}

#[test]
fn test_script_under_math_canonicalizes_to_itself() {
    let scheme = IdentityScheme::default();
    let first = canonicalize("<math><script><p>", &scheme);
    assert_eq!(
        first.canonical_html,
        r#"<math data-vellum-id="v1"><script data-vellum-id="v2"><p></script></math>"#
    );
    assert_eq!(canonicalize(&first.canonical_html, &scheme).canonical_html, first.canonical_html);
}
