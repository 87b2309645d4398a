//! Integration tests for named character reference lookup.

use vellum_html::tokenizer::named_character_references::{EntityMatch, longest_match, lookup_entity};

#[test]
fn test_longest_match_with_semicolon() {
    assert_eq!(
        longest_match("amp;x"),
        Some(EntityMatch {
            len: 4,
            replacement: "&",
            terminated: true,
        })
    );
}

#[test]
fn test_longest_match_legacy_without_semicolon() {
    assert_eq!(
        longest_match("ampx"),
        Some(EntityMatch {
            len: 3,
            replacement: "&",
            terminated: false,
        })
    );
}

#[test]
fn test_longest_match_prefers_longer_name() {
    // "sup" is not an entity by itself, "sup2" is.
    let found = longest_match("sup2;").expect("sup2 should match");
    assert_eq!(found.len, 5);
    assert_eq!(found.replacement, "\u{00B2}");
}

#[test]
fn test_non_legacy_name_needs_semicolon() {
    assert_eq!(longest_match("hellip"), None);
    assert_eq!(
        longest_match("hellip;").map(|m| m.replacement),
        Some("\u{2026}")
    );
}

#[test]
fn test_unknown_name() {
    assert_eq!(longest_match("xyz;"), None);
    assert_eq!(longest_match(""), None);
}

#[test]
fn test_lookup_entity() {
    assert_eq!(lookup_entity("lt;"), Some("<"));
    assert_eq!(lookup_entity("lt"), Some("<"));
    assert_eq!(lookup_entity("mdash;"), Some("\u{2014}"));
    assert_eq!(lookup_entity("mdash"), None);
    assert_eq!(lookup_entity("nope;"), None);
}
