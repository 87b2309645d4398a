//! Tests for shortcode scanning and compile debouncing.

use std::time::{Duration, Instant};

use vellum_dom::SourceRange;
use vellum_editor::{Debouncer, find_shortcodes};

fn fragments(text: &str) -> Vec<String> {
    find_shortcodes(text)
        .into_iter()
        .map(|shortcode| shortcode.fragment)
        .collect()
}

// ===== Shortcodes =====

#[test]
fn test_standalone_shortcode() {
    let found = find_shortcodes(r#"a [gallery ids="1,2"] b"#);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "gallery");
    assert_eq!(found[0].fragment, r#"[gallery ids="1,2"]"#);
    assert_eq!(found[0].range, SourceRange { start: 2, end: 21 });
}

#[test]
fn test_self_closing_shortcode() {
    // a self-closed tag never encloses, even when a closing tag follows
    assert_eq!(fragments("[note /]x[/note]"), vec!["[note /]"]);
    assert_eq!(fragments("<p>[note/]</p>"), vec!["[note/]"]);
}

#[test]
fn test_enclosing_shortcode() {
    let text = r#"<p>[quote cite="x"]said [b]so[/b][/quote] done</p>"#;
    let found = find_shortcodes(text);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "quote");
    assert_eq!(found[0].fragment, r#"[quote cite="x"]said [b]so[/b][/quote]"#);
    assert_eq!(found[0].range.slice(text), Some(found[0].fragment.as_str()));
}

#[test]
fn test_several_shortcodes_in_order() {
    assert_eq!(
        fragments("[a] x [b-c] y [_d]"),
        vec!["[a]", "[b-c]", "[_d]"]
    );
}

#[test]
fn test_escaped_shortcodes_are_skipped() {
    assert_eq!(fragments("[[gallery]] [b]"), vec!["[b]"]);
}

#[test]
fn test_text_that_is_not_a_shortcode() {
    assert!(fragments("[1abc] [x=y] [ spaced] [] [open").is_empty());
    assert!(fragments("no brackets at all").is_empty());
}

#[test]
fn test_quoted_brackets_belong_to_the_tag() {
    assert_eq!(fragments(r#"[a title="]"]"#), vec![r#"[a title="]"]"#]);
}

#[test]
fn test_bracket_inside_a_tag_restarts_the_scan() {
    assert_eq!(fragments("[a [b]"), vec!["[b]"]);
}

#[test]
fn test_offsets_are_bytes() {
    let found = find_shortcodes("é[x]");
    assert_eq!(found[0].range, SourceRange { start: 2, end: 5 });
}

// ===== Debouncing =====

#[test]
fn test_debouncer_fires_once_after_the_quiet_period() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(300));
    assert!(!debouncer.is_pending());
    assert!(!debouncer.fire(start));

    debouncer.schedule(start);
    assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(300)));
    assert!(!debouncer.fire(start + Duration::from_millis(299)));
    assert!(debouncer.fire(start + Duration::from_millis(300)));
    assert!(!debouncer.fire(start + Duration::from_millis(600)));
}

#[test]
fn test_debouncer_restarts_on_each_request() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::from_millis(100));
    debouncer.schedule(start);
    debouncer.schedule(start + Duration::from_millis(80));
    assert!(!debouncer.fire(start + Duration::from_millis(150)));
    assert!(debouncer.fire(start + Duration::from_millis(180)));
}

#[test]
fn test_debouncer_cancel() {
    let start = Instant::now();
    let mut debouncer = Debouncer::new(Duration::ZERO);
    debouncer.schedule(start);
    debouncer.cancel();
    assert!(!debouncer.fire(start));
    assert_eq!(debouncer.interval(), Duration::ZERO);
}
