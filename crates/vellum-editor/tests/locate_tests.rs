//! Tests for locating and rewriting source regions by identity token.

use vellum_dom::{Attribute, ElementLocation, SourceRange};
use vellum_editor::{
    EditError, EditableAttributes, IdentityScheme, SourceTextLocator, inner_range,
    locate_closing_tag,
};

fn locator() -> SourceTextLocator {
    SourceTextLocator::new(IdentityScheme::default())
}

fn range(start: usize, end: usize) -> SourceRange {
    SourceRange { start, end }
}

// ===== Closing tags =====

#[test]
fn test_closing_tag_balances_nested_tags() {
    assert_eq!(locate_closing_tag("<div><div></div></div>", "div", 5), Some(16));
    assert_eq!(locate_closing_tag("<div>a</div>", "div", 5), Some(6));
}

#[test]
fn test_closing_tag_is_case_insensitive() {
    assert_eq!(locate_closing_tag("<P>x</p>", "p", 3), Some(4));
    assert_eq!(locate_closing_tag("<p>x</P >", "P", 3), Some(4));
}

#[test]
fn test_closing_tag_ignores_other_names_with_the_same_prefix() {
    assert_eq!(locate_closing_tag("<p><pre></pre></p>", "p", 3), Some(14));
    assert_eq!(locate_closing_tag("<p>x</param></p>", "p", 3), Some(12));
}

#[test]
fn test_self_closing_and_void_tags_leave_depth_alone() {
    assert_eq!(locate_closing_tag("x<div/>y</div>", "div", 0), Some(8));
    assert_eq!(locate_closing_tag("a<br>b</br>", "br", 0), Some(6));
}

#[test]
fn test_quoted_angle_bracket_does_not_end_a_tag() {
    assert_eq!(locate_closing_tag("<p title='>'>x</p></p>", "p", 0), Some(18));
}

#[test]
fn test_tags_inside_comments_are_skipped() {
    assert_eq!(locate_closing_tag("<div><!-- </div> --></div>", "div", 5), Some(20));
    assert_eq!(locate_closing_tag("<div><!-- <div> --></div>", "div", 5), Some(19));
    assert_eq!(locate_closing_tag("<div><!--></div>", "div", 5), Some(10));
    assert_eq!(locate_closing_tag("<div><!-- </div>", "div", 5), None);
}

#[test]
fn test_missing_closing_tag() {
    assert_eq!(locate_closing_tag("<div>", "div", 5), None);
    assert_eq!(locate_closing_tag("<div><div></div>", "div", 5), None);
    assert_eq!(locate_closing_tag("", "div", 0), None);
}

// ===== Inner ranges =====

#[test]
fn test_inner_range_prefers_the_parsed_end_tag() {
    let location = ElementLocation {
        start_tag: range(0, 3),
        end_tag: Some(range(5, 9)),
        span: range(0, 9),
        self_closing: false,
    };
    assert_eq!(inner_range("<p>hi</p>", "p", &location), Some(range(3, 5)));
}

#[test]
fn test_inner_range_falls_back_to_scanning() {
    let location = ElementLocation::opened(range(0, 3), false);
    assert_eq!(
        inner_range("<p>a<p>b</p></p>", "p", &location),
        Some(range(3, 12))
    );
    assert_eq!(inner_range("<p>abc", "p", &location), None);
}

// ===== Editable text =====

#[test]
fn test_editable_text_of_a_simple_element() {
    let html = "<div>A</div><span>B</span>";
    let div = locator().editable_text(html, "v1").expect("div is editable");
    assert_eq!(div.text, "A");
    assert_eq!(div.range, range(5, 6));

    let span = locator().editable_text(html, "v2").expect("span is editable");
    assert_eq!(span.text, "B");
    assert_eq!(&html[span.range.start..span.range.end], span.text);
}

#[test]
fn test_void_elements_are_never_text_editable() {
    let scheme = IdentityScheme::new("data-id", "t").expect("valid scheme");
    let locator = SourceTextLocator::new(scheme);
    assert_eq!(locator.editable_text(r#"<img data-id="t1">"#, "t1"), None);
    assert!(locator.editable_attributes(r#"<img data-id="t1">"#, "t1").is_some());
}

#[test]
fn test_structural_children_block_text_editing() {
    let html = "<div><p>x</p></div>";
    assert_eq!(locator().editable_text(html, "v1"), None);
    assert_eq!(
        locator().editable_text(html, "v2").map(|t| t.text),
        Some("x".to_string())
    );
}

#[test]
fn test_inline_children_are_flat_text() {
    let html = "<p>a<br>b<span>c</span><!--d--></p>";
    let located = locator().editable_text(html, "v1").expect("p is editable");
    assert_eq!(located.text, "a<br>b<span>c</span><!--d-->");
    assert_eq!(located.range, range(3, 31));
}

#[test]
fn test_invalid_tag_names_are_flat_text() {
    let html = "<p>a<x@y>b</p>";
    let located = locator().editable_text(html, "v1").expect("p is editable");
    assert_eq!(located.text, "a<x@y>b");
}

#[test]
fn test_custom_elements_block_text_editing() {
    assert_eq!(
        locator().editable_text("<p>a<my-tag>b</my-tag></p>", "v1"),
        None
    );
}

#[test]
fn test_element_without_closing_tag_is_unlocatable() {
    let html = "<ul><li>one<li>two</ul>";
    assert_eq!(locator().editable_text(html, "v2"), None);
    assert_eq!(
        locator().editable_text(html, "v3").map(|t| t.text),
        None,
        "the last item is closed by </ul>, which is not its own end tag"
    );
}

#[test]
fn test_template_contents_are_checked() {
    let html = "<template>hello</template>";
    let located = locator().editable_text(html, "v1").expect("template is editable");
    assert_eq!(located.text, "hello");
}

#[test]
fn test_multibyte_text_range() {
    let html = "<p>héllo</p>";
    let located = locator().editable_text(html, "v1").expect("p is editable");
    assert_eq!(located.text, "héllo");
    assert_eq!(located.range, range(3, 9));
    assert_eq!(located.range.to_utf16(html), range(3, 8));
}

#[test]
fn test_unknown_token_and_unparseable_source() {
    assert_eq!(locator().editable_text("<p>a</p>", "v9"), None);
    assert_eq!(locator().editable_text(&"<div>".repeat(600), "v1"), None);
}

#[test]
fn test_tokens_written_in_the_source_are_honoured() {
    let html = r#"<p>a</p><p data-vellum-id="mine">b</p>"#;
    assert_eq!(
        locator().editable_text(html, "mine").map(|t| t.text),
        Some("b".to_string())
    );
    assert_eq!(
        locator().editable_text(html, "v1").map(|t| t.text),
        Some("a".to_string())
    );
}

// ===== Editable attributes =====

#[test]
fn test_editable_attributes_of_an_element() {
    let html = r#"<a href="/x?a=1&amp;b" class='c' hidden>t</a>"#;
    let located = locator().editable_attributes(html, "v1").expect("a is located");
    assert_eq!(
        located.attributes,
        vec![
            Attribute::new("href", "/x?a=1&b"),
            Attribute::new("class", "c"),
            Attribute::new("hidden", ""),
        ]
    );
    assert_eq!(located.range, range(0, 40));
    assert_eq!(located.tag_name, "a");
    assert!(!located.is_void);
    assert!(!located.self_closing);
    assert_eq!(located.identity, None);
}

#[test]
fn test_editable_attributes_report_void_and_self_closing() {
    let located = locator()
        .editable_attributes(r#"<p>x</p><input type="text" />"#, "v2")
        .expect("input is located");
    assert!(located.is_void);
    assert!(located.self_closing);
    assert_eq!(located.range, range(8, 29));
}

#[test]
fn test_identity_attribute_is_not_listed() {
    let html = r#"<p data-vellum-id="v7" class="x">a</p>"#;
    let located = locator().editable_attributes(html, "v7").expect("p is located");
    assert_eq!(located.attributes, vec![Attribute::new("class", "x")]);
    assert_eq!(
        located.identity,
        Some(Attribute::new("data-vellum-id", "v7"))
    );
}

#[test]
fn test_render_opening_tag() {
    let attributes = EditableAttributes {
        attributes: vec![
            Attribute::new("class", "a \"b\" & c"),
            Attribute::new("hidden", ""),
        ],
        range: range(0, 0),
        tag_name: "input".to_string(),
        is_void: true,
        self_closing: true,
        identity: None,
    };
    assert_eq!(
        attributes.render_opening_tag(),
        r#"<input class="a &quot;b&quot; &amp; c" hidden />"#
    );

    let plain = EditableAttributes {
        attributes: Vec::new(),
        self_closing: false,
        tag_name: "p".to_string(),
        ..attributes
    };
    assert_eq!(plain.render_opening_tag(), "<p>");
}

// ===== Surgical edits =====

#[test]
fn test_text_edit_rewrites_only_the_inner_range() {
    let html = "<div>A</div>\n<span>B</span>";
    assert_eq!(
        locator().apply_text_edit(html, "v2", "Bee"),
        Ok("<div>A</div>\n<span>Bee</span>".to_string())
    );
}

#[test]
fn test_text_edit_refuses_unlocatable_elements() {
    assert_eq!(
        locator().apply_text_edit("<p>a</p>", "v9", "x"),
        Err(EditError::Unlocatable {
            token: "v9".to_string()
        })
    );
    assert!(matches!(
        locator().apply_text_edit("<br>", "v1", "x"),
        Err(EditError::Unlocatable { .. })
    ));
}

#[test]
fn test_attribute_edit_rewrites_only_the_opening_tag() {
    let html = "<h1>T</h1><p class=\"old\">x</p>";
    let edited = locator()
        .apply_attribute_edit(
            html,
            "v2",
            &[Attribute::new("class", "new"), Attribute::new("title", "a&b")],
        )
        .expect("edit applies");
    assert_eq!(edited, r#"<h1>T</h1><p class="new" title="a&amp;b">x</p>"#);
}

#[test]
fn test_attribute_edit_keeps_the_source_token() {
    let html = r#"<p data-vellum-id="k" class="a">x</p>"#;
    let edited = locator()
        .apply_attribute_edit(
            html,
            "k",
            &[
                Attribute::new("id", "z"),
                Attribute::new("data-vellum-id", "other"),
            ],
        )
        .expect("edit applies");
    assert_eq!(edited, r#"<p id="z" data-vellum-id="k">x</p>"#);
}

#[test]
fn test_attribute_edit_of_a_self_closing_void_element() {
    let edited = locator()
        .apply_attribute_edit(
            r#"<img src="a.png"/>"#,
            "v1",
            &[Attribute::new("src", "b.png"), Attribute::new("alt", "")],
        )
        .expect("edit applies");
    assert_eq!(edited, r#"<img src="b.png" alt />"#);
}

#[test]
fn test_attribute_edit_rejects_bad_names() {
    assert_eq!(
        locator().apply_attribute_edit("<p>x</p>", "v1", &[Attribute::new("bad name", "x")]),
        Err(EditError::InvalidAttributeName("bad name".to_string()))
    );
    assert!(matches!(
        locator().apply_attribute_edit("<p>x</p>", "v5", &[]),
        Err(EditError::Unlocatable { .. })
    ));
}
