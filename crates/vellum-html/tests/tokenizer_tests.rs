//! Integration tests for the HTML tokenizer.

use vellum_dom::SourceRange;
use vellum_html::tokenizer::{Attribute, HTMLTokenizer, Token};

fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::tokenize(input)
}

/// Concatenate every character token.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|t| match t {
            Token::Character { data } => Some(*data),
            _ => None,
        })
        .collect()
}

fn tags_of(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !matches!(t, Token::Character { .. }))
        .map(ToString::to_string)
        .collect()
}

fn range(start: usize, end: usize) -> SourceRange {
    SourceRange { start, end }
}

// ========== tags and spans ==========

#[test]
fn test_start_and_end_tag_spans() {
    let tokens = tokenize("<p class=\"a\">hi</p>");

    assert_eq!(
        tokens[0],
        Token::StartTag {
            name: "p".to_string(),
            self_closing: false,
            attributes: vec![Attribute {
                name: "class".to_string(),
                value: "a".to_string(),
            }],
            span: range(0, 13),
        }
    );
    assert_eq!(text_of(&tokens), "hi");
    assert_eq!(
        tokens[3],
        Token::EndTag {
            name: "p".to_string(),
            span: range(15, 19),
        }
    );
    assert_eq!(tokens[4], Token::EndOfFile { offset: 19 });
    assert_eq!(tokens.len(), 5);
}

#[test]
fn test_spans_are_byte_offsets() {
    // "é" is two bytes in UTF-8.
    let tokens = tokenize("<p>é</p>");
    let end_tag = tokens.iter().find(|t| matches!(t, Token::EndTag { .. }));
    assert_eq!(end_tag.and_then(Token::span), Some(range(5, 9)));
}

#[test]
fn test_names_are_lowercased() {
    let tokens = tokenize("<DIV ID=x></Div>");
    assert_eq!(tags_of(&tokens), vec!["<div id=\"x\">", "</div>", "EOF"]);
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/><img src=a />");
    let flags: Vec<bool> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::StartTag { self_closing, .. } => Some(*self_closing),
            _ => None,
        })
        .collect();
    assert_eq!(flags, vec![true, true]);
}

#[test]
fn test_attribute_value_forms() {
    let tokens = tokenize("<input a=1 b='two' c=\"three\" d>");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected a start tag, got {}", tokens[0]);
    };
    let pairs: Vec<(&str, &str)> = attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("a", "1"), ("b", "two"), ("c", "three"), ("d", "")]
    );
}

#[test]
fn test_duplicate_attributes_keep_first() {
    let tokens = tokenize("<a href=1 HREF=2>");
    assert_eq!(tags_of(&tokens)[0], "<a href=\"1\">");
}

#[test]
fn test_end_of_input_inside_tag_drops_the_tag() {
    let tokens = tokenize("<div class=\"a");
    assert_eq!(tokens, vec![Token::EndOfFile { offset: 13 }]);
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("a < b");
    assert_eq!(text_of(&tokens), "a < b");
}

#[test]
fn test_empty_end_tag_is_dropped() {
    let tokens = tokenize("a</>b");
    assert_eq!(text_of(&tokens), "ab");
    assert_eq!(tokens.len(), 3);
}

#[test]
fn test_carriage_returns_are_preserved() {
    let tokens = tokenize("a\r\nb");
    assert_eq!(text_of(&tokens), "a\r\nb");
}

// ========== comments and declarations ==========

#[test]
fn test_comment_span() {
    let tokens = tokenize("<!-- hi -->x");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_string(),
            span: range(0, 11),
        }
    );
}

#[test]
fn test_unterminated_comment_runs_to_end() {
    let tokens = tokenize("<!-- open");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " open".to_string(),
            span: range(0, 9),
        }
    );
    assert!(tokens[1].is_eof());
}

#[test]
fn test_processing_instruction_is_bogus_comment() {
    let tokens = tokenize("<?xml version=\"1.0\"?>");
    assert_eq!(tags_of(&tokens)[0], "<!--?xml version=\"1.0\"?-->");
}

#[test]
fn test_cdata_is_bogus_comment() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert_eq!(tags_of(&tokens)[0], "<!--[CDATA[x]]-->");
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(
        tokens[0],
        Token::Doctype {
            name: Some("html".to_string()),
            span: range(0, 15),
        }
    );
}

// ========== raw text ==========

#[test]
fn test_style_content_is_raw_text() {
    let tokens = tokenize("<style>a<b>&amp;</style>");
    assert_eq!(text_of(&tokens), "a<b>&amp;");
    assert_eq!(tags_of(&tokens), vec!["<style>", "</style>", "EOF"]);
}

#[test]
fn test_script_ends_only_at_matching_end_tag() {
    let tokens = tokenize("<script>if (a</b) {}</SCRIPT>");
    assert_eq!(text_of(&tokens), "if (a</b) {}");
    let end_tag = tokens.iter().find(|t| matches!(t, Token::EndTag { .. }));
    assert_eq!(end_tag.and_then(Token::span), Some(range(20, 29)));
}

#[test]
fn test_title_is_rcdata() {
    let tokens = tokenize("<title>&amp;<b></title>");
    assert_eq!(text_of(&tokens), "&<b>");
}

#[test]
fn test_self_closing_script_does_not_switch_state() {
    let tokens = tokenize("<script/><b>");
    assert_eq!(tags_of(&tokens), vec!["<script />", "<b>", "EOF"]);
}

// ========== character references ==========

#[test]
fn test_named_references_in_text() {
    let tokens = tokenize("a &amp; b &lt; &hellip;");
    assert_eq!(text_of(&tokens), "a & b < \u{2026}");
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let tokens = tokenize("&copy 2024 &notit;");
    assert_eq!(text_of(&tokens), "\u{00A9} 2024 \u{00AC}it;");
}

#[test]
fn test_unknown_reference_is_left_alone() {
    let tokens = tokenize("&bogus; & &;");
    assert_eq!(text_of(&tokens), "&bogus; & &;");
}

#[test]
fn test_numeric_references() {
    let tokens = tokenize("&#65;&#x42;&#0;&#128;&#xD800;&#x110000;");
    assert_eq!(text_of(&tokens), "AB\u{FFFD}\u{20AC}\u{FFFD}\u{FFFD}");
}

#[test]
fn test_numeric_reference_without_digits() {
    let tokens = tokenize("&#; &#x;");
    assert_eq!(text_of(&tokens), "&#; &#x;");
}

#[test]
fn test_references_in_attribute_values() {
    let tokens = tokenize("<a title=\"&amp;&quot;\" href=\"?x=1&amp=2\">");
    let Token::StartTag { attributes, .. } = &tokens[0] else {
        panic!("expected a start tag, got {}", tokens[0]);
    };
    assert_eq!(attributes[0].value, "&\"");
    // Historical: `&amp` followed by `=` in an attribute stays literal.
    assert_eq!(attributes[1].value, "?x=1&amp=2");
}

#[test]
fn test_reference_at_end_of_input() {
    let tokens = tokenize("a&");
    assert_eq!(text_of(&tokens), "a&");
    assert!(tokens.last().is_some_and(Token::is_eof));
}

// ========== robustness ==========

#[test]
fn test_every_stream_ends_with_one_eof() {
    let inputs = [
        "",
        "<",
        "</",
        "<!",
        "<!-",
        "<!--",
        "<!---",
        "<a",
        "<a ",
        "<a b",
        "<a b=",
        "<a b='",
        "<a /",
        "&#",
        "&#x",
        "&#x4",
        "<!DOCTYPE",
        "<!DOCTYPE html x",
        "<textarea></text",
        "<script><",
    ];
    for input in inputs {
        let tokens = tokenize(input);
        let eofs = tokens.iter().filter(|t| t.is_eof()).count();
        assert_eq!(eofs, 1, "input {input:?}");
        assert_eq!(
            tokens.last(),
            Some(&Token::EndOfFile {
                offset: input.len()
            }),
            "input {input:?}"
        );
    }
}
