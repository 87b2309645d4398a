//! Property tests: arbitrary input never panics and every recorded location
//! is a valid slice of the source.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use vellum_dom::NodeId;
use vellum_html::{HTMLTokenizer, Token, parse_fragment};

/// Markup-heavy input built from fragments, so that generated strings hit
/// tags and references far more often than uniformly random text would.
fn markup_from(pieces: &[u8]) -> String {
    const FRAGMENTS: &[&str] = &[
        "<div>", "</div>", "<p>", "</p>", "<li>", "<table>", "<tr>", "<td>", "</table>",
        "<svg>", "</svg>", "<template>", "</template>", "<!--", "-->", "&amp;", "&#x41;",
        "&", "<", ">", "\"", "'", "=", " ", "é", "x", "<br/>", "<style>", "</style>",
        "<a href=", "<script>", "</script>",
    ];
    pieces
        .iter()
        .map(|&b| FRAGMENTS[usize::from(b) % FRAGMENTS.len()])
        .collect()
}

fn locations_are_valid(html: &str) -> TestResult {
    let Ok(tree) = parse_fragment(html) else {
        return TestResult::discard();
    };
    for id in tree.descendants(NodeId::ROOT) {
        let Some(location) = tree.as_element(id).and_then(|e| e.location) else {
            continue;
        };
        if location.span.slice(html).is_none() || location.start_tag.slice(html).is_none() {
            return TestResult::failed();
        }
        if location.span.start != location.start_tag.start
            || location.span.end < location.start_tag.end
        {
            return TestResult::failed();
        }
        if let Some(end_tag) = location.end_tag
            && (end_tag.slice(html).is_none() || end_tag.end != location.span.end)
        {
            return TestResult::failed();
        }
    }
    TestResult::passed()
}

#[quickcheck]
fn prop_tokenizer_ends_with_single_eof(input: String) -> bool {
    let tokens = HTMLTokenizer::tokenize(&input);
    tokens.iter().filter(|t| t.is_eof()).count() == 1
        && tokens.last() == Some(&Token::EndOfFile { offset: input.len() })
}

#[quickcheck]
fn prop_token_spans_slice_the_source(pieces: Vec<u8>) -> bool {
    let html = markup_from(&pieces);
    HTMLTokenizer::tokenize(&html)
        .iter()
        .filter_map(Token::span)
        .all(|span| span.slice(&html).is_some())
}

#[quickcheck]
fn prop_random_text_locations_are_valid(input: String) -> TestResult {
    locations_are_valid(&input)
}

#[quickcheck]
fn prop_markup_locations_are_valid(pieces: Vec<u8>) -> TestResult {
    locations_are_valid(&markup_from(&pieces))
}
