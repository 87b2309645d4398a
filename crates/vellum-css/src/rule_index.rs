//! A flat index of the style rules in a stylesheet.
//!
//! The scan does not tokenize: it only tracks comments, quoted strings and
//! the block structure, so it tolerates any declaration syntax and unknown
//! at-rules. Offsets are byte offsets into the stylesheet text.

use serde::{Deserialize, Serialize};
use vellum_dom::SourceRange;

/// One style rule: its full selector list (before comma splitting), where
/// it sits in the stylesheet and the `@media` conditions around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CssRuleDescriptor {
    /// The prelude of the rule, leading whitespace and comments removed.
    pub selector_text: String,
    /// Byte offset of the first selector character.
    pub start_offset: usize,
    /// Byte offset just past the rule's closing `}`, or the stylesheet
    /// length for a rule left open at the end of input.
    pub end_offset: usize,
    /// Parameters of the enclosing `@media` rules, outermost first.
    pub media_queries: Vec<String>,
}

impl CssRuleDescriptor {
    /// The rule's extent in the stylesheet.
    #[must_use]
    pub fn range(&self) -> Option<SourceRange> {
        SourceRange::new(self.start_offset, self.end_offset)
    }
}

/// What an open `{` belongs to.
#[derive(Debug)]
enum BlockContext {
    Rule {
        selector_text: String,
        start_offset: usize,
        media_queries: Vec<String>,
    },
    Media,
    /// Any other at-rule, or a block with an empty prelude.
    Opaque,
}

/// The style rules of one stylesheet, in the order their blocks close.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssRuleIndex {
    rules: Vec<CssRuleDescriptor>,
}

impl CssRuleIndex {
    /// Scan `css` left to right, tracking comments, strings and a stack of
    /// open blocks.
    ///
    /// A prelude is the text since the last `{`, `}` or `;`. Before a `{` it
    /// names what the block is: `@media` pushes its parameters onto the
    /// media stack, other at-rules open opaque blocks, anything else is a
    /// style rule. Nested rules are indexed too. An unmatched `}` is
    /// ignored; blocks still open at the end of input close there.
    #[must_use]
    pub fn parse(css: &str) -> Self {
        let bytes = css.as_bytes();
        let mut rules = Vec::new();
        let mut stack: Vec<BlockContext> = Vec::new();
        let mut media_stack: Vec<String> = Vec::new();
        let mut prelude_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = comment_end(bytes, i);
                    continue;
                }
                quote @ (b'"' | b'\'') => {
                    i = string_end(bytes, i, quote);
                    continue;
                }
                b'{' => {
                    stack.push(open_block(css, prelude_start, i, &mut media_stack));
                    prelude_start = i + 1;
                }
                b'}' => {
                    if let Some(context) = stack.pop() {
                        close_block(context, i + 1, &mut rules, &mut media_stack);
                    }
                    prelude_start = i + 1;
                }
                b';' => prelude_start = i + 1,
                _ => {}
            }
            i += 1;
        }

        while let Some(context) = stack.pop() {
            close_block(context, css.len(), &mut rules, &mut media_stack);
        }
        log::trace!("indexed {} CSS rules", rules.len());
        Self { rules }
    }

    /// The indexed rules.
    #[must_use]
    pub fn rules(&self) -> &[CssRuleDescriptor] {
        &self.rules
    }

    /// Take the indexed rules.
    #[must_use]
    pub fn into_rules(self) -> Vec<CssRuleDescriptor> {
        self.rules
    }
}

fn close_block(
    context: BlockContext,
    end_offset: usize,
    rules: &mut Vec<CssRuleDescriptor>,
    media_stack: &mut Vec<String>,
) {
    match context {
        BlockContext::Rule {
            selector_text,
            start_offset,
            media_queries,
        } => rules.push(CssRuleDescriptor {
            selector_text,
            start_offset,
            end_offset,
            media_queries,
        }),
        BlockContext::Media => {
            let _ = media_stack.pop();
        }
        BlockContext::Opaque => {}
    }
}

/// Classify the prelude `css[from..to]` of a `{` that is being opened.
fn open_block(css: &str, from: usize, to: usize, media_stack: &mut Vec<String>) -> BlockContext {
    let start = skip_blank(css.as_bytes(), from, to);
    let prelude = css[start..to].trim_end();
    if prelude.is_empty() {
        return BlockContext::Opaque;
    }
    if prelude.starts_with('@') {
        return match at_rule_parts(prelude) {
            Some((name, params)) if name.eq_ignore_ascii_case("media") => {
                media_stack.push(params.to_string());
                BlockContext::Media
            }
            _ => BlockContext::Opaque,
        };
    }
    BlockContext::Rule {
        selector_text: prelude.to_string(),
        start_offset: start,
        media_queries: media_stack.clone(),
    }
}

/// Split `@name params` into its name (`\w[\w-]*`) and trimmed parameters.
fn at_rule_parts(prelude: &str) -> Option<(&str, &str)> {
    let rest = prelude.strip_prefix('@')?;
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    if !rest.bytes().next().is_some_and(is_word) {
        return None;
    }
    let name_len = rest
        .bytes()
        .position(|b| !(is_word(b) || b == b'-'))
        .unwrap_or(rest.len());
    Some((&rest[..name_len], rest[name_len..].trim()))
}

/// Skip whitespace and comments between `from` and `to`.
fn skip_blank(bytes: &[u8], mut from: usize, to: usize) -> usize {
    while from < to {
        if bytes[from].is_ascii_whitespace() {
            from += 1;
        } else if bytes[from] == b'/' && bytes.get(from + 1) == Some(&b'*') {
            from = comment_end(bytes, from).min(to);
        } else {
            break;
        }
    }
    from
}

/// The offset just past the comment opening at `start`, or the end of input.
fn comment_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return i + 2;
        }
        i += 1;
    }
    bytes.len()
}

/// The offset just past the string opening at `start`. Backslash escapes
/// the next byte; an unterminated string runs to the end of input.
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Split a selector list at top-level commas.
///
/// Commas inside parentheses, brackets or quoted strings do not split;
/// the parenthesis and bracket depths are tracked separately and must both
/// be zero. Entries are trimmed and empty entries dropped.
#[must_use]
pub fn split_selectors(selector_text: &str) -> Vec<String> {
    let mut selectors = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0_usize;
    let mut bracket_depth = 0_usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in selector_text.chars() {
        if let Some(open) = quote {
            current.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            ',' if paren_depth == 0 && bracket_depth == 0 => {
                push_trimmed(&mut selectors, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    push_trimmed(&mut selectors, &current);
    selectors
}

fn push_trimmed(selectors: &mut Vec<String>, selector: &str) {
    let trimmed = selector.trim();
    if !trimmed.is_empty() {
        selectors.push(trimmed.to_string());
    }
}

/// Remove every terminated `/* ... */` comment (shortest match). An
/// unterminated `/*` is left in place.
#[must_use]
pub fn strip_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("/*") {
        let Some(close) = rest[open + 2..].find("*/") else {
            break;
        };
        result.push_str(&rest[..open]);
        rest = &rest[open + 2 + close + 2..];
    }
    result.push_str(rest);
    result
}
