//! Which rules of a stylesheet apply to an element.
//!
//! Every step here degrades instead of failing: a selector the engine cannot
//! evaluate is retried with its pseudo-element tokens stripped and
//! otherwise treated as not matching, while a media query that cannot be
//! evaluated is treated as matching.

use vellum_dom::{DomTree, NodeId};

use crate::media::{MediaEnvironment, evaluate_media_query};
use crate::rule_index::{CssRuleDescriptor, CssRuleIndex, split_selectors, strip_comments};
use crate::selector::parse_selector;

/// Pseudo tokens the fallback removes before retrying a selector. Each may
/// be written with one or two colons; `part`, `slotted` and `cue` may carry
/// a parenthesized argument.
pub const UNSUPPORTED_PSEUDOS: [&str; 12] = [
    "before",
    "after",
    "first-line",
    "first-letter",
    "selection",
    "placeholder",
    "marker",
    "backdrop",
    "file-selector-button",
    "cue",
    "part",
    "slotted",
];

/// Remove the [`UNSUPPORTED_PSEUDOS`] tokens from `selector`.
///
/// Returns `None` when there is nothing to strip, so a caller can tell
/// "retry with this" apart from "retrying cannot help". Quoted strings are
/// left untouched.
#[must_use]
pub fn strip_unsupported_pseudos(selector: &str) -> Option<String> {
    let chars: Vec<char> = selector.chars().collect();
    let mut result = String::with_capacity(selector.len());
    let mut stripped = false;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(open) = quote {
            result.push(c);
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    result.push(next);
                    i += 1;
                }
            } else if c == open {
                quote = None;
            }
            i += 1;
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        if c == ':'
            && let Some(end) = unsupported_pseudo_end(&chars, i)
        {
            stripped = true;
            i = end;
            continue;
        }
        result.push(c);
        i += 1;
    }

    stripped.then(|| result.trim().to_string())
}

/// If an unsupported pseudo token starts at the colon at `start`, the index
/// just past it (including any argument).
fn unsupported_pseudo_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&':') {
        i += 1;
    }
    let name_start = i;
    while chars
        .get(i)
        .is_some_and(|&c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        i += 1;
    }
    let name: String = chars[name_start..i].iter().collect();
    if !UNSUPPORTED_PSEUDOS
        .iter()
        .any(|pseudo| pseudo.eq_ignore_ascii_case(&name))
    {
        return None;
    }
    if chars.get(i) != Some(&'(') {
        return Some(i);
    }

    let mut depth = 0_usize;
    while let Some(&c) = chars.get(i) {
        i += 1;
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    // Unbalanced argument: drop the rest of the selector.
    Some(i)
}

/// Whether `selector` matches `node`, never failing.
///
/// A selector the engine rejects is retried once with its
/// [`UNSUPPORTED_PSEUDOS`] removed. If there is nothing to remove, or the
/// stripped selector is also rejected, the answer is `false`.
#[must_use]
pub fn match_or_degrade(tree: &DomTree, node: NodeId, selector: &str) -> bool {
    let error = match parse_selector(selector) {
        Ok(parsed) => return parsed.matches(tree, node),
        Err(error) => error,
    };
    let Some(stripped) = strip_unsupported_pseudos(selector) else {
        log::debug!("selector `{selector}` not evaluated: {error}");
        return false;
    };
    match parse_selector(&stripped) {
        Ok(parsed) => parsed.matches(tree, node),
        Err(retry_error) => {
            log::debug!("selector `{selector}` not evaluated: {error}; stripped `{stripped}`: {retry_error}");
            false
        }
    }
}

/// Whether every media query list in `queries` matches `env`.
///
/// An empty sequence matches unconditionally. A query that cannot be
/// evaluated counts as matching.
#[must_use]
pub fn media_queries_match(queries: &[String], env: &MediaEnvironment) -> bool {
    queries
        .iter()
        .all(|query| match evaluate_media_query(query, env) {
            Ok(matches) => matches,
            Err(error) => {
                log::debug!("media query `{query}` treated as matching: {error}");
                true
            }
        })
}

/// Whether `rule` applies to `node`: its media conditions hold and at least
/// one selector of its list matches.
#[must_use]
pub fn rule_matches(
    rule: &CssRuleDescriptor,
    tree: &DomTree,
    node: NodeId,
    env: &MediaEnvironment,
) -> bool {
    media_queries_match(&rule.media_queries, env)
        && split_selectors(&strip_comments(&rule.selector_text))
            .iter()
            .any(|selector| match_or_degrade(tree, node, selector))
}

impl CssRuleIndex {
    /// The indexed rules that apply to `node`.
    #[must_use]
    pub fn matching(
        &self,
        tree: &DomTree,
        node: NodeId,
        env: &MediaEnvironment,
    ) -> Vec<CssRuleDescriptor> {
        self.rules()
            .iter()
            .filter(|rule| rule_matches(rule, tree, node, env))
            .cloned()
            .collect()
    }
}

/// Index `css` and return the rules that apply to `node`.
#[must_use]
pub fn find_matching_rules(
    css: &str,
    tree: &DomTree,
    node: NodeId,
    env: &MediaEnvironment,
) -> Vec<CssRuleDescriptor> {
    CssRuleIndex::parse(css).matching(tree, node, env)
}
