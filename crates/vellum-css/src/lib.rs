//! CSS rule indexing and selector matching for the Vellum live editor.
//!
//! # Scope
//!
//! This crate implements:
//! - **Rule Index**: a forgiving scan of a stylesheet into rule descriptors
//!   (selector list, byte range, enclosing `@media` chain), selector-list
//!   splitting and comment stripping
//!
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Ident, function, hash, string, number, dimension and delimiter tokens
//!   - Comments and escape sequences
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal and attribute selectors
//!   - All four combinators, with backtracking
//!   - Structural, logical, link and form pseudo-classes
//!
//! - **Media Queries** ([Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/))
//!   - Query lists, `not`/`only`, media types, `and`/`or`/`not` conditions
//!   - Viewport, resolution, preference and interaction features, range syntax
//!
//! - **Matching**: which rules apply to an element, with the degrade rules
//!   of [`match_or_degrade`] and [`media_queries_match`]
//!
//! # Not Implemented
//!
//! - `:has()`, `:lang()`, `:dir()` and namespace prefixes
//! - Declarations, the cascade and computed values

/// Rule matching with graceful degradation.
pub mod matching;
/// Media query parsing and evaluation per [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/).
pub mod media;
/// Stylesheet rule indexing.
pub mod rule_index;
/// CSS selector parsing and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;

pub use matching::{
    UNSUPPORTED_PSEUDOS, find_matching_rules, match_or_degrade, media_queries_match, rule_matches,
    strip_unsupported_pseudos,
};
pub use media::{MediaEnvironment, MediaQueryError, MediaQueryList, evaluate_media_query};
pub use rule_index::{CssRuleDescriptor, CssRuleIndex, split_selectors, strip_comments};
pub use selector::{SelectorError, SelectorList, parse_selector};
