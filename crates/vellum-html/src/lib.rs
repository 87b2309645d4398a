//! Permissive HTML tokenizer, fragment parser and serializer for Vellum.
//!
//! # Scope
//!
//! This crate implements:
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Data, RCDATA, RAWTEXT, script data, PLAINTEXT and tag states
//!   - Comment, DOCTYPE and character reference handling
//!   - Byte ranges on every tag, comment and DOCTYPE token
//!
//! - **Fragment Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - "in body" implied end tags, scopes and list/heading handling
//!   - Table structure with implied `tbody`/`tr`
//!   - SVG and `MathML` foreign content, template contents
//!   - Start tag, end tag and overall span of every element
//!
//! - **Serializer** ([WHATWG § 13.3](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments))
//!
//! # Not Implemented
//!
//! - Adoption agency algorithm
//! - Foster parenting
//! - Script data escape states

/// HTML fragment tree construction.
pub mod parser;
/// HTML fragment serialization.
pub mod serializer;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

use thiserror::Error;

pub use parser::{
    FragmentParser, MAX_OPEN_ELEMENTS, ParseIssue, parse_fragment, parse_fragment_with_issues,
    tree_outline,
};
pub use serializer::{escape_attribute, escape_text, serialize_children, serialize_node};
pub use tokenizer::{Attribute, HTMLTokenizer, Token};

/// Errors that abandon a parse.
///
/// Malformed markup is never an error by itself; the tree builder recovers
/// the way browsers do. Only input the builder refuses to model fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Elements nest deeper than the tree builder allows.
    #[error("elements nest deeper than {limit} levels (at byte {offset})")]
    TooDeep {
        /// The nesting limit that was exceeded.
        limit: usize,
        /// Byte offset of the start tag that exceeded it.
        offset: usize,
    },
}
