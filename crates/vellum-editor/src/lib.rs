//! Editor-side core of the Vellum live editor.
//!
//! Connects the editable source text to the live preview:
//!
//! - **Canonicalization** ([`Canonicalizer`]): parse the source, tag every
//!   element with an identity token and serialize it again, keeping a map
//!   from each token to the source range the element came from
//! - **Source location** ([`SourceTextLocator`]): find the editable inner
//!   text or opening tag of the element a token names, and rewrite exactly
//!   that range
//! - **Editor addressing** ([`LineIndex`]): byte offsets to 1-based lines
//!   and UTF-16 columns
//! - **Preview synchronization** ([`PreviewBridge`]): the handshake with the
//!   preview surface, queued updates, selection highlighting and the
//!   utility-CSS compile cycle
//!
//! # Example
//!
//! ```
//! use vellum_editor::{IdentityScheme, canonicalize};
//!
//! let result = canonicalize("<div>A</div><span>B</span>", &IdentityScheme::default());
//! assert_eq!(
//!     result.canonical_html,
//!     r#"<div data-vellum-id="v1">A</div><span data-vellum-id="v2">B</span>"#
//! );
//! assert_eq!(result.range_of("v2").map(|r| (r.start, r.end)), Some((12, 26)));
//! ```

/// The editor side of the preview protocol.
pub mod bridge;
/// Canonical markup and the offset map.
pub mod canonicalize;
/// Interfaces to the editor, the stylesheet compiler and the shortcode
/// expander.
pub mod collaborators;
/// Bridge configuration.
pub mod config;
/// Debouncing.
pub mod debounce;
/// Identity tokens.
pub mod identity;
/// Byte offsets to editor positions.
pub mod line_index;
/// Locating and rewriting source regions.
pub mod locate;
/// Shortcode placeholders.
pub mod shortcode;

pub use bridge::{BridgeState, PreviewBridge, SelectionState};
pub use canonicalize::{
    CanonicalizationResult, CanonicalizeError, Canonicalizer, canonicalize, try_canonicalize,
};
pub use collaborators::{
    CompileError, CompileRequest, EditorSurface, ShortcodeExpander, ShortcodeRequest,
    UtilityCssCompiler,
};
pub use config::{BridgeConfig, DEFAULT_COMPILE_DEBOUNCE};
pub use debounce::Debouncer;
pub use identity::{DEFAULT_TOKEN_PREFIX, IdentityScheme, TokenAssignment, assign_tokens};
pub use line_index::{EditorRange, LineIndex, Position};
pub use locate::{
    EditError, EditableAttributes, EditableText, INLINE_PASSTHROUGH, SourceTextLocator,
    inner_range, locate_closing_tag,
};
pub use shortcode::{Shortcode, find_shortcodes};
