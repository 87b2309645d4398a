//! Interfaces to the parts of the editor the bridge drives but does not own.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::line_index::EditorRange;

/// The text editor hosting the source and stylesheet panes.
pub trait EditorSurface {
    /// Decorate `range` of the source pane as the current selection.
    fn highlight_source(&mut self, range: EditorRange);

    /// Scroll the source pane so `range` is visible.
    fn reveal_source(&mut self, range: EditorRange);

    /// Decorate the stylesheet rules at `ranges`, replacing earlier rule
    /// decorations.
    fn highlight_css_rules(&mut self, ranges: &[EditorRange]);

    /// Remove every selection decoration from both panes.
    fn clear_highlights(&mut self);

    /// Show `status` to the user, or clear the status line with `None`.
    fn show_status(&mut self, status: Option<&str>);
}

/// A stylesheet compile request for the utility-CSS compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest {
    /// Monotonic request id; only the response to the latest id is used.
    pub id: u64,
    /// The markup whose class names the compiler scans.
    pub html_text: String,
    /// The author's compiler directives.
    pub css_directives: String,
}

/// Errors reported by the utility-CSS compiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The compiler rejected the input.
    #[error("stylesheet compile failed: {0}")]
    Rejected(String),
    /// The compiler could not be reached.
    #[error("stylesheet compiler unavailable: {0}")]
    Unavailable(String),
}

/// An external service that turns markup and directives into a stylesheet.
///
/// Requests are fire-and-forget; the answer comes back later through
/// [`crate::PreviewBridge::on_compile_result`] with the request's id.
pub trait UtilityCssCompiler {
    /// Start compiling.
    fn request(&mut self, request: CompileRequest);
}

/// A shortcode the bridge wants rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcodeRequest {
    /// Id minted by the bridge, unique for the bridge's lifetime.
    pub id: String,
    /// The placeholder's source text.
    pub source_fragment: String,
}

/// Renders shortcode placeholders into HTML.
pub trait ShortcodeExpander {
    /// Render `requests`, keyed by request id. Missing ids render as
    /// nothing.
    fn expand(&mut self, requests: &[ShortcodeRequest]) -> HashMap<String, String>;
}
