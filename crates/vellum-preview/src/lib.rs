//! Preview surface for the Vellum live editor.
//!
//! Everything that runs inside the preview frame lives here:
//! - **Runtime** - [`PreviewRuntime`], the message handler for the frame
//! - **Document** - the preview page and how rendered content is attached
//! - **Overlay** - hover and selection outlines
//! - **Layout** - geometry supplied by whatever draws the page, and hit testing
//! - **Scripts** - fetching external script sources

pub mod config;
pub mod document;
pub mod layout;
pub mod overlay;
pub mod runtime;
pub mod scripts;

pub use config::RuntimeConfig;
pub use document::{PreviewDocument, escape_style_text};
pub use layout::{LayoutProvider, Point, Rect, hit_test};
pub use overlay::{Highlight, Overlay, nearest_identified};
pub use runtime::PreviewRuntime;
pub use scripts::{LoadedScript, NetworkFetcher, ScriptFetcher};
