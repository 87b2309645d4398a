//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Default id of the element preview content is rendered into.
pub const DEFAULT_CONTENT_REGION_ID: &str = "vellum-content";
/// Default id of the element holding the stylesheet in light mode.
pub const DEFAULT_STYLE_ID: &str = "vellum-style";
/// Default id of the injected user script element.
pub const DEFAULT_SCRIPT_ID: &str = "vellum-user-script";

/// Settings for one [`crate::PreviewRuntime`].
///
/// Everything that describes the editor comes from the `INIT` handshake;
/// this only describes the preview page itself and whom it trusts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Origin of the preview page.
    pub origin: String,
    /// Origin of the editor page; messages from anywhere else are dropped.
    pub parent_origin: String,
    /// Id of the content region. In shadow mode it is the shadow host.
    #[serde(default = "default_content_region_id")]
    pub content_region_id: String,
    /// Id of the document-level `<style>` element.
    #[serde(default = "default_style_id")]
    pub style_id: String,
    /// Id given to the injected user script element.
    #[serde(default = "default_script_id")]
    pub script_id: String,
}

fn default_content_region_id() -> String {
    DEFAULT_CONTENT_REGION_ID.to_string()
}

fn default_style_id() -> String {
    DEFAULT_STYLE_ID.to_string()
}

fn default_script_id() -> String {
    DEFAULT_SCRIPT_ID.to_string()
}

impl RuntimeConfig {
    /// Configuration for a preview page at `origin` embedded by
    /// `parent_origin`, with the default element ids.
    #[must_use]
    pub fn new(origin: impl Into<String>, parent_origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            parent_origin: parent_origin.into(),
            content_region_id: default_content_region_id(),
            style_id: default_style_id(),
            script_id: default_script_id(),
        }
    }

    /// Use `id` for the content region.
    #[must_use]
    pub fn with_content_region_id(mut self, id: impl Into<String>) -> Self {
        self.content_region_id = id.into();
        self
    }

    /// Use `id` for the stylesheet element.
    #[must_use]
    pub fn with_style_id(mut self, id: impl Into<String>) -> Self {
        self.style_id = id.into();
        self
    }

    /// Use `id` for the user script element.
    #[must_use]
    pub fn with_script_id(mut self, id: impl Into<String>) -> Self {
        self.script_id = id.into();
        self
    }
}
