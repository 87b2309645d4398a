//! Bridge configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vellum_common::protocol::PreviewSettings;
use vellum_css::MediaEnvironment;

use crate::identity::IdentityScheme;

/// Default quiet period before a utility-CSS compile is requested.
pub const DEFAULT_COMPILE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Settings for one [`crate::PreviewBridge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Origin of the editor page.
    pub editor_origin: String,
    /// Origin of the preview surface; messages from anywhere else are
    /// dropped.
    pub preview_origin: String,
    /// Identifier of the edited post, used to build session ids.
    pub post_id: String,
    /// Attach preview content under a shadow root.
    #[serde(default)]
    pub shadow_mode: bool,
    /// Outline elements under the pointer in the preview.
    #[serde(default = "default_highlight")]
    pub highlight: bool,
    /// The stylesheet is compiled from directives by the utility-CSS
    /// compiler instead of written by hand.
    #[serde(default)]
    pub utility_css: bool,
    /// Quiet period before a compile request, in milliseconds.
    #[serde(default = "default_compile_debounce_ms")]
    pub compile_debounce_ms: u64,
    /// Identity attribute and token format.
    #[serde(default)]
    pub identity: IdentityScheme,
    /// The preview viewport, for evaluating `@media` rules when matching.
    #[serde(default)]
    pub media: MediaEnvironment,
}

const fn default_highlight() -> bool {
    true
}

#[allow(clippy::cast_possible_truncation)]
const fn default_compile_debounce_ms() -> u64 {
    DEFAULT_COMPILE_DEBOUNCE.as_millis() as u64
}

impl BridgeConfig {
    /// Configuration with default flags for a post edited at `editor_origin`
    /// and previewed at `preview_origin`.
    #[must_use]
    pub fn new(
        editor_origin: impl Into<String>,
        preview_origin: impl Into<String>,
        post_id: impl Into<String>,
    ) -> Self {
        Self {
            editor_origin: editor_origin.into(),
            preview_origin: preview_origin.into(),
            post_id: post_id.into(),
            shadow_mode: false,
            highlight: default_highlight(),
            utility_css: false,
            compile_debounce_ms: default_compile_debounce_ms(),
            identity: IdentityScheme::default(),
            media: MediaEnvironment::default(),
        }
    }

    /// Set shadow mode.
    #[must_use]
    pub const fn with_shadow_mode(mut self, shadow_mode: bool) -> Self {
        self.shadow_mode = shadow_mode;
        self
    }

    /// Set hover highlighting.
    #[must_use]
    pub const fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }

    /// Set utility-CSS mode.
    #[must_use]
    pub const fn with_utility_css(mut self, utility_css: bool) -> Self {
        self.utility_css = utility_css;
        self
    }

    /// Set the compile quiet period.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_compile_debounce(mut self, interval: Duration) -> Self {
        self.compile_debounce_ms = interval.as_millis() as u64;
        self
    }

    /// Set the identity scheme.
    #[must_use]
    pub fn with_identity(mut self, identity: IdentityScheme) -> Self {
        self.identity = identity;
        self
    }

    /// Set the media environment.
    #[must_use]
    pub fn with_media(mut self, media: MediaEnvironment) -> Self {
        self.media = media;
        self
    }

    /// The compile quiet period.
    #[must_use]
    pub const fn compile_debounce(&self) -> Duration {
        Duration::from_millis(self.compile_debounce_ms)
    }

    /// The settings sent in the `INIT` handshake.
    #[must_use]
    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            identity_attribute: self.identity.attribute.clone(),
            shadow_mode: self.shadow_mode,
            highlight: self.highlight,
        }
    }
}
