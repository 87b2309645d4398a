//! Cross-frame preview protocol.
//!
//! The editor (parent) and the sandboxed preview surface exchange a small
//! discriminated union of messages. Each message is transient: it carries no
//! identity beyond its `type` tag and payload.
//!
//! | type               | direction        | payload                                  |
//! |--------------------|------------------|------------------------------------------|
//! | `INIT`             | parent → preview | session id, [`PreviewSettings`]           |
//! | `READY`            | preview → parent | session id                               |
//! | `RENDER`           | parent → preview | canonical HTML, CSS, shadow / highlight  |
//! | `SET_CSS`          | parent → preview | CSS text                                 |
//! | `SET_HIGHLIGHT`    | parent → preview | highlight flag                           |
//! | `RUN_JS`           | parent → preview | script text                              |
//! | `DISABLE_JS`       | parent → preview | none                                     |
//! | `EXTERNAL_SCRIPTS` | parent → preview | ordered URL list                         |
//! | `SELECT`           | preview → parent | identity token                           |
//!
//! On the wire a message is a JSON object whose `type` field carries the tag
//! and whose payload fields are camelCase:
//!
//! ```text
//! {"type":"RENDER","canonicalHtml":"<p data-vellum-id=\"v1\">hi</p>","cssText":"","shadowMode":false,"highlight":true}
//! ```

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use thiserror::Error;

/// Default name of the reserved identity attribute.
pub const DEFAULT_IDENTITY_ATTRIBUTE: &str = "data-vellum-id";

/// Errors produced while encoding or decoding protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The payload was not a well-formed message object.
    #[error("malformed preview message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A well-formed message arrived on the side that only ever sends it.
    #[error("{kind} is not expected in the {expected} direction")]
    WrongDirection {
        /// The tag of the offending message.
        kind: MessageKind,
        /// The direction the receiver accepts.
        expected: Direction,
    },
}

/// Which way a message travels across the frame boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    /// Sent by the editor, consumed by the preview surface.
    #[strum(serialize = "parent to preview")]
    ParentToPreview,
    /// Sent by the preview surface, consumed by the editor.
    #[strum(serialize = "preview to parent")]
    PreviewToParent,
}

/// The `type` tag of a [`PreviewMessage`], used for logging and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// `INIT`
    Init,
    /// `READY`
    Ready,
    /// `RENDER`
    Render,
    /// `SET_CSS`
    SetCss,
    /// `SET_HIGHLIGHT`
    SetHighlight,
    /// `RUN_JS`
    RunJs,
    /// `DISABLE_JS`
    DisableJs,
    /// `EXTERNAL_SCRIPTS`
    ExternalScripts,
    /// `SELECT`
    Select,
}

/// Settings handed to the preview surface in the `INIT` handshake.
///
/// The preview surface reads everything it needs from here rather than from
/// ambient globals on its window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSettings {
    /// Name of the attribute carrying each element's identity token.
    pub identity_attribute: String,
    /// Attach preview content under a shadow root instead of the document.
    pub shadow_mode: bool,
    /// Outline elements under the pointer.
    pub highlight: bool,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            identity_attribute: DEFAULT_IDENTITY_ATTRIBUTE.to_string(),
            shadow_mode: false,
            highlight: true,
        }
    }
}

/// A message exchanged between the editor and the preview surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum PreviewMessage {
    /// Start of the readiness handshake.
    Init {
        /// Session identifier the preview must echo back in `READY`.
        session_id: String,
        /// Initial preview settings.
        settings: PreviewSettings,
    },
    /// Handshake acknowledgment.
    Ready {
        /// The session identifier received in `INIT`.
        session_id: String,
    },
    /// Full repaint of the preview content.
    Render {
        /// Canonical markup with identity attributes on every element.
        canonical_html: String,
        /// Current stylesheet text.
        css_text: String,
        /// Attach under a shadow root.
        shadow_mode: bool,
        /// Outline elements under the pointer.
        highlight: bool,
    },
    /// Style-only update.
    SetCss {
        /// Replacement stylesheet text.
        css_text: String,
    },
    /// Toggle hover outlining.
    SetHighlight {
        /// New highlight flag.
        highlight: bool,
    },
    /// (Re)execute the user script.
    RunJs {
        /// Script source text.
        script_text: String,
    },
    /// Remove the injected user script.
    DisableJs,
    /// Load external scripts strictly in order.
    ExternalScripts {
        /// Script URLs in load order.
        urls: Vec<String>,
    },
    /// The user clicked an element in the preview.
    Select {
        /// Identity token of the clicked element.
        token: String,
    },
}

impl PreviewMessage {
    /// The message's `type` tag.
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Init { .. } => MessageKind::Init,
            Self::Ready { .. } => MessageKind::Ready,
            Self::Render { .. } => MessageKind::Render,
            Self::SetCss { .. } => MessageKind::SetCss,
            Self::SetHighlight { .. } => MessageKind::SetHighlight,
            Self::RunJs { .. } => MessageKind::RunJs,
            Self::DisableJs => MessageKind::DisableJs,
            Self::ExternalScripts { .. } => MessageKind::ExternalScripts,
            Self::Select { .. } => MessageKind::Select,
        }
    }

    /// Which way this message travels.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Ready { .. } | Self::Select { .. } => Direction::PreviewToParent,
            _ => Direction::ParentToPreview,
        }
    }

    /// Encode the message in its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if serialization fails.
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a message from its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if `data` is not a message object
    /// with a known `type` tag and the payload that tag requires.
    pub fn from_wire(data: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Decode a message and check that it travels in `expected` direction.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] for undecodable data and
    /// [`ProtocolError::WrongDirection`] for a message the receiver never
    /// accepts.
    pub fn from_wire_for(data: &str, expected: Direction) -> Result<Self, ProtocolError> {
        let message = Self::from_wire(data)?;
        if message.direction() == expected {
            Ok(message)
        } else {
            Err(ProtocolError::WrongDirection {
                kind: message.kind(),
                expected,
            })
        }
    }
}

/// A received message together with the origin of the window that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Origin of the sending window, e.g. `https://example.com`.
    pub origin: String,
    /// The decoded message.
    pub message: PreviewMessage,
}

impl Envelope {
    /// Whether the sender's origin is exactly `trusted`.
    #[must_use]
    pub fn is_from(&self, trusted: &str) -> bool {
        self.origin == trusted
    }
}
