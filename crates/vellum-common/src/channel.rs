//! In-memory frame channel.
//!
//! Models `window.postMessage` between the editor window and the preview
//! frame: every post is serialized to the JSON wire format, tagged with the
//! sender's origin, and delivered in send order. A post addressed to a target
//! origin other than the receiver's own is dropped on delivery, the same way
//! a browser discards a `postMessage` whose `targetOrigin` does not match.
//!
//! Filtering by *sender* origin is left to the receiving component, which
//! knows which origin it trusts.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::protocol::{Direction, Envelope, PreviewMessage};

/// Target origin that matches any receiver.
pub const ANY_ORIGIN: &str = "*";

/// Something a component can post protocol messages through.
pub trait FramePort {
    /// Post `message` to the peer window. Never blocks and never fails
    /// visibly; undeliverable messages are dropped.
    fn post(&mut self, message: PreviewMessage);
}

/// Serialized message in flight.
#[derive(Debug)]
struct Packet {
    origin: String,
    target_origin: String,
    data: String,
}

/// One side of a frame channel.
#[derive(Debug)]
pub struct FrameEndpoint {
    /// Origin of the window owning this endpoint.
    origin: String,
    /// Origin every post from this endpoint is addressed to.
    target_origin: String,
    /// Messages this endpoint accepts.
    accepts: Direction,
    outgoing: Sender<Packet>,
    incoming: Receiver<Packet>,
}

/// Create a connected pair of endpoints: `(editor side, preview side)`.
///
/// Each side addresses its posts to the other side's origin.
#[must_use]
pub fn frame_pair(parent_origin: &str, preview_origin: &str) -> (FrameEndpoint, FrameEndpoint) {
    let (to_preview, preview_inbox) = channel();
    let (to_parent, parent_inbox) = channel();

    let parent = FrameEndpoint {
        origin: parent_origin.to_string(),
        target_origin: preview_origin.to_string(),
        accepts: Direction::PreviewToParent,
        outgoing: to_preview,
        incoming: parent_inbox,
    };
    let preview = FrameEndpoint {
        origin: preview_origin.to_string(),
        target_origin: parent_origin.to_string(),
        accepts: Direction::ParentToPreview,
        outgoing: to_parent,
        incoming: preview_inbox,
    };
    (parent, preview)
}

impl FrameEndpoint {
    /// Origin of the window owning this endpoint.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Origin this endpoint's posts are addressed to.
    #[must_use]
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// Post `message` addressed to an explicit `target_origin`.
    pub fn post_to(&self, message: &PreviewMessage, target_origin: &str) {
        let data = match message.to_wire() {
            Ok(data) => data,
            Err(err) => {
                log::warn!("dropping unencodable {} message: {err}", message.kind());
                return;
            }
        };
        self.post_raw(data, target_origin);
    }

    /// Post already-serialized data. Used for relaying and for exercising
    /// the receiver's handling of malformed payloads.
    pub fn post_raw(&self, data: String, target_origin: &str) {
        let packet = Packet {
            origin: self.origin.clone(),
            target_origin: target_origin.to_string(),
            data,
        };
        if self.outgoing.send(packet).is_err() {
            log::debug!("peer window is gone; message from {} dropped", self.origin);
        }
    }

    /// Take every message delivered so far, in send order.
    ///
    /// Posts addressed to another origin and payloads that fail to decode are
    /// dropped here and never reach the caller.
    #[must_use]
    pub fn drain(&self) -> Vec<Envelope> {
        let mut delivered = Vec::new();
        while let Ok(packet) = self.incoming.try_recv() {
            if packet.target_origin != ANY_ORIGIN && packet.target_origin != self.origin {
                log::trace!(
                    "post from {} addressed to {} not delivered to {}",
                    packet.origin,
                    packet.target_origin,
                    self.origin
                );
                continue;
            }

            match PreviewMessage::from_wire_for(&packet.data, self.accepts) {
                Ok(message) => delivered.push(Envelope {
                    origin: packet.origin,
                    message,
                }),
                Err(err) => log::debug!("ignoring post from {}: {err}", packet.origin),
            }
        }
        delivered
    }
}

impl FramePort for FrameEndpoint {
    fn post(&mut self, message: PreviewMessage) {
        self.post_to(&message, &self.target_origin);
    }
}

/// A port that records every posted message, for tests and dry runs.
impl FramePort for Vec<PreviewMessage> {
    fn post(&mut self, message: PreviewMessage) {
        self.push(message);
    }
}
