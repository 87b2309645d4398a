//! Common utilities for the Vellum live editor.
//!
//! This crate provides shared infrastructure used by both sides of the
//! preview boundary:
//! - **Warning System** - deduplicated warnings routed through the `log` facade
//! - **Protocol** - the cross-frame message union and its JSON wire format
//! - **Channel** - an in-memory, origin-restricted frame channel
//! - **Net** - fetching external script resources (`http(s)` and `data:` URLs)

pub mod channel;
pub mod net;
pub mod protocol;
pub mod warning;
