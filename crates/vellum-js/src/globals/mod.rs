//! JavaScript global objects.
//!
//! This module registers the built-in globals available to preview scripts.
//!
//! # Implemented
//!
//! - `console` - [Console Standard](https://console.spec.whatwg.org/)
//! - `window` - [§ 7.2 The Window object](https://html.spec.whatwg.org/multipage/window-object.html),
//!   as an event target aliasing the global object
//! - `document` - [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document),
//!   as an event target only

mod console;
mod events;

use boa_engine::{Context, JsResult};

pub use events::ready_shim_toggle;

/// Register all global objects on the context.
///
/// [§ 8.1.6.1 Realms and their counterparts](https://html.spec.whatwg.org/multipage/webappapis.html#realms-settings-objects-global-objects)
///
/// "A global object is a JavaScript object that is the global object for
/// a JavaScript realm."
///
/// This should be called once when creating a new `JsRuntime`.
pub fn register_globals(context: &mut Context) -> JsResult<()> {
    console::register_console(context)?;
    events::register_event_targets(context)
}
