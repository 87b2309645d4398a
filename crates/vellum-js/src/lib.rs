//! JavaScript engine integration for the Vellum preview surface.
//!
//! Uses [Boa](https://boajs.dev/) as the JavaScript engine.
//!
//! # Example
//!
//! ```ignore
//! use vellum_js::JsRuntime;
//!
//! let mut runtime = JsRuntime::new()?;
//! runtime.execute("console.log('Hello from the preview!');")?;
//! ```
//!
//! # Implemented
//!
//! - Script execution via [`JsRuntime::execute()`]
//! - `console.log()`, `info()`, `debug()`, `warn()`, `error()`, routed to the
//!   `log` facade under the `vellum::js` target
//! - `window` (the global object) and `document` as event targets with
//!   `addEventListener()`, `removeEventListener()` and `dispatchEvent()`
//! - A ready-event shim for scripts injected into an already-loaded page
//!
//! # Not Implemented
//!
//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//! - Element lookup, creation and the rest of the DOM API
//!
//! [§ 8.6 Timers](https://html.spec.whatwg.org/multipage/timers-and-user-prompts.html#timers)
//! - `setTimeout()` / `setInterval()`

mod globals;

use boa_engine::{Context, JsValue, Source};
use strum_macros::Display;
use thiserror::Error;

/// Events a script written for a cold page load waits for.
pub const READY_EVENTS: [&str; 2] = ["DOMContentLoaded", "load"];

/// Errors produced while running scripts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The runtime's globals could not be installed.
    #[error("script runtime setup failed: {0}")]
    Setup(String),
    /// The script failed to parse or threw an uncaught exception.
    #[error("uncaught script error: {0}")]
    Uncaught(String),
}

/// The two event targets scripts can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EventTargetName {
    /// `window`, which is also the global object.
    Window,
    /// `document`
    Document,
}

/// JavaScript runtime for one preview document.
///
/// [§ 8.1.6 JavaScript execution context](https://html.spec.whatwg.org/multipage/webappapis.html)
///
/// Each preview document has its own global object. Scripts run in that
/// realm one after another, so listeners and globals a script leaves behind
/// stay visible to later scripts until [`JsRuntime::reset`].
pub struct JsRuntime {
    /// The Boa JavaScript context.
    context: Context,
}

impl JsRuntime {
    /// Create a new JavaScript runtime with global objects registered.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Setup`] if a global cannot be installed.
    pub fn new() -> Result<Self, ScriptError> {
        let mut context = Context::default();
        globals::register_globals(&mut context)
            .map_err(|err| ScriptError::Setup(err.to_string()))?;
        Ok(Self { context })
    }

    /// Replace the realm with a fresh one. Everything earlier scripts
    /// defined, including event listeners, is gone afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Setup`] if a global cannot be installed.
    pub fn reset(&mut self) -> Result<(), ScriptError> {
        *self = Self::new()?;
        Ok(())
    }

    /// Execute JavaScript source code.
    ///
    /// [§ 4.12.1.1 Processing model](https://html.spec.whatwg.org/multipage/scripting.html#script-processing-model)
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Uncaught`] if the code contains syntax errors or
    /// throws an uncaught exception.
    pub fn execute(&mut self, source: &str) -> Result<JsValue, ScriptError> {
        self.context
            .eval(Source::from_bytes(source))
            .map_err(|err| ScriptError::Uncaught(err.to_string()))
    }

    /// Execute `source` as a script injected into a page that has already
    /// finished loading.
    ///
    /// While the script runs, registering a listener for one of the
    /// [`READY_EVENTS`] on `window` or `document` calls the listener at once
    /// instead of waiting for an event that already fired. Listeners the
    /// script registers later, from callbacks, are not affected.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Uncaught`] if the script fails.
    pub fn execute_injected(&mut self, source: &str) -> Result<JsValue, ScriptError> {
        self.set_ready_shim(true)?;
        let result = self.execute(source);
        self.set_ready_shim(false)?;
        result
    }

    fn set_ready_shim(&mut self, enabled: bool) -> Result<(), ScriptError> {
        let _ = self
            .context
            .eval(Source::from_bytes(&globals::ready_shim_toggle(enabled)))
            .map_err(|err| ScriptError::Setup(err.to_string()))?;
        Ok(())
    }

    /// Fire an event named `event_type` at `target`, calling its listeners
    /// in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Uncaught`] if a listener throws.
    pub fn dispatch_event(
        &mut self,
        target: EventTargetName,
        event_type: &str,
    ) -> Result<(), ScriptError> {
        let event_type =
            serde_json::to_string(event_type).map_err(|err| ScriptError::Setup(err.to_string()))?;
        let _ = self.execute(&format!(
            "{target}.dispatchEvent({{ type: {event_type}, target: {target} }});"
        ))?;
        Ok(())
    }

    /// Evaluate `source` and convert its completion value to a string, the
    /// way `String(value)` would.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Uncaught`] if evaluation or conversion throws.
    pub fn evaluate_to_string(&mut self, source: &str) -> Result<String, ScriptError> {
        let value = self.execute(source)?;
        value
            .to_string(&mut self.context)
            .map(|s| s.to_std_string_escaped())
            .map_err(|err| ScriptError::Uncaught(err.to_string()))
    }
}
