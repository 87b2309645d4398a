//! `window` and `document` as event targets.
//!
//! [§ 2.7 Interface EventTarget](https://dom.spec.whatwg.org/#interface-eventtarget)
//!
//! Listener bookkeeping lives in script so that listeners are ordinary
//! garbage-collected JavaScript values. There is no capture or bubbling:
//! `dispatchEvent()` calls the target's own listeners in registration order.

use boa_engine::{Context, JsResult, Source};

/// Installs `window`, `self` and `document`.
///
/// The ready-event shim is a non-enumerable flag on the global object that
/// the host toggles around injected scripts. A ready listener that throws
/// while the shim is on is reported through `console.error` and the script
/// that registered it carries on.
const BOOTSTRAP: &str = r"
(function (global) {
  var READY = { DOMContentLoaded: true, load: true };
  Object.defineProperty(global, '__vellumReadyShim', {
    value: false, writable: true, enumerable: false, configurable: false
  });

  function invoke(target, listener, event) {
    if (typeof listener === 'function') {
      listener.call(target, event);
    } else {
      listener.handleEvent(event);
    }
  }

  function makeEventTarget(target) {
    var listeners = {};
    target.addEventListener = function (type, listener) {
      var callable = typeof listener === 'function' ||
        (listener !== null && typeof listener === 'object' &&
         typeof listener.handleEvent === 'function');
      if (!callable) {
        return;
      }
      if (global.__vellumReadyShim && READY[type] === true) {
        try {
          invoke(target, listener, { type: type, target: target });
        } catch (error) {
          console.error(error);
        }
        return;
      }
      var list = listeners[type] || (listeners[type] = []);
      if (list.indexOf(listener) === -1) {
        list.push(listener);
      }
    };
    target.removeEventListener = function (type, listener) {
      var list = listeners[type];
      if (!list) {
        return;
      }
      var index = list.indexOf(listener);
      if (index !== -1) {
        list.splice(index, 1);
      }
    };
    target.dispatchEvent = function (event) {
      var list = (listeners[event.type] || []).slice();
      for (var i = 0; i < list.length; i++) {
        invoke(target, list[i], event);
      }
      return true;
    };
  }

  global.window = global;
  global.self = global;
  global.document = { readyState: 'complete', defaultView: global };
  makeEventTarget(global);
  makeEventTarget(global.document);
})(globalThis);
";

/// Register the event target globals on the context.
///
/// [§ 2.7 addEventListener](https://dom.spec.whatwg.org/#dom-eventtarget-addeventlistener)
///
/// "If listener's callback is null, then return." Registering the same
/// listener twice for a type keeps one entry.
pub fn register_event_targets(context: &mut Context) -> JsResult<()> {
    let _ = context.eval(Source::from_bytes(BOOTSTRAP))?;
    Ok(())
}

/// Script that turns the ready-event shim on or off.
#[must_use]
pub fn ready_shim_toggle(enabled: bool) -> String {
    format!("globalThis.__vellumReadyShim = {enabled};")
}
