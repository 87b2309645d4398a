//! Deduplicated warnings for unsupported input.
//!
//! The editor re-parses the same markup and stylesheet on every keystroke, so
//! a warning about an unsupported construct would otherwise repeat for each
//! pass. Used by the HTML, CSS and preview components.

use std::collections::HashSet;
use std::sync::Mutex;

/// Global set of warnings we've already logged (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (logs once per unique message).
///
/// The message goes to `log::warn!` with the component as its target suffix,
/// so `RUST_LOG=vellum::css=off` silences a single component.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported media feature 'scan'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    // A poisoned set only loses deduplication, never the warning itself.
    let should_log = WARNED.lock().map_or(true, |mut guard| {
        guard.get_or_insert_with(HashSet::new).insert(key)
    });

    if should_log {
        log::warn!(target: "vellum", "[{component}] {message}");
    }
}

/// Clear all recorded warnings (call when a new document is loaded).
pub fn clear_warnings() {
    let Ok(mut guard) = WARNED.lock() else {
        return;
    };
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Whether `message` has already been reported for `component`.
#[must_use]
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .is_ok_and(|guard| guard.as_ref().is_some_and(|set| set.contains(&key)))
}
