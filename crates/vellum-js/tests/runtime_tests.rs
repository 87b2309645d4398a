//! Tests for the preview script runtime.

use vellum_js::{EventTargetName, JsRuntime, ScriptError};

fn runtime() -> JsRuntime {
    JsRuntime::new().expect("runtime should start")
}

fn run(js: &mut JsRuntime, source: &str) {
    let _ = js.execute(source).expect("script runs");
}

// ===== Execution =====

#[test]
fn test_execute_returns_completion_value() {
    let mut js = runtime();
    assert_eq!(js.evaluate_to_string("1 + 2").as_deref(), Ok("3"));
    assert_eq!(js.evaluate_to_string("'a' + 'b'").as_deref(), Ok("ab"));
}

#[test]
fn test_globals_persist_between_scripts() {
    let mut js = runtime();
    run(&mut js, "var counter = 1;");
    run(&mut js, "counter += 1;");
    assert_eq!(js.evaluate_to_string("counter").as_deref(), Ok("2"));
}

#[test]
fn test_syntax_error_is_reported() {
    let mut js = runtime();
    assert!(matches!(
        js.execute("function ("),
        Err(ScriptError::Uncaught(_))
    ));
}

#[test]
fn test_uncaught_exception_is_reported() {
    let mut js = runtime();
    let Err(ScriptError::Uncaught(message)) = js.execute("throw new Error('boom');") else {
        panic!("expected an uncaught error");
    };
    assert!(message.contains("boom"));
}

#[test]
fn test_console_methods_exist() {
    let mut js = runtime();
    run(
        &mut js,
        "console.log('a', 1); console.info('b'); console.debug('c'); console.warn('d'); console.error('e');",
    );
}

#[test]
fn test_reset_discards_realm() {
    let mut js = runtime();
    run(&mut js, "var leftover = 1;");
    js.reset().expect("reset succeeds");
    assert_eq!(
        js.evaluate_to_string("typeof leftover").as_deref(),
        Ok("undefined")
    );
}

// ===== Event targets =====

#[test]
fn test_window_is_the_global_object() {
    let mut js = runtime();
    assert_eq!(
        js.evaluate_to_string("window === globalThis && self === window").as_deref(),
        Ok("true")
    );
    assert_eq!(
        js.evaluate_to_string("document.defaultView === window").as_deref(),
        Ok("true")
    );
}

#[test]
fn test_dispatch_calls_listeners_in_order() {
    let mut js = runtime();
    run(
        &mut js,
        "var seen = [];
         window.addEventListener('ping', function (e) { seen.push('a:' + e.type); });
         window.addEventListener('ping', { handleEvent: function () { seen.push('b'); } });",
    );

    js.dispatch_event(EventTargetName::Window, "ping").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("seen.join(',')").as_deref(), Ok("a:ping,b"));
}

#[test]
fn test_duplicate_and_removed_listeners() {
    let mut js = runtime();
    run(
        &mut js,
        "var hits = 0;
         function onHit() { hits++; }
         document.addEventListener('hit', onHit);
         document.addEventListener('hit', onHit);",
    );
    js.dispatch_event(EventTargetName::Document, "hit").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("hits").as_deref(), Ok("1"));

    run(&mut js, "document.removeEventListener('hit', onHit);");
    js.dispatch_event(EventTargetName::Document, "hit").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("hits").as_deref(), Ok("1"));
}

#[test]
fn test_listener_exception_propagates_from_dispatch() {
    let mut js = runtime();
    run(&mut js, "window.addEventListener('bad', function () { throw 'nope'; });");
    assert!(js.dispatch_event(EventTargetName::Window, "bad").is_err());
}

// ===== Ready shim =====

const READY_SCRIPT: &str = "var fired = 0;
    document.addEventListener('DOMContentLoaded', function () { fired += 1; });
    window.addEventListener('load', function () { fired += 10; });
    window.addEventListener('click', function () { fired += 100; });";

#[test]
fn test_injected_script_ready_handlers_fire_immediately() {
    let mut js = runtime();
    let _ = js.execute_injected(READY_SCRIPT).expect("script runs");
    assert_eq!(js.evaluate_to_string("fired").as_deref(), Ok("11"));

    // Ready handlers were called, not registered.
    js.dispatch_event(EventTargetName::Window, "load").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("fired").as_deref(), Ok("11"));
    js.dispatch_event(EventTargetName::Window, "click").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("fired").as_deref(), Ok("111"));
}

#[test]
fn test_plain_execution_waits_for_ready_events() {
    let mut js = runtime();
    run(&mut js, READY_SCRIPT);
    assert_eq!(js.evaluate_to_string("fired").as_deref(), Ok("0"));

    js.dispatch_event(EventTargetName::Document, "DOMContentLoaded")
        .expect("dispatch succeeds");
    js.dispatch_event(EventTargetName::Window, "load").expect("dispatch succeeds");
    assert_eq!(js.evaluate_to_string("fired").as_deref(), Ok("11"));
}

#[test]
fn test_throwing_ready_handler_does_not_abort_injected_script() {
    let mut js = runtime();
    let _ = js
        .execute_injected(
            "window.addEventListener('load', function () { throw new Error('bad handler'); });
             var after = 1;",
        )
        .expect("script runs past the failing handler");
    assert_eq!(js.evaluate_to_string("after").as_deref(), Ok("1"));
}

#[test]
fn test_shim_is_off_after_failed_injection() {
    let mut js = runtime();
    assert!(js.execute_injected("throw 1;").is_err());

    run(&mut js, "var late = 0; window.addEventListener('load', function () { late = 1; });");
    assert_eq!(js.evaluate_to_string("late").as_deref(), Ok("0"));
}

#[test]
fn test_shim_flag_is_not_enumerable() {
    let mut js = runtime();
    assert_eq!(
        js.evaluate_to_string("Object.keys(globalThis).indexOf('__vellumReadyShim')")
            .as_deref(),
        Ok("-1")
    );
}
