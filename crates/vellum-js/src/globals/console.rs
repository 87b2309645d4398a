//! Console API implementation.
//!
//! [Console Standard](https://console.spec.whatwg.org/)
//!
//! This module implements the `console` global object. Output goes to the
//! `log` facade under the `vellum::js` target, so the host decides where a
//! preview script's console ends up.

use boa_engine::{
    Context, JsResult, JsValue, NativeFunction, js_string, object::ObjectInitializer,
    property::Attribute,
};
use log::Level;

/// Log target for script console output.
const TARGET: &str = "vellum::js";

/// Register the console global object on the context.
///
/// [§ 1.1 Logging](https://console.spec.whatwg.org/#logging)
///
/// Creates a `console` object with the following methods:
/// - `console.log(...args)` and `console.info(...args)` - `info` level
/// - `console.debug(...args)` - `debug` level
/// - `console.warn(...args)` - `warn` level
/// - `console.error(...args)` - `error` level
///
/// # Not Yet Implemented
///
/// [§ 1.2 Counting](https://console.spec.whatwg.org/#counting),
/// [§ 1.3 Grouping](https://console.spec.whatwg.org/#grouping),
/// [§ 1.4 Timing](https://console.spec.whatwg.org/#timing) and
/// [§ 1.5 Table](https://console.spec.whatwg.org/#table).
pub fn register_console(context: &mut Context) -> JsResult<()> {
    let console = ObjectInitializer::new(context)
        .function(NativeFunction::from_copy_closure(console_log), js_string!("log"), 0)
        .function(NativeFunction::from_copy_closure(console_log), js_string!("info"), 0)
        .function(NativeFunction::from_copy_closure(console_debug), js_string!("debug"), 0)
        .function(NativeFunction::from_copy_closure(console_warn), js_string!("warn"), 0)
        .function(NativeFunction::from_copy_closure(console_error), js_string!("error"), 0)
        .build();

    context.register_global_property(js_string!("console"), console, Attribute::all())
}

/// `console.log(...args)`
///
/// [§ 1.1.1 log](https://console.spec.whatwg.org/#log)
///
/// "Perform Logger("log", data)."
fn console_log(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    logger(Level::Info, args, context)
}

/// `console.debug(...args)`
///
/// [§ 1.1.1 debug](https://console.spec.whatwg.org/#debug)
fn console_debug(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    logger(Level::Debug, args, context)
}

/// `console.warn(...args)`
///
/// [§ 1.1.3 warn](https://console.spec.whatwg.org/#warn)
fn console_warn(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    logger(Level::Warn, args, context)
}

/// `console.error(...args)`
///
/// [§ 1.1.2 error](https://console.spec.whatwg.org/#error)
fn console_error(_this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    logger(Level::Error, args, context)
}

/// [§ 2.1 Logger](https://console.spec.whatwg.org/#logger)
fn logger(level: Level, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let output = format_console_args(args, context)?;
    log::log!(target: TARGET, level, "{output}");
    Ok(JsValue::undefined())
}

/// Format console arguments for output.
///
/// [§ 2.2 Formatter](https://console.spec.whatwg.org/#formatter)
///
/// Converts each argument to a string and joins them with spaces.
fn format_console_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let strings: Result<Vec<String>, _> = args
        .iter()
        .map(|arg| arg.to_string(context).map(|s| s.to_std_string_escaped()))
        .collect();

    Ok(strings?.join(" "))
}
