//! Tests for resource loading that do not touch the network.

use vellum_common::net::{DataUrl, FetchError, load_script};
use vellum_common::warning::{clear_warnings, warn_once, was_warned};

#[test]
fn test_base64_data_url() {
    let script = load_script("data:text/javascript;base64,Y29uc29sZS5sb2coMSk=").unwrap();
    assert_eq!(script, "console.log(1)");
}

#[test]
fn test_percent_encoded_data_url() {
    let script = load_script("data:text/javascript,var%20x%20%3D%201%3B").unwrap();
    assert_eq!(script, "var x = 1;");
}

#[test]
fn test_data_url_keeps_malformed_escapes() {
    let url = DataUrl::parse("data:,100%zz%").unwrap();
    assert_eq!(url.decode().unwrap(), b"100%zz%");
}

#[test]
fn test_data_url_without_comma() {
    assert!(matches!(
        DataUrl::parse("data:text/plain"),
        Err(FetchError::DataUrlMissingComma)
    ));
}

#[test]
fn test_bad_base64_payload() {
    assert!(matches!(
        load_script("data:;base64,!!!"),
        Err(FetchError::DataUrlBase64(_))
    ));
}

#[test]
fn test_unsupported_scheme() {
    assert!(matches!(
        load_script("ftp://example.com/a.js"),
        Err(FetchError::UnsupportedScheme(_))
    ));
}

#[test]
fn test_warn_once_records_message() {
    clear_warnings();
    warn_once("Test", "unsupported thing");
    assert!(was_warned("Test", "unsupported thing"));
    assert!(!was_warned("Test", "other thing"));
}
