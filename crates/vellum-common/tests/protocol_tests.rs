//! Tests for the preview protocol wire format.

use vellum_common::protocol::{
    Direction, MessageKind, PreviewMessage, PreviewSettings, ProtocolError,
};

// ========== wire format ==========

#[test]
fn test_render_uses_type_tag_and_camel_case_fields() {
    let message = PreviewMessage::Render {
        canonical_html: "<p data-vellum-id=\"v1\">hi</p>".to_string(),
        css_text: "p{color:red}".to_string(),
        shadow_mode: true,
        highlight: false,
    };
    let wire = message.to_wire().unwrap();
    let value: serde_json::Value = serde_json::from_str(&wire).unwrap();

    assert_eq!(value["type"], "RENDER");
    assert_eq!(value["canonicalHtml"], "<p data-vellum-id=\"v1\">hi</p>");
    assert_eq!(value["cssText"], "p{color:red}");
    assert_eq!(value["shadowMode"], true);
    assert_eq!(value["highlight"], false);
}

#[test]
fn test_multi_word_tags_are_screaming_snake_case() {
    let cases = [
        (
            PreviewMessage::SetCss {
                css_text: String::new(),
            },
            "SET_CSS",
        ),
        (PreviewMessage::SetHighlight { highlight: true }, "SET_HIGHLIGHT"),
        (
            PreviewMessage::RunJs {
                script_text: String::new(),
            },
            "RUN_JS",
        ),
        (PreviewMessage::DisableJs, "DISABLE_JS"),
        (PreviewMessage::ExternalScripts { urls: vec![] }, "EXTERNAL_SCRIPTS"),
    ];
    for (message, tag) in cases {
        let value: serde_json::Value = serde_json::from_str(&message.to_wire().unwrap()).unwrap();
        assert_eq!(value["type"], tag);
        assert_eq!(message.kind().to_string(), tag);
    }
}

#[test]
fn test_init_carries_settings() {
    let wire = r#"{"type":"INIT","sessionId":"42:1","settings":{"identityAttribute":"data-x","shadowMode":true,"highlight":false}}"#;
    let message = PreviewMessage::from_wire(wire).unwrap();
    assert_eq!(
        message,
        PreviewMessage::Init {
            session_id: "42:1".to_string(),
            settings: PreviewSettings {
                identity_attribute: "data-x".to_string(),
                shadow_mode: true,
                highlight: false,
            },
        }
    );
}

#[test]
fn test_decode_select() {
    let message = PreviewMessage::from_wire(r#"{"type":"SELECT","token":"v7"}"#).unwrap();
    assert_eq!(
        message,
        PreviewMessage::Select {
            token: "v7".to_string()
        }
    );
    assert_eq!(message.direction(), Direction::PreviewToParent);
}

#[test]
fn test_default_settings() {
    let settings = PreviewSettings::default();
    assert_eq!(settings.identity_attribute, "data-vellum-id");
    assert!(!settings.shadow_mode);
    assert!(settings.highlight);
}

// ========== rejection ==========

#[test]
fn test_unknown_type_is_malformed() {
    let err = PreviewMessage::from_wire(r#"{"type":"EXPLODE"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[test]
fn test_missing_payload_is_malformed() {
    let err = PreviewMessage::from_wire(r#"{"type":"SELECT"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[test]
fn test_not_json_is_malformed() {
    assert!(PreviewMessage::from_wire("hello").is_err());
}

#[test]
fn test_wrong_direction_is_rejected() {
    let wire = PreviewMessage::DisableJs.to_wire().unwrap();
    let err = PreviewMessage::from_wire_for(&wire, Direction::PreviewToParent).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::WrongDirection {
            kind: MessageKind::DisableJs,
            expected: Direction::PreviewToParent,
        }
    ));
    assert!(PreviewMessage::from_wire_for(&wire, Direction::ParentToPreview).is_ok());
}
