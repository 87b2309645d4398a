//! Tests for the in-memory frame channel.

use vellum_common::channel::{ANY_ORIGIN, FrameEndpoint, FramePort, frame_pair};
use vellum_common::protocol::PreviewMessage;

const EDITOR: &str = "https://editor.test";
const PREVIEW: &str = "https://preview.test";

fn pair() -> (FrameEndpoint, FrameEndpoint) {
    frame_pair(EDITOR, PREVIEW)
}

#[test]
fn test_messages_arrive_in_send_order_with_sender_origin() {
    let (mut editor, preview) = pair();
    editor.post(PreviewMessage::SetHighlight { highlight: true });
    editor.post(PreviewMessage::DisableJs);

    let received = preview.drain();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].origin, EDITOR);
    assert_eq!(
        received[0].message,
        PreviewMessage::SetHighlight { highlight: true }
    );
    assert_eq!(received[1].message, PreviewMessage::DisableJs);
    assert!(preview.drain().is_empty());
}

#[test]
fn test_post_to_other_target_origin_is_not_delivered() {
    let (editor, preview) = pair();
    editor.post_to(&PreviewMessage::DisableJs, "https://elsewhere.test");
    assert!(preview.drain().is_empty());
}

#[test]
fn test_wildcard_target_origin_is_delivered() {
    let (editor, preview) = pair();
    editor.post_to(&PreviewMessage::DisableJs, ANY_ORIGIN);
    assert_eq!(preview.drain().len(), 1);
}

#[test]
fn test_malformed_payload_is_dropped() {
    let (mut editor, preview) = pair();
    editor.post_raw("{not json".to_string(), PREVIEW);
    editor.post_raw(r#"{"type":"SELECT","token":"v1"}"#.to_string(), PREVIEW);
    editor.post(PreviewMessage::DisableJs);

    let received = preview.drain();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message, PreviewMessage::DisableJs);
}

#[test]
fn test_preview_side_posts_back_to_editor() {
    let (editor, mut preview) = pair();
    preview.post(PreviewMessage::Select {
        token: "v3".to_string(),
    });

    let received = editor.drain();
    assert_eq!(received.len(), 1);
    assert!(received[0].is_from(PREVIEW));
}

#[test]
fn test_post_after_peer_dropped_does_not_panic() {
    let (mut editor, preview) = pair();
    drop(preview);
    editor.post(PreviewMessage::DisableJs);
}

#[test]
fn test_recording_port() {
    let mut sent: Vec<PreviewMessage> = Vec::new();
    sent.post(PreviewMessage::DisableJs);
    assert_eq!(sent, vec![PreviewMessage::DisableJs]);
}
