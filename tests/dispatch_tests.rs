//! Notification dispatcher tests

mod common;

use common::MockTransport;
use notify_button::{Dispatch, DispatchError, Dispatcher, NotificationConfig};
use std::time::Duration;

fn notification() -> NotificationConfig {
    common::test_config().notification
}

fn dispatcher(transport: MockTransport) -> Dispatcher<MockTransport> {
    Dispatcher::new(transport, &notification())
}

#[test]
fn test_delivered_on_200_and_ok() {
    let mut d = dispatcher(MockTransport::new().respond(200, r#"{"ok":true,"result":{"message_id":7}}"#));
    assert!(d.dispatch(None));
}

#[test]
fn test_failed_on_server_error() {
    let mut d = dispatcher(MockTransport::new().respond(500, "{}"));
    assert!(!d.dispatch(None));
}

#[test]
fn test_failed_on_ok_false() {
    let mut d = dispatcher(MockTransport::new().respond(
        200,
        r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
    ));
    assert!(!d.dispatch(None));
}

#[test]
fn test_failed_on_transport_fault() {
    let mut d = dispatcher(MockTransport::new().fail());
    assert!(!d.dispatch(None));
    assert_eq!(d.transport().urls.len(), 1);
}

#[test]
fn test_failed_on_garbage_body() {
    let mut d = dispatcher(MockTransport::new().respond(200, "not json"));
    assert!(!d.dispatch(None));
}

#[test]
fn test_try_send_keeps_reason() {
    let mut d = dispatcher(
        MockTransport::new()
            .respond(403, "")
            .respond(200, r#"{"ok":false}"#)
            .fail(),
    );

    assert_eq!(d.try_send(None), Err(DispatchError::Status(403)));
    assert_eq!(d.try_send(None), Err(DispatchError::Rejected(None)));
    assert_eq!(d.try_send(None), Err(DispatchError::Transport));
}

#[test]
fn test_url_uses_default_message() {
    let mut d = dispatcher(MockTransport::new().respond(200, r#"{"ok":true}"#));
    d.dispatch(None);

    assert_eq!(
        d.transport().urls,
        vec!["https://api.telegram.org/bot123:abc/sendMessage?chat_id=42&text=Ding%20dong"]
    );
}

#[test]
fn test_url_uses_explicit_message() {
    let mut d = dispatcher(MockTransport::new().respond(200, r#"{"ok":true}"#));
    d.dispatch(Some("Back door & garage"));

    assert_eq!(
        d.transport().urls[0],
        "https://api.telegram.org/bot123:abc/sendMessage?chat_id=42&text=Back%20door%20%26%20garage"
    );
}

#[test]
fn test_url_with_custom_base_and_negative_chat() {
    let config = NotificationConfig {
        api_base: "http://127.0.0.1:8081".to_string(),
        bot_token: "t0k".to_string(),
        chat_id: "-100123".to_string(),
        default_message: "x".to_string(),
        http_timeout: Duration::from_secs(5),
    };
    let d = Dispatcher::new(MockTransport::new(), &config);

    assert_eq!(
        d.endpoint_url("hi"),
        "http://127.0.0.1:8081/bott0k/sendMessage?chat_id=-100123&text=hi"
    );
}

#[test]
fn test_error_display() {
    assert_eq!(DispatchError::Status(502).to_string(), "HTTP status 502");
    assert_eq!(
        DispatchError::Rejected(Some("Unauthorized".to_string())).to_string(),
        "rejected: Unauthorized"
    );
}

#[test]
fn test_failed_on_array_body() {
    let mut d = dispatcher(
        MockTransport::new()
            .respond(200, "[true]")
            .respond(200, r#"[true,"x"]"#),
    );

    assert_eq!(d.try_send(None), Err(DispatchError::Malformed));
    assert!(!d.dispatch(None));
}
