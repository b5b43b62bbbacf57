//! Integration tests for the alert handler adapter.

#[path = "../helpers/mod.rs"]
mod helpers;

use dingtalk_notifier::core::{AlertEvent, AlertHandler, AlertLevel, KeyValue};
use helpers::{service_for, RecordingDiagnostic};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_handler_sends_event_message() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "msgtype": "text",
            "text": { "content": "cpu usage above 90%" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let diag = RecordingDiagnostic::new();
    let service = service_for(&server, "tok", Arc::new(diag.clone()));
    let handler = service.handler(&[KeyValue::new("alert_id", "cpu")]);

    // Act
    let event = AlertEvent::new("cpu", "cpu usage above 90%", AlertLevel::Critical);
    handler.handle(&event).await;

    // Assert
    assert!(diag.reports().is_empty());
}

#[tokio::test]
async fn test_handler_reports_failures_with_context() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errcode":300,"errmsg":"token invalid"}"#),
        )
        .mount(&server)
        .await;
    let diag = RecordingDiagnostic::new();
    let service = service_for(&server, "tok", Arc::new(diag.clone()));
    let handler = service.handler(&[
        KeyValue::new("task", "cpu_alert"),
        KeyValue::new("alert_id", "host-1"),
    ]);

    // Act
    let event = AlertEvent::new("host-1", "cpu usage above 90%", AlertLevel::Warning);
    handler.handle(&event).await;

    // Assert
    let reports = diag.reports();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(
        report.context,
        vec![
            KeyValue::new("task", "cpu_alert"),
            KeyValue::new("alert_id", "host-1"),
        ]
    );
    assert_eq!(report.msg, "failed to send event to DingTalk");
    assert!(report.error.contains("token invalid"), "{}", report.error);
}

#[tokio::test]
async fn test_handlers_keep_their_own_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let diag = RecordingDiagnostic::new();
    let service = service_for(&server, "tok", Arc::new(diag.clone()));

    let first = service.handler(&[KeyValue::new("alert_id", "a")]);
    let second = service.handler(&[KeyValue::new("alert_id", "b")]);
    first
        .handle(&AlertEvent::new("a", "first", AlertLevel::Info))
        .await;
    second
        .handle(&AlertEvent::new("b", "second", AlertLevel::Info))
        .await;

    let contexts: Vec<_> = diag
        .reports()
        .into_iter()
        .map(|r| r.context[0].value.clone())
        .collect();
    assert_eq!(contexts, vec!["a", "b"]);
}
