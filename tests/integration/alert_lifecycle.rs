//! Alert notification tests: broadcast fan-out and webhook delivery

use std::sync::Arc;

use assert_matches::assert_matches;
use host_monitoring::alerts::{
    AlertEvent, AlertKind, AlertLevel, AlertStore, BroadcastSink, WebhookSink,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_broadcast_sink_delivers_lifecycle_events() {
    let sink = Arc::new(BroadcastSink::new(16));
    let mut events = sink.subscribe();

    let store = AlertStore::new(100, vec![sink]);

    store
        .fire(
            "HIGH_CPU_USAGE",
            "cpu high",
            AlertLevel::Warning,
            AlertKind::HighCpuUsage,
            "SYSTEM",
        )
        .await;
    store.resolve("HIGH_CPU_USAGE").await;

    let created = events.recv().await.unwrap();
    assert_matches!(&created, AlertEvent::Created(record) if record.active);

    let resolved = events.recv().await.unwrap();
    assert_matches!(&resolved, AlertEvent::Resolved(record) if !record.active);
    assert_eq!(created.record().id, resolved.record().id);
}

#[tokio::test]
async fn test_webhook_sink_posts_created_and_resolved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_partial_json(json!({ "event": "created" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/alerts"))
        .and(body_partial_json(json!({ "event": "resolved" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = AlertStore::new(
        100,
        vec![Arc::new(WebhookSink::new(format!(
            "{}/alerts",
            mock_server.uri()
        )))],
    );

    store
        .fire(
            "RTSP_STREAM_DOWN:front",
            "RTSP stream front is down",
            AlertLevel::Error,
            AlertKind::RtspStreamDown,
            "RTSP",
        )
        .await;

    // Deduped while active: no second "created" request
    store
        .fire(
            "RTSP_STREAM_DOWN:front",
            "RTSP stream front is down",
            AlertLevel::Error,
            AlertKind::RtspStreamDown,
            "RTSP",
        )
        .await;

    store.resolve("RTSP_STREAM_DOWN:front").await;

    // Resolving again is a no-op: no second "resolved" request
    store.resolve("RTSP_STREAM_DOWN:front").await;
}

#[tokio::test]
async fn test_failing_webhook_does_not_poison_the_store() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let store = AlertStore::new(
        100,
        vec![Arc::new(WebhookSink::new(mock_server.uri()))],
    );

    // Delivery fails but the record is still created and resolvable
    let record = store
        .fire(
            "DISK_SPACE_LOW:_data",
            "disk full",
            AlertLevel::Warning,
            AlertKind::DiskSpaceLow,
            "STORAGE",
        )
        .await;

    assert_eq!(store.list_active().await.len(), 1);
    assert!(store.resolve("DISK_SPACE_LOW:_data").await.is_some());
    assert!(store.get(&record.id).await.is_some());
}
