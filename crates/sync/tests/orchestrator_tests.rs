//! End-to-end runs against a fake Hightouch API served by wiremock.

use std::sync::Arc;
use std::time::Duration;

use hightouch_sync::metrics::{
    COMPLETION_RATIO, ROWS_FAILED_CHANGED, ROWS_SUCCESSFULLY_ADDED, ROWS_SUCCESSFULLY_CHANGED,
};
use hightouch_sync::{
    ClientOptions, HightouchClient, HightouchError, InMemoryMetrics, SyncRunConfig, SyncRunner,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SYNC_ID: i64 = 1127166;
const TOKEN: &str = "test-token";

fn sync_body() -> serde_json::Value {
    json!({
        "id": SYNC_ID,
        "slug": "orders-to-salesforce",
        "workspaceId": 77,
        "createdAt": "2024-01-10T08:00:00Z",
        "updatedAt": "2024-02-10T08:00:00Z",
        "destinationId": 5,
        "modelId": 9,
        "configuration": { "mode": "upsert" },
        "schedule": null,
        "status": "success",
        "disabled": false,
        "lastRunAt": "2024-02-29T23:00:00Z",
        "referencedColumns": ["id", "email"],
        "primaryKey": "id"
    })
}

fn run_body(status: &str, added: i64) -> serde_json::Value {
    json!({
        "id": 42,
        "status": status,
        "createdAt": "2024-03-01T10:00:00Z",
        "startedAt": "2024-03-01T10:00:01Z",
        "finishedAt": "2024-03-01T10:00:12Z",
        "completionRatio": 100,
        "error": null,
        "querySize": 5,
        "plannedRows": { "addedCount": added, "removedCount": 0, "changedCount": 0 },
        "successfulRows": { "addedCount": added, "removedCount": 0, "changedCount": 0 },
        "failedRows": { "addedCount": 0, "removedCount": 0, "changedCount": 0 }
    })
}

fn runs_page(runs: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "data": runs, "hasMore": false })
}

async fn mount_sync_and_trigger(server: &MockServer, full_resync: bool) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}", SYNC_ID)))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_body()))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/syncs/{}/trigger", SYNC_ID)))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({ "fullResync": full_resync })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(server)
        .await;
}

fn runner_for(server: &MockServer) -> (SyncRunner, Arc<InMemoryMetrics>) {
    let options = ClientOptions::default().with_base_url(server.uri());
    let client = HightouchClient::new(TOKEN, &options).unwrap();
    let metrics = Arc::new(InMemoryMetrics::new());
    (SyncRunner::new(Arc::new(client), metrics.clone()), metrics)
}

fn quick_config() -> SyncRunConfig {
    SyncRunConfig::new(SYNC_ID)
        .with_poll_interval(Duration::from_millis(10))
        .with_max_duration(Duration::from_secs(10))
}

#[tokio::test]
async fn run_succeeds_after_run_becomes_visible() {
    let server = MockServer::start().await;
    mount_sync_and_trigger(&server, false).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .and(query_param("runId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(runs_page(vec![])))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .and(query_param("runId", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(runs_page(vec![run_body("success", 5)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (runner, metrics) = runner_for(&server);
    let output = runner
        .run(&quick_config(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.run_id, 42);
    assert_eq!(metrics.get(ROWS_SUCCESSFULLY_ADDED), Some(5.0));
    assert_eq!(metrics.get(ROWS_SUCCESSFULLY_CHANGED), Some(0.0));
    assert_eq!(metrics.get(ROWS_FAILED_CHANGED), Some(0.0));
    assert_eq!(metrics.get(COMPLETION_RATIO), Some(100.0));
}

#[tokio::test]
async fn run_keeps_polling_while_status_is_null() {
    let server = MockServer::start().await;
    mount_sync_and_trigger(&server, false).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .and(query_param("runId", "42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(runs_page(vec![json!({ "id": 42, "status": null })])),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .and(query_param("runId", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(runs_page(vec![run_body("success", 4)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (runner, metrics) = runner_for(&server);
    let output = runner
        .run(&quick_config(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.run_id, 42);
    assert_eq!(metrics.get(ROWS_SUCCESSFULLY_ADDED), Some(4.0));
}

#[tokio::test]
async fn run_fails_when_status_is_failed() {
    let server = MockServer::start().await;
    mount_sync_and_trigger(&server, false).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(runs_page(vec![run_body("failed", 0)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (runner, metrics) = runner_for(&server);
    let err = runner
        .run(&quick_config(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HightouchError::SyncRunFailed { run_id: 42, .. }));
    let message = err.to_string();
    assert!(message.contains("failed"));
    assert!(message.contains("42"));
    assert!(message.contains("00:00:12.000"));
    assert!(metrics.entries().is_empty());
}

#[tokio::test]
async fn run_without_wait_returns_immediately() {
    let server = MockServer::start().await;
    mount_sync_and_trigger(&server, true).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(runs_page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let (runner, _) = runner_for(&server);
    let output = runner
        .run(
            &quick_config().with_wait(false).with_full_resync(true),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(output.run_id, 42);
}

#[tokio::test]
async fn run_times_out_when_never_terminal() {
    let server = MockServer::start().await;
    mount_sync_and_trigger(&server, false).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(runs_page(vec![run_body("processing", 0)])),
        )
        .mount(&server)
        .await;

    let (runner, _) = runner_for(&server);
    let config = quick_config()
        .with_poll_interval(Duration::from_millis(20))
        .with_max_duration(Duration::from_millis(200));
    let err = runner
        .run(&config, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, HightouchError::PollTimeout { run_id: 42, .. }));
    assert_eq!(err.last_seen().unwrap().status, "processing");
}

#[tokio::test]
async fn trigger_unauthorized_fails_before_polling() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}", SYNC_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/api/v1/syncs/{}/trigger", SYNC_ID)))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message":"Unauthorized"}"#))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/syncs/{}/runs", SYNC_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(runs_page(vec![])))
        .expect(0)
        .mount(&server)
        .await;

    let (runner, _) = runner_for(&server);
    let err = runner
        .run(&quick_config(), &CancellationToken::new())
        .await
        .unwrap_err();

    match &err {
        HightouchError::RemoteCallFailed { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("Unauthorized"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("'401'"));
}

#[tokio::test]
async fn unknown_sync_fails_before_trigger() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/syncs/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Sync not found"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/syncs/999/trigger"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let (runner, _) = runner_for(&server);
    let err = runner
        .run(&SyncRunConfig::new(999), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("Sync not found"));
}
