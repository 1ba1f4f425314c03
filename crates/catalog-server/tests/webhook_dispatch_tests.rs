//! Webhook delivery tests
//!
//! Exercise the dispatcher against mock HTTP listeners: event filtering,
//! payload contents, per-listener isolation, timeouts, and the end-to-end
//! path from a finished import to a delivered notification.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use catalog_server::config::{ImportConfig, WebhookConfig};
use catalog_server::import::notify::{ImportEvent, WebhookDispatcher, WebhookRow};
use catalog_server::import::pipeline::ImportPipeline;
use catalog_server::import::progress::ImportRegistry;
use catalog_server::import::types::{ImportStatus, ImportTask};

async fn register_webhook(pool: &PgPool, url: &str, events: &[&str], enabled: bool) {
    let events: Vec<String> = events.iter().map(|s| s.to_string()).collect();
    sqlx::query("INSERT INTO webhooks (url, event_types, enabled) VALUES ($1, $2, $3)")
        .bind(url)
        .bind(&events)
        .bind(enabled)
        .execute(pool)
        .await
        .unwrap();
}

fn dispatcher(pool: &PgPool, timeout_secs: u64) -> WebhookDispatcher {
    WebhookDispatcher::new(pool.clone(), &WebhookConfig { timeout_secs })
}

fn finished_task(status: ImportStatus) -> ImportTask {
    let mut task = ImportTask::new(Uuid::new_v4());
    task.status = status;
    task.processed_rows = 10;
    task.created_count = 8;
    task.updated_count = 2;
    task.finished_at = Some(Utc::now());
    task
}

#[sqlx::test(migrations = "../../migrations")]
async fn delivers_payload_to_subscribed_webhook(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    register_webhook(
        &pool,
        &format!("{}/hook", server.uri()),
        &["import.completed"],
        true,
    )
    .await;

    let task = finished_task(ImportStatus::Completed);
    dispatcher(&pool, 5)
        .dispatch(ImportEvent::Completed, &task)
        .await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["event"], "import.completed");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["created_count"], 8);
    assert_eq!(body["updated_count"], 2);
    assert_eq!(body["task_id"], task.id.to_string());
    assert!(body["occurred_at"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn unsubscribed_events_are_not_delivered(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // Registered for failures only; a completed import must not call it.
    register_webhook(
        &pool,
        &format!("{}/hook", server.uri()),
        &["import.failed"],
        true,
    )
    .await;

    let task = finished_task(ImportStatus::Completed);
    dispatcher(&pool, 5)
        .dispatch(ImportEvent::Completed, &task)
        .await;

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn disabled_webhooks_are_skipped(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    register_webhook(
        &pool,
        &format!("{}/hook", server.uri()),
        &["import.completed"],
        false,
    )
    .await;

    let task = finished_task(ImportStatus::Completed);
    dispatcher(&pool, 5)
        .dispatch(ImportEvent::Completed, &task)
        .await;

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn listener_failures_are_isolated(pool: PgPool) {
    let healthy = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&healthy)
        .await;

    // One unreachable listener and one erroring listener must not prevent
    // delivery to the healthy one.
    register_webhook(&pool, "http://127.0.0.1:1/hook", &["import.cancelled"], true).await;

    let erroring = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&erroring)
        .await;
    register_webhook(
        &pool,
        &format!("{}/hook", erroring.uri()),
        &["import.cancelled"],
        true,
    )
    .await;

    register_webhook(
        &pool,
        &format!("{}/hook", healthy.uri()),
        &["import.cancelled"],
        true,
    )
    .await;

    let task = finished_task(ImportStatus::Cancelled);
    dispatcher(&pool, 2)
        .dispatch(ImportEvent::Cancelled, &task)
        .await;

    assert_eq!(healthy.received_requests().await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn slow_listener_times_out(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let hook = WebhookRow {
        id: Uuid::new_v4(),
        url: format!("{}/hook", server.uri()),
        event_types: vec!["import.completed".to_string()],
    };

    let result = dispatcher(&pool, 1)
        .deliver(&hook, &serde_json::json!({"event": "import.completed"}))
        .await;

    assert!(!result.success);
    assert!(result.status_code.is_none());
    assert!(result.error.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn non_2xx_response_is_a_failure(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let hook = WebhookRow {
        id: Uuid::new_v4(),
        url: format!("{}/hook", server.uri()),
        event_types: vec!["import.completed".to_string()],
    };

    let result = dispatcher(&pool, 5)
        .deliver(&hook, &serde_json::json!({"event": "import.completed"}))
        .await;

    assert!(!result.success);
    assert_eq!(result.status_code, Some(404));
}

#[sqlx::test(migrations = "../../migrations")]
async fn completed_import_notifies_webhooks(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    register_webhook(
        &pool,
        &format!("{}/hook", server.uri()),
        &["import.completed"],
        true,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let source = dir.path().join("products.csv");
    std::fs::write(&source, "name,sku\nWidget,W-1\nGadget,G-1\n").unwrap();

    let registry = Arc::new(ImportRegistry::new());
    let pipeline = ImportPipeline::new(
        pool.clone(),
        registry.clone(),
        Arc::new(dispatcher(&pool, 5)),
        &ImportConfig::default(),
    );

    let task = registry.create().await;
    pipeline.run(task.id, source).await;

    // Dispatch is detached from the pipeline; poll until delivery lands.
    let mut delivered = Vec::new();
    for _ in 0..50 {
        delivered = server.received_requests().await.unwrap();
        if !delivered.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(delivered.len(), 1);

    let body: serde_json::Value = serde_json::from_slice(&delivered[0].body).unwrap();
    assert_eq!(body["event"], "import.completed");
    assert_eq!(body["created_count"], 2);
    assert_eq!(body["error_count"], 0);
}
