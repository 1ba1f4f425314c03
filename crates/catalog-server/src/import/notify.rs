//! Webhook notification dispatch
//!
//! Delivers terminal import events to registered listeners. Each delivery is
//! a single attempt with a bounded timeout; there is no automatic retry, and
//! one listener's failure never affects another's delivery or the task's
//! terminal state. Outcomes are logged and surfaced through the webhook test
//! endpoint rather than raised to the uploader.

use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::WebhookConfig;

use super::types::{ImportStatus, ImportTask};

/// Event types emitted when an import reaches a terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportEvent {
    Completed,
    Cancelled,
    Failed,
}

impl ImportEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportEvent::Completed => "import.completed",
            ImportEvent::Cancelled => "import.cancelled",
            ImportEvent::Failed => "import.failed",
        }
    }

    /// The event corresponding to a terminal status, if any.
    pub fn from_status(status: ImportStatus) -> Option<Self> {
        match status {
            ImportStatus::Completed => Some(ImportEvent::Completed),
            ImportStatus::Cancelled => Some(ImportEvent::Cancelled),
            ImportStatus::Failed => Some(ImportEvent::Failed),
            ImportStatus::Pending | ImportStatus::Running => None,
        }
    }
}

impl std::fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A webhook row as read at dispatch time (never cached)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WebhookRow {
    pub id: Uuid,
    pub url: String,
    pub event_types: Vec<String>,
}

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryResult {
    pub webhook_id: Uuid,
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Delivers import events to subscribed webhooks
pub struct WebhookDispatcher {
    db: PgPool,
    http: Client,
    timeout: Duration,
}

impl WebhookDispatcher {
    pub fn new(db: PgPool, config: &WebhookConfig) -> Self {
        Self {
            db,
            http: Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Deliver `event` for a finished task to every subscribed listener.
    ///
    /// Listener failures are logged and swallowed; this never returns an
    /// error to the pipeline.
    pub async fn dispatch(&self, event: ImportEvent, task: &ImportTask) {
        let hooks = match self.subscribed(event).await {
            Ok(hooks) => hooks,
            Err(e) => {
                warn!(event = event.as_str(), error = %e, "failed to load webhooks, skipping dispatch");
                return;
            },
        };

        if hooks.is_empty() {
            debug!(event = event.as_str(), task_id = %task.id, "no webhooks subscribed");
            return;
        }

        let payload = event_payload(event, task);
        let deliveries = hooks.iter().map(|hook| self.deliver(hook, &payload));

        for result in futures::future::join_all(deliveries).await {
            if result.success {
                info!(
                    webhook_id = %result.webhook_id,
                    url = %result.url,
                    status = ?result.status_code,
                    elapsed_ms = result.response_time_ms,
                    event = event.as_str(),
                    "webhook delivered"
                );
            } else {
                warn!(
                    webhook_id = %result.webhook_id,
                    url = %result.url,
                    status = ?result.status_code,
                    elapsed_ms = result.response_time_ms,
                    error = ?result.error,
                    event = event.as_str(),
                    "webhook delivery failed"
                );
            }
        }
    }

    /// One delivery attempt. Any 2xx is success; anything else, including a
    /// timeout, is failure.
    pub async fn deliver(&self, hook: &WebhookRow, payload: &serde_json::Value) -> DeliveryResult {
        let start = Instant::now();
        let outcome = self
            .http
            .post(&hook.url)
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await;
        let response_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) if response.status().is_success() => DeliveryResult {
                webhook_id: hook.id,
                url: hook.url.clone(),
                success: true,
                status_code: Some(response.status().as_u16()),
                response_time_ms,
                error: None,
            },
            Ok(response) => DeliveryResult {
                webhook_id: hook.id,
                url: hook.url.clone(),
                success: false,
                status_code: Some(response.status().as_u16()),
                response_time_ms,
                error: None,
            },
            Err(e) => DeliveryResult {
                webhook_id: hook.id,
                url: hook.url.clone(),
                success: false,
                status_code: None,
                response_time_ms,
                error: Some(e.to_string()),
            },
        }
    }

    /// One-off probe used by the webhook test endpoint.
    pub async fn deliver_test(&self, hook: &WebhookRow) -> DeliveryResult {
        let payload = json!({
            "event": "webhook.test",
            "occurred_at": Utc::now(),
        });
        self.deliver(hook, &payload).await
    }

    async fn subscribed(&self, event: ImportEvent) -> Result<Vec<WebhookRow>, sqlx::Error> {
        sqlx::query_as::<_, WebhookRow>(
            r#"
            SELECT id, url, event_types
            FROM webhooks
            WHERE enabled = TRUE AND $1 = ANY(event_types)
            "#,
        )
        .bind(event.as_str())
        .fetch_all(&self.db)
        .await
    }
}

/// Payload sent to each subscribed webhook
pub fn event_payload(event: ImportEvent, task: &ImportTask) -> serde_json::Value {
    json!({
        "event": event.as_str(),
        "task_id": task.id,
        "status": task.status.as_str(),
        "created_count": task.created_count,
        "updated_count": task.updated_count,
        "error_count": task.error_count,
        "occurred_at": task.finished_at.unwrap_or_else(Utc::now),
    })
}
