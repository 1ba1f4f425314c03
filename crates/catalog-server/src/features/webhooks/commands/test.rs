//! Test webhook command
//!
//! Performs one delivery attempt against a registered webhook and reports
//! the outcome, including status code and elapsed time. This is the
//! read-path for observing delivery health; import notifications themselves
//! never surface failures to callers.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::WebhookState;
use crate::import::notify::{DeliveryResult, WebhookRow};

/// Command to test-deliver to a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestWebhookCommand {
    pub id: Uuid,
}

/// Errors that can occur when testing a webhook
#[derive(Debug, thiserror::Error)]
pub enum TestWebhookError {
    #[error("Webhook {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeliveryResult, TestWebhookError>> for TestWebhookCommand {}

impl crate::cqrs::Command for TestWebhookCommand {}

#[tracing::instrument(skip(state), fields(webhook_id = %command.id))]
pub async fn handle(
    state: WebhookState,
    command: TestWebhookCommand,
) -> Result<DeliveryResult, TestWebhookError> {
    let hook = sqlx::query_as::<_, WebhookRow>(
        r#"
        SELECT id, url, event_types
        FROM webhooks
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(TestWebhookError::NotFound(command.id))?;

    let result = state.dispatcher.deliver_test(&hook).await;

    tracing::info!(
        success = result.success,
        status = ?result.status_code,
        elapsed_ms = result.response_time_ms,
        "webhook test delivery finished"
    );

    Ok(result)
}
