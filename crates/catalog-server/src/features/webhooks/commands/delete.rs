//! Delete webhook command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Command to delete a registered webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWebhookCommand {
    pub id: Uuid,
}

/// Response from deleting a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWebhookResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Errors that can occur when deleting a webhook
#[derive(Debug, thiserror::Error)]
pub enum DeleteWebhookError {
    #[error("Webhook {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteWebhookResponse, DeleteWebhookError>> for DeleteWebhookCommand {}

impl crate::cqrs::Command for DeleteWebhookCommand {}

#[tracing::instrument(skip(pool), fields(webhook_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteWebhookCommand,
) -> Result<DeleteWebhookResponse, DeleteWebhookError> {
    let deleted: Option<Uuid> =
        sqlx::query_scalar("DELETE FROM webhooks WHERE id = $1 RETURNING id")
            .bind(command.id)
            .fetch_optional(&pool)
            .await?;

    let id = deleted.ok_or(DeleteWebhookError::NotFound(command.id))?;

    tracing::info!("webhook deleted");

    Ok(DeleteWebhookResponse { id, deleted: true })
}
