//! Update webhook command
//!
//! Partial update: only provided fields are changed.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_url, UrlValidationError};

use super::super::types::Webhook;

/// Command to update a registered webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWebhookCommand {
    /// Set from the path parameter, not the request body.
    #[serde(skip)]
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Errors that can occur when updating a webhook
#[derive(Debug, thiserror::Error)]
pub enum UpdateWebhookError {
    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("URL validation failed: {0}")]
    UrlValidation(#[from] UrlValidationError),

    #[error("Event types cannot be empty")]
    NoEventTypes,

    #[error("Webhook {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Webhook, UpdateWebhookError>> for UpdateWebhookCommand {}

impl crate::cqrs::Command for UpdateWebhookCommand {}

impl UpdateWebhookCommand {
    pub fn validate(&self) -> Result<(), UpdateWebhookError> {
        if self.url.is_none() && self.event_types.is_none() && self.enabled.is_none() {
            return Err(UpdateWebhookError::NoFieldsToUpdate);
        }
        if let Some(ref url) = self.url {
            validate_url(url, "webhook")?;
        }
        if matches!(self.event_types.as_deref(), Some([])) {
            return Err(UpdateWebhookError::NoEventTypes);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(webhook_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateWebhookCommand,
) -> Result<Webhook, UpdateWebhookError> {
    command.validate()?;

    let webhook = sqlx::query_as::<_, Webhook>(
        r#"
        UPDATE webhooks
        SET url = COALESCE($2, url),
            event_types = COALESCE($3, event_types),
            enabled = COALESCE($4, enabled)
        WHERE id = $1
        RETURNING id, url, event_types, enabled, created_at
        "#,
    )
    .bind(command.id)
    .bind(&command.url)
    .bind(&command.event_types)
    .bind(command.enabled)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateWebhookError::NotFound(command.id))?;

    tracing::info!("webhook updated");

    Ok(webhook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::webhooks::commands::create::{self, CreateWebhookCommand};

    #[test]
    fn test_empty_update_rejected() {
        let cmd = UpdateWebhookCommand {
            id: Uuid::new_v4(),
            url: None,
            event_types: None,
            enabled: None,
        };
        assert!(matches!(
            cmd.validate(),
            Err(UpdateWebhookError::NoFieldsToUpdate)
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_disables_webhook(pool: PgPool) -> sqlx::Result<()> {
        let webhook = create::handle(
            pool.clone(),
            CreateWebhookCommand {
                url: "https://example.com/hook".to_string(),
                event_types: None,
                enabled: true,
            },
        )
        .await
        .unwrap();

        let updated = handle(
            pool,
            UpdateWebhookCommand {
                id: webhook.id,
                url: None,
                event_types: Some(vec!["import.failed".to_string()]),
                enabled: Some(false),
            },
        )
        .await
        .unwrap();

        assert!(!updated.enabled);
        assert_eq!(updated.event_types, vec!["import.failed".to_string()]);
        assert_eq!(updated.url, "https://example.com/hook");
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_webhook(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(
            pool,
            UpdateWebhookCommand {
                id: Uuid::new_v4(),
                url: None,
                event_types: None,
                enabled: Some(false),
            },
        )
        .await;

        assert!(matches!(result, Err(UpdateWebhookError::NotFound(_))));
        Ok(())
    }
}
