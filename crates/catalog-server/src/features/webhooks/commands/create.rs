//! Create webhook command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::validation::{validate_url, UrlValidationError};

use super::super::types::{default_event_types, Webhook};

/// Command to register a new webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebhookCommand {
    pub url: String,

    /// Defaults to all import events when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Errors that can occur when registering a webhook
#[derive(Debug, thiserror::Error)]
pub enum CreateWebhookError {
    #[error("URL validation failed: {0}")]
    UrlValidation(#[from] UrlValidationError),

    #[error("Event types cannot be empty")]
    NoEventTypes,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Webhook, CreateWebhookError>> for CreateWebhookCommand {}

impl crate::cqrs::Command for CreateWebhookCommand {}

impl CreateWebhookCommand {
    pub fn validate(&self) -> Result<(), CreateWebhookError> {
        validate_url(&self.url, "webhook")?;
        if matches!(self.event_types.as_deref(), Some([])) {
            return Err(CreateWebhookError::NoEventTypes);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(url = %command.url))]
pub async fn handle(
    pool: PgPool,
    command: CreateWebhookCommand,
) -> Result<Webhook, CreateWebhookError> {
    command.validate()?;

    let event_types = command.event_types.unwrap_or_else(default_event_types);

    let webhook = sqlx::query_as::<_, Webhook>(
        r#"
        INSERT INTO webhooks (url, event_types, enabled)
        VALUES ($1, $2, $3)
        RETURNING id, url, event_types, enabled, created_at
        "#,
    )
    .bind(&command.url)
    .bind(&event_types)
    .bind(command.enabled)
    .fetch_one(&pool)
    .await?;

    tracing::info!(webhook_id = %webhook.id, "webhook registered");

    Ok(webhook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation() {
        let cmd = CreateWebhookCommand {
            url: "https://example.com/hook".to_string(),
            event_types: None,
            enabled: true,
        };
        assert!(cmd.validate().is_ok());

        let cmd = CreateWebhookCommand {
            url: "not-a-url".to_string(),
            event_types: None,
            enabled: true,
        };
        assert!(matches!(
            cmd.validate(),
            Err(CreateWebhookError::UrlValidation(_))
        ));

        let cmd = CreateWebhookCommand {
            url: "https://example.com/hook".to_string(),
            event_types: Some(vec![]),
            enabled: true,
        };
        assert!(matches!(
            cmd.validate(),
            Err(CreateWebhookError::NoEventTypes)
        ));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_defaults_event_types(pool: PgPool) -> sqlx::Result<()> {
        let webhook = handle(
            pool,
            CreateWebhookCommand {
                url: "https://example.com/hook".to_string(),
                event_types: None,
                enabled: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(webhook.event_types.len(), 3);
        assert!(webhook.enabled);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_explicit_event_types(pool: PgPool) -> sqlx::Result<()> {
        let webhook = handle(
            pool,
            CreateWebhookCommand {
                url: "https://example.com/hook".to_string(),
                event_types: Some(vec!["import.failed".to_string()]),
                enabled: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(webhook.event_types, vec!["import.failed".to_string()]);
        assert!(!webhook.enabled);
        Ok(())
    }
}
