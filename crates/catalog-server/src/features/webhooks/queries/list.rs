//! List webhooks query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::super::types::Webhook;

/// Query for all registered webhooks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWebhooksQuery {}

/// Errors that can occur when listing webhooks
#[derive(Debug, thiserror::Error)]
pub enum ListWebhooksError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Vec<Webhook>, ListWebhooksError>> for ListWebhooksQuery {}

impl crate::cqrs::Query for ListWebhooksQuery {}

pub async fn handle(
    pool: PgPool,
    _query: ListWebhooksQuery,
) -> Result<Vec<Webhook>, ListWebhooksError> {
    let webhooks = sqlx::query_as::<_, Webhook>(
        r#"
        SELECT id, url, event_types, enabled, created_at
        FROM webhooks
        ORDER BY created_at, id
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(webhooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::webhooks::commands::create::{self, CreateWebhookCommand};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_lists_in_creation_order(pool: PgPool) -> sqlx::Result<()> {
        for url in ["https://a.example.com", "https://b.example.com"] {
            create::handle(
                pool.clone(),
                CreateWebhookCommand {
                    url: url.to_string(),
                    event_types: None,
                    enabled: true,
                },
            )
            .await
            .unwrap();
        }

        let webhooks = handle(pool, ListWebhooksQuery::default()).await.unwrap();
        assert_eq!(webhooks.len(), 2);
        Ok(())
    }
}
