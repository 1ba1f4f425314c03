//! Delete all products command
//!
//! Clears the catalog. Intended for resetting between bulk imports.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Command to delete every product
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteAllProductsCommand {}

/// Response from clearing the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAllProductsResponse {
    pub deleted: u64,
}

/// Errors that can occur when clearing the catalog
#[derive(Debug, thiserror::Error)]
pub enum DeleteAllProductsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteAllProductsResponse, DeleteAllProductsError>>
    for DeleteAllProductsCommand
{
}

impl crate::cqrs::Command for DeleteAllProductsCommand {}

#[tracing::instrument(skip(pool, _command))]
pub async fn handle(
    pool: PgPool,
    _command: DeleteAllProductsCommand,
) -> Result<DeleteAllProductsResponse, DeleteAllProductsError> {
    let result = sqlx::query("DELETE FROM products").execute(&pool).await?;
    let deleted = result.rows_affected();

    tracing::info!(deleted, "all products deleted");

    Ok(DeleteAllProductsResponse { deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::commands::create::{self, CreateProductCommand};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_clears_catalog(pool: PgPool) -> sqlx::Result<()> {
        for sku in ["A-1", "A-2", "A-3"] {
            create::handle(
                pool.clone(),
                CreateProductCommand {
                    name: format!("Product {sku}"),
                    sku: sku.to_string(),
                    description: String::new(),
                    active: true,
                },
            )
            .await
            .unwrap();
        }

        let response = handle(pool.clone(), DeleteAllProductsCommand::default())
            .await
            .unwrap();
        assert_eq!(response.deleted, 3);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 0);
        Ok(())
    }
}
