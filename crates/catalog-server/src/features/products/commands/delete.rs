//! Delete product command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Command to delete a single product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductCommand {
    pub id: Uuid,
}

/// Response from deleting a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteProductResponse {
    pub id: Uuid,
    pub deleted: bool,
}

/// Errors that can occur when deleting a product
#[derive(Debug, thiserror::Error)]
pub enum DeleteProductError {
    #[error("Product {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<DeleteProductResponse, DeleteProductError>> for DeleteProductCommand {}

impl crate::cqrs::Command for DeleteProductCommand {}

#[tracing::instrument(skip(pool), fields(product_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: DeleteProductCommand,
) -> Result<DeleteProductResponse, DeleteProductError> {
    let deleted: Option<Uuid> =
        sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING id")
            .bind(command.id)
            .fetch_optional(&pool)
            .await?;

    let id = deleted.ok_or(DeleteProductError::NotFound(command.id))?;

    tracing::info!("product deleted");

    Ok(DeleteProductResponse { id, deleted: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::products::commands::create::{self, CreateProductCommand};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_deletes(pool: PgPool) -> sqlx::Result<()> {
        let product = create::handle(
            pool.clone(),
            CreateProductCommand {
                name: "Widget".to_string(),
                sku: "ABC-1".to_string(),
                description: String::new(),
                active: true,
            },
        )
        .await
        .unwrap();

        let response = handle(pool.clone(), DeleteProductCommand { id: product.id })
            .await
            .unwrap();
        assert!(response.deleted);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_handle_unknown_product(pool: PgPool) -> sqlx::Result<()> {
        let result = handle(pool, DeleteProductCommand { id: Uuid::new_v4() }).await;
        assert!(matches!(result, Err(DeleteProductError::NotFound(_))));
        Ok(())
    }
}
