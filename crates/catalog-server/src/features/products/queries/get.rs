//! Get product query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::super::types::Product;

/// Query for a single product by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProductQuery {
    pub id: Uuid,
}

/// Errors that can occur when reading a product
#[derive(Debug, thiserror::Error)]
pub enum GetProductError {
    #[error("Product {0} not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, GetProductError>> for GetProductQuery {}

impl crate::cqrs::Query for GetProductQuery {}

pub async fn handle(pool: PgPool, query: GetProductQuery) -> Result<Product, GetProductError> {
    sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, sku, description, active, created_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(query.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(GetProductError::NotFound(query.id))
}
