//! Product statistics query
//!
//! Catalog-level counts for the status endpoint.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Query for catalog statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductStatsQuery {}

/// Catalog statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStats {
    pub total_products: i64,
    pub active_products: i64,
    pub inactive_products: i64,
}

/// Errors that can occur when computing statistics
#[derive(Debug, thiserror::Error)]
pub enum ProductStatsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<ProductStats, ProductStatsError>> for ProductStatsQuery {}

impl crate::cqrs::Query for ProductStatsQuery {}

pub async fn handle(
    pool: PgPool,
    _query: ProductStatsQuery,
) -> Result<ProductStats, ProductStatsError> {
    let (total, active): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE active)
        FROM products
        "#,
    )
    .fetch_one(&pool)
    .await?;

    Ok(ProductStats {
        total_products: total,
        active_products: active,
        inactive_products: total - active,
    })
}
