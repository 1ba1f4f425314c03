//! List products query
//!
//! Paginated listing with optional case-insensitive search over name, SKU,
//! and description, and an optional active filter.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::pagination::{Paginated, PaginationParams};

use super::super::types::Product;

/// Query parameters for listing products
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListProductsQuery {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 20, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,

    /// Matches name, SKU, or description (substring, case-insensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl ListProductsQuery {
    fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

/// Errors that can occur when listing products
#[derive(Debug, thiserror::Error)]
pub enum ListProductsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Paginated<Product>, ListProductsError>> for ListProductsQuery {}

impl crate::cqrs::Query for ListProductsQuery {}

#[tracing::instrument(
    skip(pool, query),
    fields(
        page = ?query.page,
        search = ?query.search,
        active = ?query.active
    )
)]
pub async fn handle(
    pool: PgPool,
    query: ListProductsQuery,
) -> Result<Paginated<Product>, ListProductsError> {
    let pagination = query.pagination();
    let pattern = query
        .search
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| format!("%{}%", s.trim()));

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM products
        WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR description ILIKE $1)
          AND ($2::boolean IS NULL OR active = $2)
        "#,
    )
    .bind(&pattern)
    .bind(query.active)
    .fetch_one(&pool)
    .await?;

    let items = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, sku, description, active, created_at
        FROM products
        WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1 OR description ILIKE $1)
          AND ($2::boolean IS NULL OR active = $2)
        ORDER BY created_at DESC, id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(&pattern)
    .bind(query.active)
    .bind(pagination.per_page())
    .bind(pagination.offset())
    .fetch_all(&pool)
    .await?;

    Ok(Paginated::from_items(items, &pagination, total))
}
