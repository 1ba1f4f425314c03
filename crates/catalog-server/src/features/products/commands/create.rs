//! Create product command

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::validation::{
    validate_name, validate_sku, NameValidationError, SkuValidationError,
};

use super::super::types::{normalize_sku, Product, MAX_NAME_LENGTH, MAX_SKU_LENGTH};

/// Command to create a single product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductCommand {
    pub name: String,

    /// Stored normalized (trimmed, uppercase); uniqueness is
    /// case-insensitive.
    pub sku: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Errors that can occur when creating a product
#[derive(Debug, thiserror::Error)]
pub enum CreateProductError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("SKU validation failed: {0}")]
    SkuValidation(#[from] SkuValidationError),

    #[error("Product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, CreateProductError>> for CreateProductCommand {}

impl crate::cqrs::Command for CreateProductCommand {}

impl CreateProductCommand {
    pub fn validate(&self) -> Result<(), CreateProductError> {
        validate_name(&self.name, MAX_NAME_LENGTH)?;
        validate_sku(&self.sku, MAX_SKU_LENGTH)?;
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(sku = %command.sku))]
pub async fn handle(
    pool: PgPool,
    command: CreateProductCommand,
) -> Result<Product, CreateProductError> {
    command.validate()?;

    let sku = normalize_sku(&command.sku);

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, sku, description, active)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, sku, description, active, created_at
        "#,
    )
    .bind(&command.name)
    .bind(&sku)
    .bind(&command.description)
    .bind(command.active)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return CreateProductError::DuplicateSku(sku.clone());
            }
        }
        CreateProductError::Database(e)
    })?;

    tracing::info!(product_id = %product.id, "product created");

    Ok(product)
}
