//! Update product command
//!
//! Partial update: only provided fields are changed.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{
    validate_name, validate_sku, NameValidationError, SkuValidationError,
};

use super::super::types::{normalize_sku, Product, MAX_NAME_LENGTH, MAX_SKU_LENGTH};

/// Command to update an existing product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProductCommand {
    /// Set from the path parameter, not the request body.
    #[serde(skip)]
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Errors that can occur when updating a product
#[derive(Debug, thiserror::Error)]
pub enum UpdateProductError {
    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("SKU validation failed: {0}")]
    SkuValidation(#[from] SkuValidationError),

    #[error("Product {0} not found")]
    NotFound(Uuid),

    #[error("Product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, UpdateProductError>> for UpdateProductCommand {}

impl crate::cqrs::Command for UpdateProductCommand {}

impl UpdateProductCommand {
    pub fn validate(&self) -> Result<(), UpdateProductError> {
        if self.name.is_none()
            && self.sku.is_none()
            && self.description.is_none()
            && self.active.is_none()
        {
            return Err(UpdateProductError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, MAX_NAME_LENGTH)?;
        }
        if let Some(ref sku) = self.sku {
            validate_sku(sku, MAX_SKU_LENGTH)?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(pool, command), fields(product_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateProductCommand,
) -> Result<Product, UpdateProductError> {
    command.validate()?;

    let sku = command.sku.as_deref().map(normalize_sku);

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = COALESCE($2, name),
            sku = COALESCE($3, sku),
            description = COALESCE($4, description),
            active = COALESCE($5, active)
        WHERE id = $1
        RETURNING id, name, sku, description, active, created_at
        "#,
    )
    .bind(command.id)
    .bind(&command.name)
    .bind(&sku)
    .bind(&command.description)
    .bind(command.active)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return UpdateProductError::DuplicateSku(sku.clone().unwrap_or_default());
            }
        }
        UpdateProductError::Database(e)
    })?
    .ok_or(UpdateProductError::NotFound(command.id))?;

    tracing::info!(sku = %product.sku, "product updated");

    Ok(product)
}
