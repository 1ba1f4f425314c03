//! Product API routes
//!
//! - `GET /api/v1/products` - List products with pagination and filters
//! - `POST /api/v1/products` - Create a product
//! - `GET /api/v1/products/stats` - Catalog statistics
//! - `GET /api/v1/products/:id` - Get a product
//! - `PUT /api/v1/products/:id` - Update a product
//! - `DELETE /api/v1/products/:id` - Delete a product
//! - `DELETE /api/v1/products` - Delete all products

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::commands::{
    create, delete as delete_cmd, delete_all, update, CreateProductCommand, CreateProductError,
    DeleteAllProductsCommand, DeleteAllProductsError, DeleteProductCommand, DeleteProductError,
    UpdateProductCommand, UpdateProductError,
};
use super::queries::{
    get as get_query, list, stats, GetProductError, GetProductQuery, ListProductsError,
    ListProductsQuery, ProductStatsError, ProductStatsQuery,
};

/// Create product routes
pub fn products_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_products).post(create_product).delete(delete_all_products))
        .route("/stats", get(product_stats))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// List products with pagination, search, and active filter
#[tracing::instrument(skip(pool, query))]
async fn list_products(
    State(pool): State<PgPool>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Response, ProductApiError> {
    let page = list::handle(pool, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(page))).into_response())
}

/// Create a new product
///
/// # Response
///
/// - `201 Created` - Product created
/// - `400 Bad Request` - Validation error
/// - `409 Conflict` - SKU already exists (case-insensitive)
#[tracing::instrument(skip(pool, command), fields(sku = %command.sku))]
async fn create_product(
    State(pool): State<PgPool>,
    Json(command): Json<CreateProductCommand>,
) -> Result<Response, ProductApiError> {
    let product = create::handle(pool, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))).into_response())
}

/// Get a single product
#[tracing::instrument(skip(pool), fields(product_id = %id))]
async fn get_product(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, ProductApiError> {
    let product = get_query::handle(pool, GetProductQuery { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

/// Update a product (partial)
#[tracing::instrument(skip(pool, command), fields(product_id = %id))]
async fn update_product(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateProductCommand>,
) -> Result<Response, ProductApiError> {
    command.id = id;
    let product = update::handle(pool, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

/// Delete a product
#[tracing::instrument(skip(pool), fields(product_id = %id))]
async fn delete_product(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<Response, ProductApiError> {
    let response = delete_cmd::handle(pool, DeleteProductCommand { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Delete every product
#[tracing::instrument(skip(pool))]
async fn delete_all_products(State(pool): State<PgPool>) -> Result<Response, ProductApiError> {
    let response = delete_all::handle(pool, DeleteAllProductsCommand::default()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Catalog statistics
#[tracing::instrument(skip(pool))]
async fn product_stats(State(pool): State<PgPool>) -> Result<Response, ProductApiError> {
    let stats = stats::handle(pool, ProductStatsQuery::default()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(stats))).into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum ProductApiError {
    #[error(transparent)]
    Create(#[from] CreateProductError),

    #[error(transparent)]
    Update(#[from] UpdateProductError),

    #[error(transparent)]
    Delete(#[from] DeleteProductError),

    #[error(transparent)]
    DeleteAll(#[from] DeleteAllProductsError),

    #[error(transparent)]
    Get(#[from] GetProductError),

    #[error(transparent)]
    List(#[from] ListProductsError),

    #[error(transparent)]
    Stats(#[from] ProductStatsError),
}

impl IntoResponse for ProductApiError {
    fn into_response(self) -> Response {
        match self {
            ProductApiError::Create(CreateProductError::NameValidation(_))
            | ProductApiError::Create(CreateProductError::SkuValidation(_))
            | ProductApiError::Update(UpdateProductError::NameValidation(_))
            | ProductApiError::Update(UpdateProductError::SkuValidation(_))
            | ProductApiError::Update(UpdateProductError::NoFieldsToUpdate) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ProductApiError::Create(CreateProductError::DuplicateSku(_))
            | ProductApiError::Update(UpdateProductError::DuplicateSku(_)) => {
                let error = ErrorResponse::new("CONFLICT", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            ProductApiError::Update(UpdateProductError::NotFound(_))
            | ProductApiError::Delete(DeleteProductError::NotFound(_))
            | ProductApiError::Get(GetProductError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ProductApiError::Create(CreateProductError::Database(_))
            | ProductApiError::Update(UpdateProductError::Database(_))
            | ProductApiError::Delete(DeleteProductError::Database(_))
            | ProductApiError::DeleteAll(DeleteAllProductsError::Database(_))
            | ProductApiError::Get(GetProductError::Database(_))
            | ProductApiError::List(ListProductsError::Database(_))
            | ProductApiError::Stats(ProductStatsError::Database(_)) => {
                tracing::error!("Database error in products API: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
