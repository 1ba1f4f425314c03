//! Webhook API routes
//!
//! - `GET /api/v1/webhooks` - List registered webhooks
//! - `POST /api/v1/webhooks` - Register a webhook
//! - `PUT /api/v1/webhooks/:id` - Update a webhook
//! - `DELETE /api/v1/webhooks/:id` - Delete a webhook
//! - `POST /api/v1/webhooks/:id/test` - One delivery attempt, outcome reported

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::WebhookState;

use super::commands::{
    create, delete as delete_cmd, test as test_cmd, update, CreateWebhookCommand,
    CreateWebhookError, DeleteWebhookCommand, DeleteWebhookError, TestWebhookCommand,
    TestWebhookError, UpdateWebhookCommand, UpdateWebhookError,
};
use super::queries::{list, ListWebhooksError, ListWebhooksQuery};

/// Create webhook routes
pub fn webhooks_routes() -> Router<WebhookState> {
    Router::new()
        .route("/", get(list_webhooks).post(create_webhook))
        .route("/:id", axum::routing::put(update_webhook).delete(delete_webhook))
        .route("/:id/test", post(test_webhook))
}

/// List all registered webhooks
#[tracing::instrument(skip(state))]
async fn list_webhooks(State(state): State<WebhookState>) -> Result<Response, WebhookApiError> {
    let webhooks = list::handle(state.db, ListWebhooksQuery::default()).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(webhooks))).into_response())
}

/// Register a new webhook
///
/// # Response
///
/// - `201 Created` - Webhook registered
/// - `400 Bad Request` - Invalid URL or empty event types
#[tracing::instrument(skip(state, command), fields(url = %command.url))]
async fn create_webhook(
    State(state): State<WebhookState>,
    Json(command): Json<CreateWebhookCommand>,
) -> Result<Response, WebhookApiError> {
    let webhook = create::handle(state.db, command).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(webhook))).into_response())
}

/// Update a webhook (partial)
#[tracing::instrument(skip(state, command), fields(webhook_id = %id))]
async fn update_webhook(
    State(state): State<WebhookState>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateWebhookCommand>,
) -> Result<Response, WebhookApiError> {
    command.id = id;
    let webhook = update::handle(state.db, command).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(webhook))).into_response())
}

/// Delete a webhook
#[tracing::instrument(skip(state), fields(webhook_id = %id))]
async fn delete_webhook(
    State(state): State<WebhookState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebhookApiError> {
    let response = delete_cmd::handle(state.db, DeleteWebhookCommand { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Perform one test delivery and report the outcome
///
/// Always returns `200 OK` when the webhook exists; delivery failure is
/// reported in the body, not as an HTTP error.
#[tracing::instrument(skip(state), fields(webhook_id = %id))]
async fn test_webhook(
    State(state): State<WebhookState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebhookApiError> {
    let result = test_cmd::handle(state, TestWebhookCommand { id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(result))).into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum WebhookApiError {
    #[error(transparent)]
    Create(#[from] CreateWebhookError),

    #[error(transparent)]
    Update(#[from] UpdateWebhookError),

    #[error(transparent)]
    Delete(#[from] DeleteWebhookError),

    #[error(transparent)]
    Test(#[from] TestWebhookError),

    #[error(transparent)]
    List(#[from] ListWebhooksError),
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        match self {
            WebhookApiError::Create(CreateWebhookError::UrlValidation(_))
            | WebhookApiError::Create(CreateWebhookError::NoEventTypes)
            | WebhookApiError::Update(UpdateWebhookError::UrlValidation(_))
            | WebhookApiError::Update(UpdateWebhookError::NoEventTypes)
            | WebhookApiError::Update(UpdateWebhookError::NoFieldsToUpdate) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            WebhookApiError::Update(UpdateWebhookError::NotFound(_))
            | WebhookApiError::Delete(DeleteWebhookError::NotFound(_))
            | WebhookApiError::Test(TestWebhookError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            WebhookApiError::Create(CreateWebhookError::Database(_))
            | WebhookApiError::Update(UpdateWebhookError::Database(_))
            | WebhookApiError::Delete(DeleteWebhookError::Database(_))
            | WebhookApiError::Test(TestWebhookError::Database(_))
            | WebhookApiError::List(ListWebhooksError::Database(_)) => {
                tracing::error!("Database error in webhooks API: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhooks_routes_exist() {
        let _router = webhooks_routes();
    }
}
