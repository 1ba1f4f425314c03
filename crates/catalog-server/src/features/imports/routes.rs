//! Import API routes
//!
//! - `POST /api/v1/imports` - Upload a CSV and start an import
//! - `GET /api/v1/imports/:task_id` - Poll a task snapshot
//! - `GET /api/v1/imports/:task_id/events` - Subscribe to progress (SSE)
//! - `POST /api/v1/imports/:task_id/cancel` - Request cancellation

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::{stream, Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::ImportState;

use super::commands::{
    cancel_import, start_import, CancelImportCommand, CancelImportError, StartImportCommand,
    StartImportError,
};
use super::queries::{get_task, GetImportTaskError, GetImportTaskQuery};

/// Create import routes
pub fn imports_routes() -> Router<ImportState> {
    Router::new()
        .route("/", post(start))
        .route("/:task_id", get(get_import_task))
        .route("/:task_id/events", get(import_task_events))
        .route("/:task_id/cancel", post(cancel))
}

/// Upload a CSV file and start an import
///
/// The upload stream is spooled to disk while being received; the intake
/// returns as soon as the task is created and queued, long before the
/// import itself runs.
///
/// # Response
///
/// - `202 Accepted` - Task created and queued
/// - `400 Bad Request` - Missing file field or non-CSV upload
/// - `503 Service Unavailable` - Import queue is full
#[tracing::instrument(skip(state, multipart))]
async fn start(
    State(state): State<ImportState>,
    mut multipart: Multipart,
) -> Result<Response, ImportApiError> {
    let mut spooled = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportApiError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        if !filename.to_ascii_lowercase().ends_with(".csv") {
            return Err(StartImportError::NotCsv.into());
        }

        let path = state
            .config
            .spool_dir
            .join(format!("import-{}.csv", Uuid::new_v4()));

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| ImportApiError::Spool(e.to_string()))?;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ImportApiError::Multipart(e.to_string()))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| ImportApiError::Spool(e.to_string()))?;
        }

        file.flush()
            .await
            .map_err(|e| ImportApiError::Spool(e.to_string()))?;

        spooled = Some((filename, path));
        break;
    }

    let Some((filename, source)) = spooled else {
        return Err(ImportApiError::MissingFile);
    };

    let response = start_import::handle(state, StartImportCommand { filename, source }).await?;

    tracing::info!(task_id = %response.task_id, "import accepted via API");

    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

/// Poll a task snapshot
///
/// # Response
///
/// - `200 OK` - Current snapshot
/// - `404 Not Found` - Unknown task id
#[tracing::instrument(skip(state), fields(task_id = %task_id))]
async fn get_import_task(
    State(state): State<ImportState>,
    Path(task_id): Path<Uuid>,
) -> Result<Response, ImportApiError> {
    let task = get_task::handle(state, GetImportTaskQuery { task_id }).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(task))).into_response())
}

/// Subscribe to task progress via Server-Sent Events
///
/// Emits the current snapshot immediately, a snapshot at least once per
/// batch flush, and a final terminal snapshot, then ends the stream.
#[tracing::instrument(skip(state), fields(task_id = %task_id))]
async fn import_task_events(
    State(state): State<ImportState>,
    Path(task_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ImportApiError> {
    let rx = state
        .registry
        .subscribe(task_id)
        .await
        .ok_or(ImportApiError::Get(GetImportTaskError::NotFound(task_id)))?;

    // Yield the current snapshot immediately, then one per published update;
    // the stream ends right after the terminal snapshot is emitted.
    let stream = stream::unfold(Some((rx, true)), |state| async move {
        let (mut rx, first) = state?;
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let next = if snapshot.status.is_terminal() {
            None
        } else {
            Some((rx, false))
        };
        Some((snapshot, next))
    })
    .map(|snapshot| Event::default().event("progress").json_data(&snapshot));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Request cancellation of a running import
///
/// Returns immediately; the pipeline stops at its next batch boundary.
///
/// # Response
///
/// - `202 Accepted` - Cancellation requested (idempotent)
/// - `404 Not Found` - Unknown task id
#[tracing::instrument(skip(state), fields(task_id = %task_id))]
async fn cancel(
    State(state): State<ImportState>,
    Path(task_id): Path<Uuid>,
) -> Result<Response, ImportApiError> {
    let response = cancel_import::handle(state, CancelImportCommand { task_id }).await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum ImportApiError {
    #[error(transparent)]
    Start(#[from] StartImportError),

    #[error(transparent)]
    Cancel(#[from] CancelImportError),

    #[error(transparent)]
    Get(#[from] GetImportTaskError),

    #[error("Invalid multipart upload: {0}")]
    Multipart(String),

    #[error("Upload is missing the 'file' field")]
    MissingFile,

    #[error("Failed to spool upload: {0}")]
    Spool(String),
}

impl IntoResponse for ImportApiError {
    fn into_response(self) -> Response {
        match self {
            ImportApiError::Start(StartImportError::NotCsv)
            | ImportApiError::Multipart(_)
            | ImportApiError::MissingFile => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ImportApiError::Start(StartImportError::QueueFull) => {
                let error = ErrorResponse::new("QUEUE_FULL", self.to_string());
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            ImportApiError::Cancel(CancelImportError::NotFound(_))
            | ImportApiError::Get(GetImportTaskError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            ImportApiError::Spool(_) => {
                tracing::error!("Failed to spool upload: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "Failed to store upload");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imports_routes_exist() {
        let _router = imports_routes();
    }

    #[test]
    fn test_error_status_mapping() {
        let resp = ImportApiError::MissingFile.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ImportApiError::Start(StartImportError::QueueFull).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp =
            ImportApiError::Get(GetImportTaskError::NotFound(Uuid::new_v4())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
