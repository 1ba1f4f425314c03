//! Cancel import command
//!
//! Flips the cancellation flag and returns immediately; the pipeline
//! observes the flag at its next batch boundary. Idempotent.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::ImportState;

/// Command to request cancellation of a running import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelImportCommand {
    pub task_id: Uuid,
}

/// Acknowledgement of a cancellation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelImportResponse {
    pub task_id: Uuid,
    pub cancel_requested: bool,
}

/// Errors that can occur when requesting cancellation
#[derive(Debug, thiserror::Error)]
pub enum CancelImportError {
    #[error("Import task {0} not found")]
    NotFound(Uuid),
}

impl Request<Result<CancelImportResponse, CancelImportError>> for CancelImportCommand {}

impl crate::cqrs::Command for CancelImportCommand {}

#[tracing::instrument(skip(state), fields(task_id = %command.task_id))]
pub async fn handle(
    state: ImportState,
    command: CancelImportCommand,
) -> Result<CancelImportResponse, CancelImportError> {
    if !state.registry.request_cancel(command.task_id).await {
        return Err(CancelImportError::NotFound(command.task_id));
    }

    tracing::info!("cancellation requested");

    Ok(CancelImportResponse {
        task_id: command.task_id,
        cancel_requested: true,
    })
}
