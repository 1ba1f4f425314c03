//! Get import task query
//!
//! Polling read-path for import progress; returns the same snapshot content
//! the SSE subscription emits.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::ImportState;
use crate::import::types::ImportTask;

/// Query for a task snapshot by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetImportTaskQuery {
    pub task_id: Uuid,
}

/// Errors that can occur when reading a task
#[derive(Debug, thiserror::Error)]
pub enum GetImportTaskError {
    #[error("Import task {0} not found")]
    NotFound(Uuid),
}

impl Request<Result<ImportTask, GetImportTaskError>> for GetImportTaskQuery {}

impl crate::cqrs::Query for GetImportTaskQuery {}

pub async fn handle(
    state: ImportState,
    query: GetImportTaskQuery,
) -> Result<ImportTask, GetImportTaskError> {
    state
        .registry
        .snapshot(query.task_id)
        .await
        .ok_or(GetImportTaskError::NotFound(query.task_id))
}
