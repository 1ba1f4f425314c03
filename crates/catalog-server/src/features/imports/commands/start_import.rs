//! Start import command
//!
//! Creates the progress-store entry and hands the spooled upload to the
//! worker pool. Returns the task identifier immediately; all further
//! interaction happens through the progress channel.

use std::path::PathBuf;

use chrono::Utc;
use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::ImportState;
use crate::import::types::ImportStatus;
use crate::import::worker::ImportJob;

/// Command to start a bulk import from a spooled upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartImportCommand {
    /// Original filename of the upload, used only for validation.
    pub filename: String,

    /// Spooled file holding the uploaded bytes.
    #[serde(skip)]
    pub source: PathBuf,
}

/// Response from starting an import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartImportResponse {
    pub task_id: Uuid,
    pub status: ImportStatus,
}

/// Errors that can occur when starting an import
#[derive(Debug, thiserror::Error)]
pub enum StartImportError {
    #[error("Only CSV files are accepted")]
    NotCsv,

    #[error("Import queue is full, try again later")]
    QueueFull,
}

impl Request<Result<StartImportResponse, StartImportError>> for StartImportCommand {}

impl crate::cqrs::Command for StartImportCommand {}

impl StartImportCommand {
    pub fn validate(&self) -> Result<(), StartImportError> {
        if !self.filename.to_ascii_lowercase().ends_with(".csv") {
            return Err(StartImportError::NotCsv);
        }
        Ok(())
    }
}

#[tracing::instrument(skip(state, command), fields(filename = %command.filename))]
pub async fn handle(
    state: ImportState,
    command: StartImportCommand,
) -> Result<StartImportResponse, StartImportError> {
    command.validate()?;

    let task = state.registry.create().await;
    tracing::info!(task_id = %task.id, "import task created");

    let job = ImportJob {
        task_id: task.id,
        source: command.source.clone(),
    };

    if state.queue.try_enqueue(job).is_err() {
        // The caller keeps the task id; the task records why nothing will
        // ever run it.
        state
            .registry
            .update(task.id, |t| {
                t.status = ImportStatus::Failed;
                t.error = Some("import queue is full".to_string());
                t.finished_at = Some(Utc::now());
            })
            .await;

        if let Err(e) = tokio::fs::remove_file(&command.source).await {
            tracing::warn!(error = %e, "failed to remove spooled upload");
        }

        return Err(StartImportError::QueueFull);
    }

    Ok(StartImportResponse {
        task_id: task.id,
        status: task.status,
    })
}
