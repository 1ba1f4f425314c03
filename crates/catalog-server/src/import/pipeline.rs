//! Streaming import pipeline
//!
//! Drives one import task from a spooled CSV file to a terminal state:
//!
//! 1. Mark the task running.
//! 2. Stream rows (never loading the whole file), normalizing and
//!    deduplicating each one.
//! 3. Flush full batches through the [`BatchWriter`] and publish a progress
//!    snapshot after every flush.
//! 4. Observe cancellation at batch boundaries only; a batch assembled after
//!    the request is counted as processed but never written.
//! 5. On any terminal transition, dispatch webhook notifications exactly
//!    once, detached from the task's own state.
//!
//! Per-row rejections and within-file duplicates are counted and never abort
//! the task; source-read and batch-write errors fail it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::ImportConfig;

use super::dedup::Deduplicator;
use super::normalizer::{NormalizedRecord, RowSchema};
use super::notify::{ImportEvent, WebhookDispatcher};
use super::progress::ImportRegistry;
use super::types::{ImportStatus, RowError, SAMPLE_ERROR_CAP};
use super::writer::{BatchWriteStats, BatchWriter};

/// Errors that abort a running import
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to open source: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read source: {0}")]
    Source(#[from] csv_async::Error),

    #[error("batch write failed: {0}")]
    Write(#[from] sqlx::Error),
}

enum Outcome {
    Completed,
    Cancelled,
}

/// Runs a single import to completion
pub struct ImportPipeline {
    registry: Arc<ImportRegistry>,
    writer: BatchWriter,
    dispatcher: Arc<WebhookDispatcher>,
    batch_size: usize,
}

impl ImportPipeline {
    pub fn new(
        db: PgPool,
        registry: Arc<ImportRegistry>,
        dispatcher: Arc<WebhookDispatcher>,
        config: &ImportConfig,
    ) -> Self {
        Self {
            registry,
            writer: BatchWriter::new(db),
            dispatcher,
            batch_size: config.batch_size.max(1),
        }
    }

    /// Run the task to a terminal state.
    ///
    /// The spooled source file is always removed, whatever the outcome.
    #[tracing::instrument(skip(self, source), fields(task_id = %task_id))]
    pub async fn run(&self, task_id: Uuid, source: PathBuf) {
        self.registry
            .update(task_id, |task| {
                task.status = ImportStatus::Running;
                task.started_at = Some(Utc::now());
            })
            .await;

        let cancel = self
            .registry
            .cancel_token(task_id)
            .await
            .unwrap_or_default();

        let outcome = self.stream(task_id, &source, &cancel).await;

        if let Err(e) = tokio::fs::remove_file(&source).await {
            warn!(path = %source.display(), error = %e, "failed to remove spooled source");
        }

        let event = match outcome {
            Ok(Outcome::Completed) => {
                self.registry
                    .update(task_id, |task| {
                        task.status = ImportStatus::Completed;
                        task.total_rows = Some(task.processed_rows);
                        task.finished_at = Some(Utc::now());
                    })
                    .await;
                ImportEvent::Completed
            },
            Ok(Outcome::Cancelled) => {
                self.registry
                    .update(task_id, |task| {
                        task.status = ImportStatus::Cancelled;
                        task.finished_at = Some(Utc::now());
                    })
                    .await;
                info!("import cancelled");
                ImportEvent::Cancelled
            },
            Err(e) => {
                error!(error = %e, "import failed");
                self.registry
                    .update(task_id, |task| {
                        task.status = ImportStatus::Failed;
                        task.error = Some(e.to_string());
                        task.finished_at = Some(Utc::now());
                    })
                    .await;
                ImportEvent::Failed
            },
        };

        if let Some(snapshot) = self.registry.snapshot(task_id).await {
            info!(
                status = snapshot.status.as_str(),
                processed = snapshot.processed_rows,
                created = snapshot.created_count,
                updated = snapshot.updated_count,
                skipped = snapshot.skipped_count,
                errors = snapshot.error_count,
                "import finished"
            );

            // Exactly one dispatch per terminal transition, detached so a
            // delivery failure cannot touch the task.
            let dispatcher = self.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.dispatch(event, &snapshot).await;
            });
        }
    }

    async fn stream(
        &self,
        task_id: Uuid,
        source: &Path,
        cancel: &CancellationToken,
    ) -> Result<Outcome, PipelineError> {
        let file = tokio::fs::File::open(source).await?;
        let mut reader = csv_async::AsyncReaderBuilder::new()
            .flexible(true)
            .create_reader(tokio::io::BufReader::new(file));

        let schema = RowSchema::from_headers(&reader.headers().await?.clone());

        let mut dedup = Deduplicator::new();
        let mut batch: Vec<NormalizedRecord> = Vec::with_capacity(self.batch_size);
        let mut totals = BatchWriteStats::default();
        let mut processed: u64 = 0;
        let mut pending_rows: u64 = 0;
        let mut row_index: u64 = 0;
        let mut skipped: u64 = 0;
        let mut errors: u64 = 0;
        let mut samples: Vec<RowError> = Vec::new();

        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record?;
            row_index += 1;
            pending_rows += 1;

            match schema.normalize(&record) {
                Ok(normalized) => {
                    if dedup.observe(&normalized.sku) {
                        batch.push(normalized);
                    } else {
                        skipped += 1;
                    }
                },
                Err(reason) => {
                    errors += 1;
                    if samples.len() < SAMPLE_ERROR_CAP {
                        samples.push(RowError {
                            row: row_index,
                            reason,
                        });
                    }
                },
            }

            if batch.len() >= self.batch_size {
                if cancel.is_cancelled() {
                    processed += pending_rows;
                    self.publish(task_id, processed, totals, skipped, errors, &samples)
                        .await;
                    return Ok(Outcome::Cancelled);
                }

                totals = totals.merge(self.writer.write(&batch).await?);
                batch.clear();
                processed += pending_rows;
                pending_rows = 0;
                self.publish(task_id, processed, totals, skipped, errors, &samples)
                    .await;

                info!(
                    processed,
                    created = totals.created,
                    updated = totals.updated,
                    "batch flushed"
                );
            }
        }
        drop(records);

        // End of stream: the trailing partial batch flushes unless the task
        // was cancelled first.
        processed += pending_rows;
        if cancel.is_cancelled() {
            self.publish(task_id, processed, totals, skipped, errors, &samples)
                .await;
            return Ok(Outcome::Cancelled);
        }

        totals = totals.merge(self.writer.write(&batch).await?);
        self.publish(task_id, processed, totals, skipped, errors, &samples)
            .await;

        Ok(Outcome::Completed)
    }

    async fn publish(
        &self,
        task_id: Uuid,
        processed: u64,
        totals: BatchWriteStats,
        skipped: u64,
        errors: u64,
        samples: &[RowError],
    ) {
        let samples = samples.to_vec();
        self.registry
            .update(task_id, move |task| {
                task.processed_rows = processed;
                task.created_count = totals.created;
                task.updated_count = totals.updated;
                task.skipped_count = skipped;
                task.error_count = errors;
                task.sample_errors = samples;
            })
            .await;
    }
}
