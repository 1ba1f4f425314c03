//! Background import worker pool
//!
//! A bounded mpsc queue feeds a fixed number of background workers, capping
//! how many imports run concurrently and how many may wait. Intake enqueues
//! and returns immediately; it never blocks on an import.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::info;
use uuid::Uuid;

use super::pipeline::ImportPipeline;

/// A queued import awaiting a worker
#[derive(Debug)]
pub struct ImportJob {
    pub task_id: Uuid,
    /// Spooled upload; the pipeline removes it when done.
    pub source: PathBuf,
}

/// Error returned when the pending-import queue is at capacity
#[derive(Debug, thiserror::Error)]
#[error("import queue is full")]
pub struct QueueFull;

/// Handle used by intake to enqueue imports
#[derive(Clone)]
pub struct ImportQueue {
    tx: mpsc::Sender<ImportJob>,
}

impl ImportQueue {
    /// Enqueue without waiting; a full queue is reported to the caller.
    pub fn try_enqueue(&self, job: ImportJob) -> Result<(), QueueFull> {
        self.tx.try_send(job).map_err(|_| QueueFull)
    }
}

/// Spawn `workers` background tasks consuming a shared queue of imports.
pub fn spawn_workers(
    pipeline: Arc<ImportPipeline>,
    workers: usize,
    queue_depth: usize,
) -> ImportQueue {
    let (tx, rx) = mpsc::channel::<ImportJob>(queue_depth.max(1));
    let rx = Arc::new(Mutex::new(rx));

    for worker_id in 0..workers.max(1) {
        let rx = Arc::clone(&rx);
        let pipeline = Arc::clone(&pipeline);

        tokio::spawn(async move {
            info!(worker_id, "import worker started");
            loop {
                // Hold the lock only while waiting for a job, not while
                // running one, so other workers keep draining the queue.
                let job = { rx.lock().await.recv().await };
                let Some(job) = job else { break };

                info!(worker_id, task_id = %job.task_id, "import picked up");
                pipeline.run(job.task_id, job.source).await;
            }
            info!(worker_id, "import worker stopped");
        });
    }

    ImportQueue { tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_reports_full() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = ImportQueue { tx };

        let job = ImportJob {
            task_id: Uuid::new_v4(),
            source: PathBuf::from("/tmp/one.csv"),
        };
        assert!(queue.try_enqueue(job).is_ok());

        let job = ImportJob {
            task_id: Uuid::new_v4(),
            source: PathBuf::from("/tmp/two.csv"),
        };
        assert!(queue.try_enqueue(job).is_err());
    }
}
