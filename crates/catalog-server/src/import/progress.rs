//! Process-wide import task registry
//!
//! The single shared mutable surface between running pipelines and the rest
//! of the system. Each task is held behind a watch channel: the owning
//! pipeline is the only writer, while any number of observers read consistent
//! snapshots by polling or subscribing. Cancellation flags are carried by a
//! per-task [`CancellationToken`] so any caller can request a stop.
//!
//! Entries are retained for the lifetime of the process; there is no
//! eviction policy (see DESIGN.md).

use std::collections::HashMap;

use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::types::ImportTask;

struct TaskHandle {
    state: watch::Sender<ImportTask>,
    cancel: CancellationToken,
}

/// Concurrency-safe mapping from task id to task state
#[derive(Default)]
pub struct ImportRegistry {
    tasks: RwLock<HashMap<Uuid, TaskHandle>>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh pending task and return its initial snapshot.
    pub async fn create(&self) -> ImportTask {
        let task = ImportTask::new(Uuid::new_v4());
        let (state, _) = watch::channel(task.clone());
        let handle = TaskHandle {
            state,
            cancel: CancellationToken::new(),
        };

        self.tasks.write().await.insert(task.id, handle);
        task
    }

    /// Read the current snapshot of a task.
    pub async fn snapshot(&self, task_id: Uuid) -> Option<ImportTask> {
        self.tasks
            .read()
            .await
            .get(&task_id)
            .map(|handle| handle.state.borrow().clone())
    }

    /// Subscribe to snapshot updates for a task.
    ///
    /// The receiver immediately yields the current snapshot and then every
    /// published update; polling and subscribing observe identical contents.
    pub async fn subscribe(&self, task_id: Uuid) -> Option<watch::Receiver<ImportTask>> {
        self.tasks
            .read()
            .await
            .get(&task_id)
            .map(|handle| handle.state.subscribe())
    }

    /// The cancellation token checked by the owning pipeline.
    pub async fn cancel_token(&self, task_id: Uuid) -> Option<CancellationToken> {
        self.tasks
            .read()
            .await
            .get(&task_id)
            .map(|handle| handle.cancel.clone())
    }

    /// Request cancellation of a task. Idempotent; callable by anyone.
    ///
    /// Returns `false` if the task id is unknown. Requesting cancellation of
    /// a task that already reached a terminal state acknowledges without
    /// mutating the (now immutable) snapshot.
    pub async fn request_cancel(&self, task_id: Uuid) -> bool {
        let tasks = self.tasks.read().await;
        let Some(handle) = tasks.get(&task_id) else {
            return false;
        };

        handle.cancel.cancel();
        handle.state.send_if_modified(|task| {
            if task.status.is_terminal() || task.cancel_requested {
                false
            } else {
                task.cancel_requested = true;
                true
            }
        });

        true
    }

    /// Apply a mutation and publish the resulting snapshot.
    ///
    /// Only the pipeline owning the task (and intake, before any pipeline
    /// has picked the task up) may call this.
    pub(crate) async fn update(&self, task_id: Uuid, apply: impl FnOnce(&mut ImportTask)) {
        if let Some(handle) = self.tasks.read().await.get(&task_id) {
            handle.state.send_modify(apply);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::types::ImportStatus;

    #[tokio::test]
    async fn test_create_and_snapshot() {
        let registry = ImportRegistry::new();
        let task = registry.create().await;

        let snapshot = registry.snapshot(task.id).await.unwrap();
        assert_eq!(snapshot.id, task.id);
        assert_eq!(snapshot.status, ImportStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let registry = ImportRegistry::new();
        assert!(registry.snapshot(Uuid::new_v4()).await.is_none());
        assert!(registry.subscribe(Uuid::new_v4()).await.is_none());
        assert!(!registry.request_cancel(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_monotonic() {
        let registry = ImportRegistry::new();
        let task = registry.create().await;

        assert!(registry.request_cancel(task.id).await);
        assert!(registry.request_cancel(task.id).await);

        let snapshot = registry.snapshot(task.id).await.unwrap();
        assert!(snapshot.cancel_requested);

        let token = registry.cancel_token(task.id).await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_after_terminal_leaves_snapshot_unchanged() {
        let registry = ImportRegistry::new();
        let task = registry.create().await;

        registry
            .update(task.id, |t| t.status = ImportStatus::Completed)
            .await;
        assert!(registry.request_cancel(task.id).await);

        let snapshot = registry.snapshot(task.id).await.unwrap();
        assert_eq!(snapshot.status, ImportStatus::Completed);
        assert!(!snapshot.cancel_requested);
    }

    #[tokio::test]
    async fn test_subscribers_observe_updates() {
        let registry = ImportRegistry::new();
        let task = registry.create().await;
        let mut rx = registry.subscribe(task.id).await.unwrap();

        assert_eq!(rx.borrow().processed_rows, 0);

        registry
            .update(task.id, |t| {
                t.status = ImportStatus::Running;
                t.processed_rows = 5000;
            })
            .await;

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(snapshot.status, ImportStatus::Running);
        assert_eq!(snapshot.processed_rows, 5000);
    }
}
