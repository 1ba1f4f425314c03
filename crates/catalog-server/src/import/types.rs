//! Import task state and counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of row errors retained on a task.
///
/// All errors are still counted in `error_count`; only the first
/// `SAMPLE_ERROR_CAP` are kept with their row index and reason.
pub const SAMPLE_ERROR_CAP: usize = 100;

/// Lifecycle state of an import task
///
/// Transitions are one-directional:
/// `pending -> running -> {completed | cancelled | failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Running => "running",
            ImportStatus::Completed => "completed",
            ImportStatus::Cancelled => "cancelled",
            ImportStatus::Failed => "failed",
        }
    }

    /// Terminal states are absorbing; the task never transitions further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportStatus::Completed | ImportStatus::Cancelled | ImportStatus::Failed
        )
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason a row was rejected by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    MissingRequiredField { field: String },
    EmptyBusinessKey,
}

impl RejectReason {
    pub fn missing_field(field: &str) -> Self {
        RejectReason::MissingRequiredField {
            field: field.to_string(),
        }
    }
}

/// A sampled per-row rejection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based data row index (the header row is not counted).
    pub row: u64,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Snapshot of an import task as exposed to observers
///
/// Owned and mutated exclusively by the pipeline running the task; readers
/// receive consistent copies through the progress registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportTask {
    pub id: Uuid,
    pub status: ImportStatus,
    /// Known only after the file has been fully read.
    pub total_rows: Option<u64>,
    pub processed_rows: u64,
    pub created_count: u64,
    pub updated_count: u64,
    /// Within-file duplicate rows, excluded from created/updated.
    pub skipped_count: u64,
    /// Rows rejected by the normalizer.
    pub error_count: u64,
    pub sample_errors: Vec<RowError>,
    /// Cause of a `failed` terminal state.
    pub error: Option<String>,
    /// Monotonic: once true, never reverts.
    pub cancel_requested: bool,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportTask {
    /// Create a fresh pending task.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            status: ImportStatus::Pending,
            total_rows: None,
            processed_rows: 0,
            created_count: 0,
            updated_count: 0,
            skipped_count: 0,
            error_count: 0,
            sample_errors: Vec::new(),
            error: None,
            cancel_requested: false,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}
