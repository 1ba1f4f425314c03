//! Webhook data transfer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event types a webhook subscribes to unless it names its own.
pub const DEFAULT_EVENT_TYPES: &[&str] =
    &["import.completed", "import.cancelled", "import.failed"];

/// A registered webhook as stored and returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Webhook {
    pub id: Uuid,
    pub url: String,
    pub event_types: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// The default subscription set as owned strings.
pub fn default_event_types() -> Vec<String> {
    DEFAULT_EVENT_TYPES.iter().map(|s| s.to_string()).collect()
}
