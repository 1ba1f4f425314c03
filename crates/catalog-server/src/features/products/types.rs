//! Product data transfer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum accepted length of a product name.
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum accepted length of a SKU.
pub const MAX_SKU_LENGTH: usize = 64;

/// A product as stored and returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Stored normalized: trimmed, uppercase.
    pub sku: String,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Normalize a SKU the same way the import engine does.
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sku() {
        assert_eq!(normalize_sku("  abc-1 "), "ABC-1");
        assert_eq!(normalize_sku("ABC-1"), "ABC-1");
    }
}
