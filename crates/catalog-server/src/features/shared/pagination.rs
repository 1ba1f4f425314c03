//! Shared pagination utilities
//!
//! Common request parameters and response metadata for list queries.
//! Defaults: page 1, 20 items per page, clamped to 1-100.

use serde::{Deserialize, Serialize};

/// Pagination request parameters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    /// Items per page. Defaults to 20, clamped to 1-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// Page number (1-indexed), defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Items per page, defaulting to 20 and clamped to 1-100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// Offset for the SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// Pagination metadata attached to list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    pub fn from_params(params: &PaginationParams, total: i64) -> Self {
        Self::new(params.page(), params.per_page(), total)
    }
}

/// Wrapper for paginated list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMetadata,
}

impl<T> Paginated<T> {
    pub fn from_items(items: Vec<T>, params: &PaginationParams, total: i64) -> Self {
        Self {
            items,
            pagination: PaginationMetadata::from_params(params, total),
        }
    }
}
