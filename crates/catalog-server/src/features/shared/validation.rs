//! Shared validation utilities
//!
//! Common input validation for commands across features.

use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during SKU validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SkuValidationError {
    #[error("SKU is required and cannot be empty")]
    Required,

    #[error("SKU must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

/// Errors that can occur during URL validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("{field_name} URL is invalid: must start with http:// or https://")]
    InvalidFormat { field_name: String },
}

/// Validate a display name: non-empty after trimming, bounded length.
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }
    if name.len() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }
    Ok(())
}

/// Validate a business key: non-empty after trimming, bounded length.
///
/// Case and surrounding whitespace are not validated here; SKUs are
/// normalized (trimmed, uppercased) before storage.
pub fn validate_sku(sku: &str, max_length: usize) -> Result<(), SkuValidationError> {
    if sku.trim().is_empty() {
        return Err(SkuValidationError::Required);
    }
    if sku.len() > max_length {
        return Err(SkuValidationError::TooLong { max_length });
    }
    Ok(())
}

/// Validate a URL field: must start with http:// or https://.
pub fn validate_url(url: &str, field_name: &str) -> Result<(), UrlValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(UrlValidationError::InvalidFormat {
            field_name: field_name.to_string(),
        })
    }
}
