//! Record normalization
//!
//! Pure validation of raw CSV rows against the required-field schema. No
//! side effects, no I/O: a row either becomes a [`NormalizedRecord`] or a
//! [`RejectReason`].
//!
//! The business key is uppercased here; this single normalization step is
//! what makes SKU matching case-insensitive everywhere downstream (the
//! deduplicator and the unique index both operate on the normalized form).

use csv_async::StringRecord;

use super::types::RejectReason;

/// Required column holding the product name.
pub const COLUMN_NAME: &str = "name";

/// Required column holding the business key.
pub const COLUMN_SKU: &str = "sku";

/// Optional column holding the product description.
pub const COLUMN_DESCRIPTION: &str = "description";

/// A validated, normalized product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub name: String,
    /// Trimmed and uppercased.
    pub sku: String,
    pub description: String,
    pub active: bool,
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Default)]
pub struct RowSchema {
    name: Option<usize>,
    sku: Option<usize>,
    description: Option<usize>,
}

impl RowSchema {
    /// Resolve column positions from the header row.
    ///
    /// Header matching is case-insensitive and tolerant of surrounding
    /// whitespace; the first matching column wins.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut schema = Self::default();
        for (idx, column) in headers.iter().enumerate() {
            match column.trim().to_ascii_lowercase().as_str() {
                "name" if schema.name.is_none() => schema.name = Some(idx),
                "sku" if schema.sku.is_none() => schema.sku = Some(idx),
                "description" if schema.description.is_none() => {
                    schema.description = Some(idx)
                },
                _ => {},
            }
        }
        schema
    }

    /// Normalize a data row against the resolved schema.
    pub fn normalize(&self, record: &StringRecord) -> Result<NormalizedRecord, RejectReason> {
        let name = self
            .name
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RejectReason::missing_field(COLUMN_NAME))?;

        let sku = match self.sku.and_then(|idx| record.get(idx)) {
            None => return Err(RejectReason::missing_field(COLUMN_SKU)),
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(RejectReason::EmptyBusinessKey);
                }
                trimmed.to_uppercase()
            },
        };

        let description = self
            .description
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(NormalizedRecord {
            name: name.to_string(),
            sku,
            description,
            active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: Vec<&str>) -> StringRecord {
        fields.into_iter().collect()
    }

    fn schema(headers: Vec<&str>) -> RowSchema {
        RowSchema::from_headers(&record(headers))
    }

    #[test]
    fn test_normalize_trims_and_uppercases() {
        let schema = schema(vec!["name", "sku", "description"]);
        let normalized = schema
            .normalize(&record(vec!["  Widget  ", " abc-1 ", "  A widget. "]))
            .unwrap();

        assert_eq!(normalized.name, "Widget");
        assert_eq!(normalized.sku, "ABC-1");
        assert_eq!(normalized.description, "A widget.");
        assert!(normalized.active);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let schema = schema(vec![" Name", "SKU", "Description "]);
        let normalized = schema
            .normalize(&record(vec!["Widget", "w-1", "desc"]))
            .unwrap();

        assert_eq!(normalized.sku, "W-1");
    }

    #[test]
    fn test_description_is_optional() {
        let schema = schema(vec!["name", "sku"]);
        let normalized = schema.normalize(&record(vec!["Widget", "w-1"])).unwrap();

        assert_eq!(normalized.description, "");
    }

    #[test]
    fn test_missing_name_column() {
        let schema = schema(vec!["sku", "description"]);
        let rejected = schema
            .normalize(&record(vec!["w-1", "desc"]))
            .unwrap_err();

        assert_eq!(rejected, RejectReason::missing_field("name"));
    }

    #[test]
    fn test_blank_name_value() {
        let schema = schema(vec!["name", "sku"]);
        let rejected = schema.normalize(&record(vec!["   ", "w-1"])).unwrap_err();

        assert_eq!(rejected, RejectReason::missing_field("name"));
    }

    #[test]
    fn test_missing_sku_column() {
        let schema = schema(vec!["name", "description"]);
        let rejected = schema
            .normalize(&record(vec!["Widget", "desc"]))
            .unwrap_err();

        assert_eq!(rejected, RejectReason::missing_field("sku"));
    }

    #[test]
    fn test_short_row_missing_sku_field() {
        let schema = schema(vec!["name", "sku"]);
        let rejected = schema.normalize(&record(vec!["Widget"])).unwrap_err();

        assert_eq!(rejected, RejectReason::missing_field("sku"));
    }

    #[test]
    fn test_blank_sku_is_empty_business_key() {
        let schema = schema(vec!["name", "sku"]);
        let rejected = schema.normalize(&record(vec!["Widget", "  "])).unwrap_err();

        assert_eq!(rejected, RejectReason::EmptyBusinessKey);
    }
}
