//! Bulk import feature
//!
//! Intake (multipart upload), progress observation (polling and SSE), and
//! cancellation, all keyed by task identifier.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::imports_routes;
