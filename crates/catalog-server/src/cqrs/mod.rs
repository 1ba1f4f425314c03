//! CQRS marker traits
//!
//! Commands are write operations (create, update, delete, import intake);
//! queries are read operations. Handlers are standalone async functions in
//! each feature module; the markers keep the split explicit.

/// Marker trait for write operations
pub trait Command {}

/// Marker trait for read operations
pub trait Query {}
