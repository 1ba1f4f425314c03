//! Product management feature
//!
//! CRUD, paginated listing with search, and catalog statistics. Bulk writes
//! go through the import engine, not these endpoints.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::products_routes;
