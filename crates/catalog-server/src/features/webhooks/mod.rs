//! Webhook management feature
//!
//! CRUD for registered listeners plus a test endpoint that performs a single
//! delivery attempt and reports the outcome. The dispatcher reads these rows
//! at notification time; nothing here is cached.

pub mod commands;
pub mod queries;
pub mod routes;
pub mod types;

pub use routes::webhooks_routes;
