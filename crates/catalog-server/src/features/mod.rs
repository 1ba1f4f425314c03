//! Feature modules implementing the catalog API
//!
//! Each feature is a vertical slice following the CQRS pattern, with its own
//! commands (write operations), queries (read operations), and routes:
//!
//! - **imports**: bulk import intake, progress observation, cancellation
//! - **products**: product CRUD, listing/search, stats
//! - **webhooks**: webhook CRUD and test delivery
//!
//! Handlers are standalone async functions; routes call them directly.

pub mod imports;
pub mod products;
pub mod shared;
pub mod webhooks;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use crate::config::ImportConfig;
use crate::import::notify::WebhookDispatcher;
use crate::import::progress::ImportRegistry;
use crate::import::worker::ImportQueue;

/// State for the import feature routes
#[derive(Clone)]
pub struct ImportState {
    pub registry: Arc<ImportRegistry>,
    pub queue: ImportQueue,
    pub config: ImportConfig,
}

/// State for the webhook feature routes
#[derive(Clone)]
pub struct WebhookState {
    pub db: PgPool,
    pub dispatcher: Arc<WebhookDispatcher>,
}

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub db: PgPool,
    pub imports: ImportState,
    pub webhooks: WebhookState,
}

/// Creates the main API router with all feature routes mounted
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/imports", imports::imports_routes().with_state(state.imports))
        .nest("/products", products::products_routes().with_state(state.db))
        .nest("/webhooks", webhooks::webhooks_routes().with_state(state.webhooks))
}
