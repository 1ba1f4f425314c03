//! Catalog Server - Main entry point

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use catalog_common::logging::{init_logging, LogConfig};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use catalog_server::{
    config::Config,
    error::AppError,
    features::{self, FeatureState, ImportState, WebhookState},
    import::{notify::WebhookDispatcher, pipeline::ImportPipeline, progress::ImportRegistry, worker},
    middleware,
};

/// Application state shared across top-level handlers
#[derive(Clone)]
struct AppState {
    db: sqlx::PgPool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("catalog-server".to_string())
        .filter_directives("catalog_server=debug,tower_http=debug,sqlx=info".to_string())
        .build();

    // Environment variables take precedence over the built-in defaults
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting Catalog Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // Import engine: task registry, webhook dispatcher, pipeline, and the
    // bounded worker pool that runs queued imports in the background.
    let registry = Arc::new(ImportRegistry::new());
    let dispatcher = Arc::new(WebhookDispatcher::new(db_pool.clone(), &config.webhook));
    let pipeline = Arc::new(ImportPipeline::new(
        db_pool.clone(),
        registry.clone(),
        dispatcher.clone(),
        &config.import,
    ));
    let queue = worker::spawn_workers(pipeline, config.import.workers, config.import.queue_depth);
    info!(
        workers = config.import.workers,
        queue_depth = config.import.queue_depth,
        batch_size = config.import.batch_size,
        "Import worker pool started"
    );

    // Create application state
    let state = AppState {
        db: db_pool.clone(),
    };
    let feature_state = FeatureState {
        db: db_pool.clone(),
        imports: ImportState {
            registry,
            queue,
            config: config.import.clone(),
        },
        webhooks: WebhookState {
            db: db_pool,
            dispatcher,
        },
    };

    // Build the application router
    let app = create_router(state, feature_state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, feature_state: FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(feature_state);

    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .with_state(state)
        .nest("/api/v1", feature_routes)
        // Apply layers from innermost to outermost
        .layer(DefaultBodyLimit::max(config.import.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}

/// Get platform statistics
async fn get_stats(State(state): State<AppState>) -> Result<Response, AppError> {
    let products = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
        .fetch_one(&state.db);
    let webhooks = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM webhooks")
        .fetch_one(&state.db);

    let (products, webhooks) = tokio::try_join!(products, webhooks)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "products": products,
            "webhooks": webhooks
        })),
    )
        .into_response())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give in-flight requests and running imports a moment to finish
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
