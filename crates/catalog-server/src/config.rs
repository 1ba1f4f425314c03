//! Configuration management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/catalog";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default number of rows per batch flush.
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 5000;

/// Default number of concurrent import workers.
pub const DEFAULT_IMPORT_WORKERS: usize = 2;

/// Default depth of the pending-import queue.
pub const DEFAULT_IMPORT_QUEUE_DEPTH: usize = 64;

/// Default maximum accepted upload size in bytes (256 MiB).
pub const DEFAULT_IMPORT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Default webhook delivery timeout in seconds.
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 5;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub import: ImportConfig,
    pub webhook: WebhookConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Import engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Rows accumulated before a batch flush.
    pub batch_size: usize,
    /// Background workers processing imports concurrently.
    pub workers: usize,
    /// Pending imports accepted before intake reports the queue full.
    pub queue_depth: usize,
    /// Directory uploads are spooled to before processing.
    pub spool_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("CATALOG_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parsed("CATALOG_PORT").unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parsed("CATALOG_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: env_parsed("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_parsed("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_parsed("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: env_parsed("DATABASE_IDLE_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: env_parsed("CORS_ALLOW_CREDENTIALS").unwrap_or(true),
            },
            import: ImportConfig {
                batch_size: env_parsed("IMPORT_BATCH_SIZE").unwrap_or(DEFAULT_IMPORT_BATCH_SIZE),
                workers: env_parsed("IMPORT_WORKERS").unwrap_or(DEFAULT_IMPORT_WORKERS),
                queue_depth: env_parsed("IMPORT_QUEUE_DEPTH").unwrap_or(DEFAULT_IMPORT_QUEUE_DEPTH),
                spool_dir: std::env::var("IMPORT_SPOOL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| std::env::temp_dir()),
                max_upload_bytes: env_parsed("IMPORT_MAX_UPLOAD_BYTES")
                    .unwrap_or(DEFAULT_IMPORT_MAX_UPLOAD_BYTES),
            },
            webhook: WebhookConfig {
                timeout_secs: env_parsed("WEBHOOK_TIMEOUT_SECS")
                    .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        if self.import.batch_size == 0 {
            anyhow::bail!("Import batch_size must be greater than 0");
        }

        if self.import.workers == 0 {
            anyhow::bail!("Import workers must be greater than 0");
        }

        if self.webhook.timeout_secs == 0 {
            anyhow::bail!("Webhook timeout must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            import: ImportConfig::default(),
            webhook: WebhookConfig {
                timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
            },
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_IMPORT_BATCH_SIZE,
            workers: DEFAULT_IMPORT_WORKERS,
            queue_depth: DEFAULT_IMPORT_QUEUE_DEPTH,
            spool_dir: std::env::temp_dir(),
            max_upload_bytes: DEFAULT_IMPORT_MAX_UPLOAD_BYTES,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.import.batch_size, 5000);
        assert_eq!(config.import.workers, 2);
        assert_eq!(config.webhook.timeout_secs, 5);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut config = Config::default();
        config.import.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.import.workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pool_bounds_rejected() {
        let mut config = Config::default();
        config.database.min_connections = 20;
        config.database.max_connections = 10;
        assert!(config.validate().is_err());
    }
}
