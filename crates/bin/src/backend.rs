//! Backend creation and utility functions.

use std::path::PathBuf;

use docshare::{
    Instance,
    backend::{
        BackendImpl,
        database::{InMemory, Postgres, Sqlite},
    },
};

use crate::cli::{Backend, BackendConfig, StorageArgs};

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Resolve the PostgreSQL URL from either the full URL or its parts.
///
/// Every part except the port is required when no URL is given.
pub fn postgres_url(config: &BackendConfig) -> Result<String, String> {
    if let Some(url) = &config.postgres_url {
        return Ok(url.clone());
    }

    let mut missing = Vec::new();
    if config.db_user.is_none() {
        missing.push("--db-user");
    }
    if config.db_password.is_none() {
        missing.push("--db-password");
    }
    if config.db_host.is_none() {
        missing.push("--db-host");
    }
    if config.db_name.is_none() {
        missing.push("--db-name");
    }
    let (Some(user), Some(password), Some(host), Some(name)) = (
        config.db_user.as_deref(),
        config.db_password.as_deref(),
        config.db_host.as_deref(),
        config.db_name.as_deref(),
    ) else {
        return Err(format!(
            "PostgreSQL backend requires --postgres-url or all of {}",
            missing.join(", ")
        ));
    };

    let mut url = url::Url::parse("postgres://localhost")
        .map_err(|e| format!("Failed to build PostgreSQL URL: {e}"))?;
    url.set_host(Some(host))
        .map_err(|e| format!("Invalid database host '{host}': {e}"))?;
    url.set_username(user)
        .map_err(|_| "Invalid database user".to_string())?;
    url.set_password(Some(password))
        .map_err(|_| "Invalid database password".to_string())?;
    url.set_port(Some(config.db_port.unwrap_or(5432)))
        .map_err(|_| "Invalid database port".to_string())?;
    url.set_path(name);
    Ok(url.to_string())
}

/// Create the appropriate backend based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<Box<dyn BackendImpl>, Box<dyn std::error::Error>> {
    match config.backend {
        Backend::Sqlite => {
            let data_dir = config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
            tokio::fs::create_dir_all(&data_dir).await?;

            let db_path = data_dir.join("docshare.db");
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Box::new(Sqlite::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = postgres_url(config)?;
            let display_url = redact_postgres_url(&url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect(&url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Box::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            tracing::warn!("Using in-memory backend; accounts and upload records are lost on exit");
            Ok(Box::new(InMemory::new()))
        }
    }
}

/// Open an Instance over the configured backend and upload root.
pub async fn open_instance(storage: &StorageArgs) -> Result<Instance, Box<dyn std::error::Error>> {
    let backend = create_backend(&storage.backend_config).await?;
    Ok(Instance::open(backend, &storage.upload_dir).await?)
}
