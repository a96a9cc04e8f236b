//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Flat JSON files under `data_dir`.
    File,
    /// JSONB documents in PostgreSQL.
    Postgres,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3030).
    pub port: u16,

    /// Storage backend: "file" (default) or "postgres".
    pub store_backend: StoreBackend,

    /// Directory holding `toy.json` and `user.json` (default: ./data).
    pub data_dir: PathBuf,

    /// PostgreSQL connection URL. Required when the backend is postgres.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Directory of the bundled frontend (default: ./public).
    pub static_dir: PathBuf,

    /// CORS allowed origins (comma-separated, default: local dev servers).
    pub cors_allowed_origins: Vec<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "lax").
    pub cookie_same_site: String,

    /// Send the login cookie over HTTPS only (default: false).
    pub cookie_secure: bool,
}

/// Origins of the local frontend dev servers.
const DEV_ORIGINS: &[&str] = &[
    "http://127.0.0.1:3000",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://localhost:5173",
    "http://127.0.0.1:5174",
    "http://localhost:5174",
];

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3030".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StoreBackend::File,
            "postgres" => StoreBackend::Postgres,
            other => bail!("STORE_BACKEND must be \"file\" or \"postgres\", got {other:?}"),
        };

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL environment variable is required for the postgres backend");
        }

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./public"));

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| DEV_ORIGINS.iter().map(|s| s.to_string()).collect());

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_lowercase();

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            store_backend,
            data_dir,
            database_url,
            database_max_connections,
            static_dir,
            cors_allowed_origins,
            cookie_same_site,
            cookie_secure,
        })
    }

    /// A file-backed configuration rooted at `data_dir`, used by tests and tools.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 3030,
            store_backend: StoreBackend::File,
            data_dir: data_dir.into(),
            database_url: None,
            database_max_connections: 10,
            static_dir: PathBuf::from("./public"),
            cors_allowed_origins: DEV_ORIGINS.iter().map(|s| s.to_string()).collect(),
            cookie_same_site: "lax".to_string(),
            cookie_secure: false,
        }
    }
}
