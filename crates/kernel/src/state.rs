//! Application state shared across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::db;
use crate::services::{AuthService, ToyService};
use crate::store::{JsonFileStore, PgDocumentStore, ToyStore, UserStore};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    toys: ToyService,
    auth: AuthService,

    /// Directory of the bundled frontend.
    static_dir: PathBuf,
}

impl AppState {
    /// Open the configured store and wire the services onto it.
    pub async fn new(config: &Config) -> Result<Self> {
        let (toy_store, user_store): (Arc<dyn ToyStore>, Arc<dyn UserStore>) =
            match config.store_backend {
                StoreBackend::File => {
                    let store = Arc::new(
                        JsonFileStore::open(&config.data_dir)
                            .await
                            .with_context(|| {
                                format!("failed to open data dir {}", config.data_dir.display())
                            })?,
                    );
                    info!(data_dir = %config.data_dir.display(), "using JSON file store");
                    (store.clone() as Arc<dyn ToyStore>, store as Arc<dyn UserStore>)
                }
                StoreBackend::Postgres => {
                    let url = config
                        .database_url
                        .as_deref()
                        .context("DATABASE_URL is required for the postgres backend")?;
                    let pool = db::create_pool(url, config.database_max_connections).await?;
                    let store = Arc::new(PgDocumentStore::new(pool));
                    store
                        .ensure_schema()
                        .await
                        .context("failed to create document tables")?;
                    info!("using PostgreSQL document store");
                    (store.clone() as Arc<dyn ToyStore>, store as Arc<dyn UserStore>)
                }
            };

        Ok(Self::from_stores(toy_store, user_store, &config.static_dir))
    }

    /// Build state over already-open stores.
    pub fn from_stores(
        toy_store: Arc<dyn ToyStore>,
        user_store: Arc<dyn UserStore>,
        static_dir: &Path,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                toys: ToyService::new(toy_store),
                auth: AuthService::new(user_store),
                static_dir: static_dir.to_path_buf(),
            }),
        }
    }

    pub fn toys(&self) -> &ToyService {
        &self.inner.toys
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn static_dir(&self) -> &Path {
        &self.inner.static_dir
    }
}
