//! Storage abstraction layer.
//!
//! All toy and user persistence goes through [`ToyStore`] and [`UserStore`],
//! so handlers and services never know which backend is active.
//!
//! # Backends
//!
//! - [`JsonFileStore`]: the dataset lives in memory and every mutation
//!   rewrites `toy.json` / `user.json` wholesale. Processes sharing one data
//!   directory race each other; the last writer wins.
//! - [`PgDocumentStore`]: toys and users are JSONB documents in PostgreSQL.
//!   Each operation is a single statement, so per-document atomicity comes
//!   from the database. There is no cross-document transaction.
//!
//! Both backends answer list queries with the same [`ToyQuery`] semantics.

mod file;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use file::JsonFileStore;
pub use postgres::PgDocumentStore;

use crate::models::{Message, NewToy, Toy, ToyUpdate, User};
use crate::query::{ToyPage, ToyQuery};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Toy persistence.
#[async_trait]
pub trait ToyStore: Send + Sync {
    /// Run a filtered, sorted, paged query.
    async fn query(&self, query: &ToyQuery) -> StoreResult<ToyPage>;

    /// Every toy, unpaged and unfiltered.
    async fn list(&self) -> StoreResult<Vec<Toy>>;

    /// Load one toy.
    async fn get(&self, id: &str) -> StoreResult<Toy>;

    /// Insert a toy with a fresh id, timestamp and `inStock = true`.
    async fn add(&self, input: NewToy) -> StoreResult<Toy>;

    /// Merge the supplied fields into an existing toy.
    async fn update(&self, update: ToyUpdate) -> StoreResult<Toy>;

    /// Delete a toy.
    async fn remove(&self, id: &str) -> StoreResult<()>;

    /// Append a message to a toy's thread.
    async fn add_message(&self, toy_id: &str, message: Message) -> StoreResult<Message>;

    /// Remove a message from a toy's thread, returning its id.
    async fn remove_message(&self, toy_id: &str, msg_id: &str) -> StoreResult<String>;

    /// Whether the backend is reachable.
    async fn healthy(&self) -> bool;

    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// User account persistence.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    /// Insert a user. Fails with [`StoreError::Conflict`] if the username is taken.
    async fn create(&self, user: User) -> StoreResult<User>;
}
