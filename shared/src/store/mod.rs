//! Document store abstraction.
//!
//! Documents live in collections that enforce uniqueness of a natural key.
//! Two backends are provided:
//!
//! - [`PgDocumentStore`]: PostgreSQL tables with a unique constraint per key
//! - [`MemoryCollection`]: in-memory collection for tests and local runs

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DayRecord, ScheduleDocument};

pub mod memory;
pub mod postgres;

pub use memory::MemoryCollection;
pub use postgres::PgDocumentStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Insert rejected because a document with the same key exists
    #[error("{collection}: duplicate key '{key}'")]
    DuplicateKey { collection: &'static str, key: String },

    /// Replace targeted a key with no stored document
    #[error("{collection}: no document with key '{key}'")]
    NotFound { collection: &'static str, key: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// A document persisted under a natural key.
pub trait Document: Clone + Send + Sync + 'static {
    /// Collection the document belongs to.
    const COLLECTION: &'static str;

    /// Natural key, unique within the collection.
    fn natural_key(&self) -> &str;
}

impl Document for DayRecord {
    const COLLECTION: &'static str = "days";

    fn natural_key(&self) -> &str {
        &self.date
    }
}

impl Document for ScheduleDocument {
    const COLLECTION: &'static str = "schedules";

    fn natural_key(&self) -> &str {
        &self.name
    }
}

/// Keyed collection of documents.
#[async_trait]
pub trait Collection<D: Document>: Send + Sync {
    /// Insert a new document, failing with [`StoreError::DuplicateKey`] if its key exists.
    async fn insert_one(&self, doc: &D) -> StoreResult<()>;

    /// Replace the document stored under `key`, keeping its identity.
    async fn find_one_and_replace(&self, key: &str, doc: &D) -> StoreResult<()>;

    /// Fetch the document stored under `key`.
    async fn find_one(&self, key: &str) -> StoreResult<Option<D>>;
}
