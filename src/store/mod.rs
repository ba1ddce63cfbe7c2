//! Document storage for workflow collections
//!
//! Every backend implements [`DocumentStore`]. A status change is committed
//! through [`DocumentStore::commit_transition`], which writes the updated
//! document and its history entry as one unit, conditioned on the version the
//! caller read.

pub mod document;
pub mod filter;
pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use document::{history_collection, AuditStamp, Document, DocumentSnapshot, HistoryEntry, DRAFT_STATUS};
pub use filter::ListFilter;
pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {id} not found in {collection}")]
    NotFound { collection: String, id: Uuid },

    #[error("version conflict on {id}: expected {expected}, found {found}")]
    VersionConflict { id: Uuid, expected: u64, found: u64 },

    #[error("document {0} already exists")]
    Duplicate(Uuid),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "database")]
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Storage operations used by the workflow engine
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document; fails with `Duplicate` if the id is taken
    async fn insert(&self, document: &Document) -> Result<(), StoreError>;

    async fn find_one(&self, collection: &str, id: Uuid) -> Result<Option<Document>, StoreError>;

    /// Documents in a collection matching the filter as seen by `viewer`, newest first
    async fn find(
        &self,
        collection: &str,
        filter: &ListFilter,
        viewer: &str,
    ) -> Result<Vec<Document>, StoreError>;

    /// Replace the stored document with `updated` and append `history`, atomically.
    ///
    /// Fails with `VersionConflict` without writing anything when the stored
    /// version is not `expected_version`.
    async fn commit_transition(
        &self,
        expected_version: u64,
        updated: &Document,
        history: &HistoryEntry,
    ) -> Result<(), StoreError>;

    /// History entries for one document, newest first
    async fn history(&self, collection: &str, id: Uuid) -> Result<Vec<HistoryEntry>, StoreError>;
}
