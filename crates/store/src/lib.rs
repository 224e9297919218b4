//! Key/value storage collaborator.
//!
//! The backing store is modeled as a table-oriented key/value service with a
//! fixed 25-item cap per batch request. [`MemoryStore`] is the DashMap-backed
//! implementation used in development and tests; production deployments swap
//! in a client for the real backend behind the same [`KeyValueStore`] trait.

pub mod batch;
pub mod memory;
pub mod repo;
pub mod tables;

use async_trait::async_trait;
use thiserror::Error;

pub use batch::{write_all, BatchWriteError, ChunkFailure};
pub use memory::MemoryStore;
pub use tables::TableDef;

/// Fixed per-request item cap of the storage backend.
pub const MAX_BATCH_ITEMS: usize = 25;

/// Untyped stored record.
pub type Record = serde_json::Value;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("batch request of {0} items exceeds the {MAX_BATCH_ITEMS}-item cap")]
    RequestTooLarge(usize),

    #[error("record is missing key field '{0}'")]
    MissingKey(&'static str),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Primary key of a stored record: partition key plus optional sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub partition: String,
    pub sort: Option<String>,
}

impl Key {
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: None,
        }
    }

    pub fn with_sort(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            sort: Some(sort.into()),
        }
    }
}

/// Read/write surface of the storage backend.
///
/// `batch_put` and `batch_get` mirror the backend's request shape: a single
/// request carries at most [`MAX_BATCH_ITEMS`] items and is not atomic with
/// respect to any other request. Callers that need to persist larger sets go
/// through [`batch::write_all`], which chunks and isolates failures.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, table: &TableDef, key: &Key) -> Result<Option<Record>, StoreError>;

    async fn scan(&self, table: &TableDef) -> Result<Vec<Record>, StoreError>;

    /// All records sharing a partition key.
    async fn query(&self, table: &TableDef, partition: &str) -> Result<Vec<Record>, StoreError>;

    /// At most [`MAX_BATCH_ITEMS`] keys; missing keys are silently absent
    /// from the result.
    async fn batch_get(&self, table: &TableDef, keys: &[Key]) -> Result<Vec<Record>, StoreError>;

    /// At most [`MAX_BATCH_ITEMS`] records per call.
    async fn batch_put(&self, table: &TableDef, records: &[Record]) -> Result<(), StoreError>;

    async fn put(&self, table: &TableDef, record: Record) -> Result<(), StoreError>;

    /// Overwrite a single field of an existing record.
    async fn update_field(
        &self,
        table: &TableDef,
        key: &Key,
        field: &str,
        value: Record,
    ) -> Result<(), StoreError>;

    async fn delete(&self, table: &TableDef, key: &Key) -> Result<(), StoreError>;
}
