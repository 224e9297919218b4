//! Chunked batch persistence.
//!
//! The backend caps batch requests at 25 items, so larger write sets are
//! partitioned into chunks and issued as independent requests. A failed chunk
//! does not stop later chunks and already-written chunks are never rolled
//! back: a reconciliation pass may persist a partial result, trading
//! atomicity for freshness. Callers get every chunk failure back in one
//! aggregate error after all chunks were attempted.

use crate::{KeyValueStore, Record, StoreError, TableDef, MAX_BATCH_ITEMS};
use tracing::warn;

/// One failed chunk within a [`write_all`] call.
#[derive(Debug)]
pub struct ChunkFailure {
    /// Zero-based chunk index.
    pub chunk: usize,
    /// Number of records in the failed chunk.
    pub items: usize,
    pub source: StoreError,
}

/// Aggregate of every chunk failure in a single [`write_all`] call.
#[derive(Debug)]
pub struct BatchWriteError {
    pub failures: Vec<ChunkFailure>,
    /// Records that did land, across all succeeding chunks.
    pub written: usize,
}

impl std::fmt::Display for BatchWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lines: Vec<String> = self
            .failures
            .iter()
            .map(|c| format!("chunk {} ({} items): {}", c.chunk, c.items, c.source))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

impl std::error::Error for BatchWriteError {}

/// Write `records` to `table` in chunks of at most 25.
///
/// Every chunk is attempted regardless of earlier failures. Returns the
/// number of records written, or a [`BatchWriteError`] carrying each failed
/// chunk once all chunks have been issued.
pub async fn write_all(
    store: &dyn KeyValueStore,
    table: &TableDef,
    records: &[Record],
) -> Result<usize, BatchWriteError> {
    let mut written = 0;
    let mut failures = Vec::new();

    for (index, chunk) in records.chunks(MAX_BATCH_ITEMS).enumerate() {
        match store.batch_put(table, chunk).await {
            Ok(()) => written += chunk.len(),
            Err(source) => {
                warn!(
                    table = table.name,
                    chunk = index,
                    items = chunk.len(),
                    error = %source,
                    "batch write chunk failed"
                );
                failures.push(ChunkFailure {
                    chunk: index,
                    items: chunk.len(),
                    source,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else {
        Err(BatchWriteError { failures, written })
    }
}
