//! In-memory store backed by DashMap.
//!
//! Provides the same API surface as the production backend for development
//! and testing, including the 25-item batch cap and a failure hook for
//! exercising partial batch-write behavior.

use crate::{tables, Key, KeyValueStore, Record, StoreError, TableDef, MAX_BATCH_ITEMS};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;

pub struct MemoryStore {
    tables: DashMap<&'static str, DashMap<String, Record>>,
    /// 1-based indices of batch_put calls that should fail, for tests.
    fail_batches: Mutex<Vec<usize>>,
    batch_calls: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self {
            tables: DashMap::new(),
            fail_batches: Mutex::new(Vec::new()),
            batch_calls: Mutex::new(0),
        };
        for t in tables::ALL {
            store.tables.insert(t.name, DashMap::new());
        }
        info!("memory store initialized (development mode)");
        store
    }

    /// Make the n-th (1-based) subsequent `batch_put` call fail.
    pub fn fail_batch_calls(&self, calls: &[usize]) {
        *self.fail_batches.lock() = calls.to_vec();
        *self.batch_calls.lock() = 0;
    }

    /// Number of `batch_put` calls issued so far.
    pub fn batch_call_count(&self) -> usize {
        *self.batch_calls.lock()
    }

    fn composite(table: &TableDef, record: &Record) -> Result<String, StoreError> {
        let partition = record
            .get(table.partition_key)
            .and_then(|v| v.as_str())
            .ok_or(StoreError::MissingKey(table.partition_key))?;
        match table.sort_key {
            None => Ok(partition.to_string()),
            Some(sort_field) => {
                let sort = record
                    .get(sort_field)
                    .and_then(|v| v.as_str())
                    .ok_or(StoreError::MissingKey(sort_field))?;
                Ok(format!("{partition}\u{0}{sort}"))
            }
        }
    }

    fn composite_key(key: &Key) -> String {
        match &key.sort {
            None => key.partition.clone(),
            Some(sort) => format!("{}\u{0}{}", key.partition, sort),
        }
    }

    fn table(&self, table: &TableDef) -> Result<dashmap::mapref::one::Ref<'_, &'static str, DashMap<String, Record>>, StoreError> {
        self.tables
            .get(table.name)
            .ok_or_else(|| StoreError::UnknownTable(table.name.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: &TableDef, key: &Key) -> Result<Option<Record>, StoreError> {
        let t = self.table(table)?;
        Ok(t.get(&Self::composite_key(key)).map(|r| r.value().clone()))
    }

    async fn scan(&self, table: &TableDef) -> Result<Vec<Record>, StoreError> {
        let t = self.table(table)?;
        Ok(t.iter().map(|r| r.value().clone()).collect())
    }

    async fn query(&self, table: &TableDef, partition: &str) -> Result<Vec<Record>, StoreError> {
        let t = self.table(table)?;
        let wanted = serde_json::Value::from(partition);
        Ok(t.iter()
            .filter(|r| r.value().get(table.partition_key) == Some(&wanted))
            .map(|r| r.value().clone())
            .collect())
    }

    async fn batch_get(&self, table: &TableDef, keys: &[Key]) -> Result<Vec<Record>, StoreError> {
        if keys.len() > MAX_BATCH_ITEMS {
            return Err(StoreError::RequestTooLarge(keys.len()));
        }
        let t = self.table(table)?;
        Ok(keys
            .iter()
            .filter_map(|k| t.get(&Self::composite_key(k)).map(|r| r.value().clone()))
            .collect())
    }

    async fn batch_put(&self, table: &TableDef, records: &[Record]) -> Result<(), StoreError> {
        if records.len() > MAX_BATCH_ITEMS {
            return Err(StoreError::RequestTooLarge(records.len()));
        }

        let call = {
            let mut calls = self.batch_calls.lock();
            *calls += 1;
            *calls
        };
        if self.fail_batches.lock().contains(&call) {
            return Err(StoreError::Backend(format!(
                "injected failure on batch call {call}"
            )));
        }

        let t = self.table(table)?;
        for record in records {
            let key = Self::composite(table, record)?;
            t.insert(key, record.clone());
        }
        Ok(())
    }

    async fn put(&self, table: &TableDef, record: Record) -> Result<(), StoreError> {
        let t = self.table(table)?;
        let key = Self::composite(table, &record)?;
        t.insert(key, record);
        Ok(())
    }

    async fn update_field(
        &self,
        table: &TableDef,
        key: &Key,
        field: &str,
        value: Record,
    ) -> Result<(), StoreError> {
        let t = self.table(table)?;
        let result = match t.get_mut(&Self::composite_key(key)) {
            Some(mut entry) => {
                entry.value_mut()[field] = value;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "no record for key {} in {}",
                key.partition, table.name
            ))),
        };
        result
    }

    async fn delete(&self, table: &TableDef, key: &Key) -> Result<(), StoreError> {
        let t = self.table(table)?;
        t.remove(&Self::composite_key(key));
        Ok(())
    }
}
