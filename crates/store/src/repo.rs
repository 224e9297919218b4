//! Typed repositories over the generic key/value store.
//!
//! Each repository owns the serde boundary for one record type. Malformed
//! persisted items are logged and skipped rather than failing the read;
//! siblings proceed.

use crate::{batch, tables, BatchWriteError, Key, KeyValueStore, Record, StoreError, MAX_BATCH_ITEMS};
use adpilot_core::account::{AdAccount, IgnoredAccount};
use adpilot_core::campaign::{Campaign, Status};
use adpilot_core::revenue::{PlatformRevenue, TrackedRevenue};
use adpilot_core::rule::Rule;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

fn decode_each<T: DeserializeOwned>(table: &'static str, records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|r| match serde_json::from_value(r) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(table, error = %e, "skipping malformed record");
                None
            }
        })
        .collect()
}

fn encode_each<T: Serialize>(items: &[T]) -> Result<Vec<Record>, StoreError> {
    items
        .iter()
        .map(|i| serde_json::to_value(i).map_err(StoreError::from))
        .collect()
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CampaignRepo {
    store: Arc<dyn KeyValueStore>,
}

impl CampaignRepo {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Every campaign under one account.
    pub async fn by_account(&self, account_id: &str) -> Result<Vec<Campaign>, StoreError> {
        let records = self.store.query(&tables::CAMPAIGNS, account_id).await?;
        Ok(decode_each(tables::CAMPAIGNS.name, records))
    }

    /// A specific subset of campaigns under one account, fetched in
    /// 25-key batches.
    pub async fn subset(
        &self,
        account_id: &str,
        campaign_ids: &[String],
    ) -> Result<Vec<Campaign>, StoreError> {
        let keys: Vec<Key> = campaign_ids
            .iter()
            .map(|id| Key::with_sort(account_id, id.clone()))
            .collect();

        let mut out = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(MAX_BATCH_ITEMS) {
            let records = self.store.batch_get(&tables::CAMPAIGNS, chunk).await?;
            out.extend(decode_each::<Campaign>(tables::CAMPAIGNS.name, records));
        }
        Ok(out)
    }

    pub async fn get(&self, account_id: &str, id: &str) -> Result<Option<Campaign>, StoreError> {
        let record = self
            .store
            .get(&tables::CAMPAIGNS, &Key::with_sort(account_id, id))
            .await?;
        Ok(record.and_then(|r| {
            decode_each::<Campaign>(tables::CAMPAIGNS.name, vec![r]).pop()
        }))
    }

    /// Persist a reconciled campaign set through chunked batch writes.
    pub async fn put_all(&self, campaigns: &[Campaign]) -> Result<usize, BatchWriteError> {
        let records = match encode_each(campaigns) {
            Ok(r) => r,
            Err(source) => {
                return Err(BatchWriteError {
                    failures: vec![crate::ChunkFailure {
                        chunk: 0,
                        items: campaigns.len(),
                        source,
                    }],
                    written: 0,
                })
            }
        };
        batch::write_all(self.store.as_ref(), &tables::CAMPAIGNS, &records).await
    }

    /// Overwrite the stored status of one campaign.
    pub async fn set_status(
        &self,
        account_id: &str,
        id: &str,
        status: Status,
    ) -> Result<(), StoreError> {
        self.store
            .update_field(
                &tables::CAMPAIGNS,
                &Key::with_sort(account_id, id),
                "status",
                Record::from(status.as_str()),
            )
            .await
    }
}

// ─── Rules ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RuleRepo {
    store: Arc<dyn KeyValueStore>,
}

impl RuleRepo {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<Rule>, StoreError> {
        let records = self.store.scan(&tables::RULES).await?;
        Ok(decode_each(tables::RULES.name, records))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Rule>, StoreError> {
        let record = self.store.get(&tables::RULES, &Key::new(id)).await?;
        Ok(record.and_then(|r| decode_each::<Rule>(tables::RULES.name, vec![r]).pop()))
    }

    /// Upsert, stamping id and timestamps on first write.
    pub async fn put(&self, rule: &mut Rule) -> Result<(), StoreError> {
        rule.pre_put();
        self.store
            .put(&tables::RULES, serde_json::to_value(&*rule)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(&tables::RULES, &Key::new(id)).await
    }
}

// ─── Revenue feeds ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RevenueRepo {
    store: Arc<dyn KeyValueStore>,
}

impl RevenueRepo {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Type-A records for the given platform campaign ids, keyed by id.
    ///
    /// Lookup failures are logged and treated as "no match": reconciliation
    /// is best-effort per campaign and a feed outage must not block a pass.
    pub async fn platform_by_ids(&self, ids: &[String]) -> HashMap<String, PlatformRevenue> {
        self.lookup::<PlatformRevenue>(&tables::PLATFORM_REVENUE, ids)
            .await
            .into_iter()
            .map(|r| (r.id.clone(), r))
            .collect()
    }

    /// Type-B records for the given correlation keys, keyed by UTM.
    pub async fn tracked_by_utms(&self, utms: &[String]) -> HashMap<String, TrackedRevenue> {
        self.lookup::<TrackedRevenue>(&tables::TRACKED_REVENUE, utms)
            .await
            .into_iter()
            .map(|r| (r.utm.clone(), r))
            .collect()
    }

    async fn lookup<T: DeserializeOwned>(
        &self,
        table: &'static crate::TableDef,
        partitions: &[String],
    ) -> Vec<T> {
        // Dedupe: many campaigns can share a correlation key.
        let unique: HashSet<&String> = partitions.iter().collect();
        let keys: Vec<Key> = unique.into_iter().map(Key::new).collect();

        let mut out = Vec::new();
        for chunk in keys.chunks(MAX_BATCH_ITEMS) {
            match self.store.batch_get(table, chunk).await {
                Ok(records) => out.extend(decode_each::<T>(table.name, records)),
                Err(e) => {
                    warn!(table = table.name, error = %e, "revenue lookup failed, treating as no match");
                }
            }
        }
        out
    }
}

// ─── Accounts ──────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AccountRepo {
    store: Arc<dyn KeyValueStore>,
}

impl AccountRepo {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn all(&self) -> Result<Vec<AdAccount>, StoreError> {
        let records = self.store.scan(&tables::ACCOUNTS).await?;
        Ok(decode_each(tables::ACCOUNTS.name, records))
    }

    pub async fn put_all(&self, accounts: &[AdAccount]) -> Result<usize, BatchWriteError> {
        let records = match encode_each(accounts) {
            Ok(r) => r,
            Err(source) => {
                return Err(BatchWriteError {
                    failures: vec![crate::ChunkFailure {
                        chunk: 0,
                        items: accounts.len(),
                        source,
                    }],
                    written: 0,
                })
            }
        };
        batch::write_all(self.store.as_ref(), &tables::ACCOUNTS, &records).await
    }

    /// Account ids excluded from reconciliation and listings.
    pub async fn ignored(&self) -> Result<HashSet<String>, StoreError> {
        let records = self.store.scan(&tables::IGNORED_ACCOUNTS).await?;
        Ok(decode_each::<IgnoredAccount>(tables::IGNORED_ACCOUNTS.name, records)
            .into_iter()
            .map(|i| i.account_id)
            .collect())
    }

    pub async fn ignore(&self, account_id: &str) -> Result<(), StoreError> {
        let entry = IgnoredAccount {
            account_id: account_id.to_string(),
        };
        self.store
            .put(&tables::IGNORED_ACCOUNTS, serde_json::to_value(entry)?)
            .await
    }

    pub async fn unignore(&self, account_id: &str) -> Result<(), StoreError> {
        self.store
            .delete(&tables::IGNORED_ACCOUNTS, &Key::new(account_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, TableDef};
    use async_trait::async_trait;
    use serde_json::json;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    /// Store whose every operation fails, as if the backend were unreachable.
    struct DownStore;

    impl DownStore {
        fn down() -> StoreError {
            StoreError::Backend("storage offline".into())
        }
    }

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn get(&self, _: &TableDef, _: &Key) -> Result<Option<Record>, StoreError> {
            Err(Self::down())
        }
        async fn scan(&self, _: &TableDef) -> Result<Vec<Record>, StoreError> {
            Err(Self::down())
        }
        async fn query(&self, _: &TableDef, _: &str) -> Result<Vec<Record>, StoreError> {
            Err(Self::down())
        }
        async fn batch_get(&self, _: &TableDef, _: &[Key]) -> Result<Vec<Record>, StoreError> {
            Err(Self::down())
        }
        async fn batch_put(&self, _: &TableDef, _: &[Record]) -> Result<(), StoreError> {
            Err(Self::down())
        }
        async fn put(&self, _: &TableDef, _: Record) -> Result<(), StoreError> {
            Err(Self::down())
        }
        async fn update_field(
            &self,
            _: &TableDef,
            _: &Key,
            _: &str,
            _: Record,
        ) -> Result<(), StoreError> {
            Err(Self::down())
        }
        async fn delete(&self, _: &TableDef, _: &Key) -> Result<(), StoreError> {
            Err(Self::down())
        }
    }

    #[tokio::test]
    async fn campaign_round_trip_and_subset() {
        let s = store();
        let repo = CampaignRepo::new(s);

        let campaigns: Vec<Campaign> = (0..4)
            .map(|i| Campaign {
                account_id: "a1".into(),
                id: format!("c{i}"),
                name: format!("campaign {i}"),
                ..Default::default()
            })
            .collect();
        repo.put_all(&campaigns).await.unwrap();

        let all = repo.by_account("a1").await.unwrap();
        assert_eq!(all.len(), 4);

        let some = repo
            .subset("a1", &["c1".to_string(), "c3".to_string()])
            .await
            .unwrap();
        assert_eq!(some.len(), 2);

        assert!(repo.get("a1", "c2").await.unwrap().is_some());
        assert!(repo.get("a2", "c2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_status_overwrites_field_only() {
        let s = store();
        let repo = CampaignRepo::new(s);
        repo.put_all(&[Campaign {
            account_id: "a1".into(),
            id: "c1".into(),
            name: "keepme".into(),
            ..Default::default()
        }])
        .await
        .unwrap();

        repo.set_status("a1", "c1", Status::Paused).await.unwrap();
        let c = repo.get("a1", "c1").await.unwrap().unwrap();
        assert_eq!(c.status, Status::Paused);
        assert_eq!(c.name, "keepme");
    }

    #[tokio::test]
    async fn malformed_records_are_skipped() {
        let s: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        s.put(&tables::RULES, json!({"id": "ok-shape-but-bad-conditions", "conditions": 42}))
            .await
            .unwrap();
        let mut good = Rule {
            name: "good".into(),
            ..Default::default()
        };
        let repo = RuleRepo::new(s.clone());
        repo.put(&mut good).await.unwrap();

        let rules = repo.all().await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "good");
    }

    #[tokio::test]
    async fn revenue_lookup_dedupes_and_skips_missing_keys() {
        let s: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        s.put(
            &tables::TRACKED_REVENUE,
            json!({"utm": "482913", "revenue": 55.5}),
        )
        .await
        .unwrap();

        let repo = RevenueRepo::new(s.clone());
        let utms: Vec<String> = vec!["482913".into(), "482913".into(), "missing".into()];
        let by_utm = repo.tracked_by_utms(&utms).await;
        assert_eq!(by_utm.len(), 1);
        assert_eq!(by_utm["482913"].revenue, 55.5);
    }

    #[tokio::test]
    async fn revenue_lookup_errors_degrade_to_no_match() {
        // Both feeds read through batch_get; an unreachable backend must
        // come back as "no match", never as a propagated error.
        let repo = RevenueRepo::new(Arc::new(DownStore));

        let by_utm = repo.tracked_by_utms(&["482913".to_string()]).await;
        assert!(by_utm.is_empty());

        let by_id = repo.platform_by_ids(&["c1".to_string()]).await;
        assert!(by_id.is_empty());
    }

    #[tokio::test]
    async fn ignore_list() {
        let s = store();
        let repo = AccountRepo::new(s);
        repo.ignore("413679809716807").await.unwrap();
        repo.ignore("750877365817118").await.unwrap();
        repo.unignore("750877365817118").await.unwrap();

        let ignored = repo.ignored().await.unwrap();
        assert!(ignored.contains("413679809716807"));
        assert!(!ignored.contains("750877365817118"));
        assert_eq!(ignored.len(), 1);
    }
}
