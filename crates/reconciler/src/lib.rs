//! Campaign performance reconciliation pass.
//!
//! One pass enumerates the operable ad accounts, fans out per account to
//! fetch campaigns and delivery metrics, joins the result against both
//! revenue feeds, and persists the reconciled campaigns through chunked
//! batch writes. Per-account and per-chunk failures are logged and isolated;
//! only failing to enumerate accounts aborts the pass.

pub mod merge;

use adpilot_core::campaign::Campaign;
use adpilot_platform::{AdPlatform, PlatformError};
use adpilot_store::repo::{AccountRepo, CampaignRepo, RevenueRepo};
use adpilot_store::{KeyValueStore, StoreError};
use merge::Source;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassSummary {
    /// Operable accounts the pass fanned out over.
    pub accounts: usize,
    /// Campaigns collected across all accounts.
    pub campaigns: usize,
    /// Campaigns matched by the platform-keyed feed.
    pub matched_platform: usize,
    /// Campaigns matched by the correlation-keyed feed.
    pub matched_tracked: usize,
    /// Campaigns with no feed match, prior performance carried forward.
    pub carried: usize,
    /// Campaigns that actually landed in storage.
    pub written: usize,
}

pub struct Reconciler {
    platform: Arc<dyn AdPlatform>,
    store: Arc<dyn KeyValueStore>,
    max_fanout: usize,
}

impl Reconciler {
    pub fn new(
        platform: Arc<dyn AdPlatform>,
        store: Arc<dyn KeyValueStore>,
        max_fanout: usize,
    ) -> Self {
        Self {
            platform,
            store,
            max_fanout: max_fanout.max(1),
        }
    }

    /// Run one full reconciliation pass.
    ///
    /// Returns `Err` only when account enumeration fails; everything past
    /// that point degrades per item and the pass still reports a summary.
    pub async fn run(&self) -> Result<PassSummary, ReconcileError> {
        let accounts = self.platform.fetch_accounts().await?;
        let account_repo = AccountRepo::new(self.store.clone());
        if let Err(e) = account_repo.put_all(&accounts).await {
            warn!(error = %e, "account snapshot write failed");
        }

        let ignored = account_repo.ignored().await?;
        let eligible: Vec<_> = accounts
            .into_iter()
            .filter(|a| a.is_active() && !ignored.contains(&a.id))
            .collect();

        let mut summary = PassSummary {
            accounts: eligible.len(),
            ..Default::default()
        };

        let mut campaigns = self.collect_campaigns(&eligible).await;
        summary.campaigns = campaigns.len();

        let prior = self.prior_performance(&eligible).await;

        let revenue_repo = RevenueRepo::new(self.store.clone());
        let ids: Vec<String> = campaigns.iter().map(|c| c.id.clone()).collect();
        let utms: Vec<String> = campaigns.iter().map(|c| c.utm.clone()).collect();
        let by_id = revenue_repo.platform_by_ids(&ids).await;
        let by_utm = revenue_repo.tracked_by_utms(&utms).await;

        for campaign in &mut campaigns {
            let platform_rec = by_id.get(campaign.id.as_str());
            let tracked_rec = by_utm.get(campaign.utm.as_str());
            let prior_rec = prior.get(&(campaign.account_id.clone(), campaign.id.clone()));
            let source = merge::reconcile(campaign, platform_rec, tracked_rec, prior_rec);
            match source {
                Source::Platform => summary.matched_platform += 1,
                Source::Tracked => summary.matched_tracked += 1,
                Source::Carried => summary.carried += 1,
            }
        }

        let campaign_repo = CampaignRepo::new(self.store.clone());
        match campaign_repo.put_all(&campaigns).await {
            Ok(written) => summary.written = written,
            Err(e) => {
                // Succeeded chunks stay; the pass itself still completes.
                error!(error = %e, written = e.written, "batch persistence incomplete");
                summary.written = e.written;
            }
        }

        metrics::counter!("reconcile.passes").increment(1);
        metrics::counter!("reconcile.campaigns").increment(summary.campaigns as u64);
        info!(
            accounts = summary.accounts,
            campaigns = summary.campaigns,
            matched_platform = summary.matched_platform,
            matched_tracked = summary.matched_tracked,
            carried = summary.carried,
            written = summary.written,
            "reconciliation pass complete"
        );
        Ok(summary)
    }

    /// Fan out one fetch task per account, collecting results over a channel.
    ///
    /// A failed account is logged and contributes nothing; its siblings
    /// proceed.
    async fn collect_campaigns(
        &self,
        accounts: &[adpilot_core::account::AdAccount],
    ) -> Vec<Campaign> {
        let permits = Arc::new(Semaphore::new(self.max_fanout));
        let (tx, mut rx) = mpsc::channel::<Vec<Campaign>>(self.max_fanout);
        let mut tasks = JoinSet::new();

        for account in accounts {
            let account_id = account.id.clone();
            let platform = self.platform.clone();
            let permits = permits.clone();
            let tx = tx.clone();
            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return,
                };
                match fetch_account_campaigns(platform.as_ref(), &account_id).await {
                    Ok(batch) => {
                        let _ = tx.send(batch).await;
                    }
                    Err(e) => {
                        warn!(account = %account_id, error = %e, "account fetch failed, skipping");
                    }
                }
            });
        }
        drop(tx);

        let mut out = Vec::new();
        while let Some(batch) = rx.recv().await {
            out.extend(batch);
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "account fetch task panicked");
            }
        }
        out
    }

    /// Previously persisted performance, keyed by `(account_id, id)`.
    async fn prior_performance(
        &self,
        accounts: &[adpilot_core::account::AdAccount],
    ) -> HashMap<(String, String), Campaign> {
        let repo = CampaignRepo::new(self.store.clone());
        let mut prior = HashMap::new();
        for account in accounts {
            match repo.by_account(&account.id).await {
                Ok(stored) => {
                    for c in stored {
                        prior.insert((c.account_id.clone(), c.id.clone()), c);
                    }
                }
                Err(e) => {
                    warn!(account = %account.id, error = %e, "prior campaign read failed");
                }
            }
        }
        prior
    }
}

/// Fetch campaigns and today's insights for one account and merge them.
async fn fetch_account_campaigns(
    platform: &dyn AdPlatform,
    account_id: &str,
) -> Result<Vec<Campaign>, PlatformError> {
    let mut campaigns = platform.fetch_campaigns(account_id).await?;
    let insights = platform.fetch_insights(account_id).await?;
    let by_campaign: HashMap<&str, &adpilot_platform::Insight> = insights
        .iter()
        .map(|i| (i.campaign_id.as_str(), i))
        .collect();

    for campaign in &mut campaigns {
        if let Some(i) = by_campaign.get(campaign.id.as_str()) {
            campaign.clicks = i.clicks.clone();
            campaign.impressions = i.impressions.clone();
            campaign.spend = i.spend.clone();
            campaign.cpc = i.cpc.clone();
            campaign.cpp = i.cpp.clone();
            campaign.cpm = i.cpm.clone();
            campaign.ctr = i.ctr.clone();
        }
        campaign.set_utm();
    }
    Ok(campaigns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpilot_core::account::AdAccount;
    use adpilot_core::campaign::Status;
    use adpilot_platform::Insight;
    use adpilot_store::{tables, MemoryStore};
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Default)]
    struct FakePlatform {
        accounts: Vec<AdAccount>,
        campaigns: HashMap<String, Vec<Campaign>>,
        insights: HashMap<String, Vec<Insight>>,
        failing_accounts: Vec<String>,
    }

    #[async_trait]
    impl AdPlatform for FakePlatform {
        async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError> {
            Ok(self.accounts.clone())
        }

        async fn fetch_campaigns(&self, account_id: &str) -> Result<Vec<Campaign>, PlatformError> {
            if self.failing_accounts.iter().any(|a| a == account_id) {
                return Err(PlatformError::Api {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(self.campaigns.get(account_id).cloned().unwrap_or_default())
        }

        async fn fetch_insights(&self, account_id: &str) -> Result<Vec<Insight>, PlatformError> {
            Ok(self.insights.get(account_id).cloned().unwrap_or_default())
        }

        async fn set_status(&self, _campaign_id: &str, _status: Status) -> Result<(), PlatformError> {
            Ok(())
        }
    }

    fn account(id: &str, status: i64) -> AdAccount {
        AdAccount {
            id: id.into(),
            name: format!("account {id}"),
            status,
            ..Default::default()
        }
    }

    fn campaign(account: &str, id: &str, name: &str) -> Campaign {
        Campaign {
            account_id: account.into(),
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn full_pass_reconciles_and_persists() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        // Type-A record for c1, type-B record for c2's UTM, nothing for c3.
        store
            .put(
                &tables::PLATFORM_REVENUE,
                json!({"id": "c1", "revenue": 40.0, "profit": 15.0, "roi": 60.0}),
            )
            .await
            .unwrap();
        store
            .put(
                &tables::TRACKED_REVENUE,
                json!({"utm": "777001", "revenue": 30.0}),
            )
            .await
            .unwrap();

        let mut platform = FakePlatform {
            accounts: vec![account("a1", 1), account("a2", 2)],
            ..Default::default()
        };
        platform.campaigns.insert(
            "a1".into(),
            vec![
                campaign("a1", "c1", "999001 Alpha"),
                campaign("a1", "c2", "777001 Beta"),
                campaign("a1", "c3", "Gamma no token"),
            ],
        );
        platform.insights.insert(
            "a1".into(),
            vec![Insight {
                campaign_id: "c2".into(),
                spend: "10".into(),
                ..Default::default()
            }],
        );

        let r = Reconciler::new(Arc::new(platform), store.clone(), 4);
        let summary = r.run().await.unwrap();

        // a2 is not operable, so one account fanned out.
        assert_eq!(summary.accounts, 1);
        assert_eq!(summary.campaigns, 3);
        assert_eq!(summary.matched_platform, 1);
        assert_eq!(summary.matched_tracked, 1);
        assert_eq!(summary.carried, 1);
        assert_eq!(summary.written, 3);

        let repo = CampaignRepo::new(store);
        let c1 = repo.get("a1", "c1").await.unwrap().unwrap();
        assert_eq!(c1.revenue, 40.0);
        assert_eq!(c1.roi, 60.0);

        let c2 = repo.get("a1", "c2").await.unwrap().unwrap();
        assert_eq!(c2.revenue, 30.0);
        assert_eq!(c2.profit, 20.0);
        assert_eq!(c2.roi, 200.0);

        // No feed match falls back to the campaign id as UTM.
        let c3 = repo.get("a1", "c3").await.unwrap().unwrap();
        assert_eq!(c3.utm, "c3");
        assert_eq!(c3.revenue, 0.0);
    }

    #[tokio::test]
    async fn failed_account_is_skipped_not_fatal() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let mut platform = FakePlatform {
            accounts: vec![account("good", 1), account("bad", 1)],
            failing_accounts: vec!["bad".into()],
            ..Default::default()
        };
        platform
            .campaigns
            .insert("good".into(), vec![campaign("good", "c1", "482913 Ok")]);

        let r = Reconciler::new(Arc::new(platform), store, 4);
        let summary = r.run().await.unwrap();
        assert_eq!(summary.accounts, 2);
        assert_eq!(summary.campaigns, 1);
    }

    #[tokio::test]
    async fn ignored_accounts_are_excluded() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let account_repo = AccountRepo::new(store.clone());
        account_repo.ignore("a2").await.unwrap();

        let mut platform = FakePlatform {
            accounts: vec![account("a1", 1), account("a2", 1)],
            ..Default::default()
        };
        platform
            .campaigns
            .insert("a1".into(), vec![campaign("a1", "c1", "482913 In")]);
        platform
            .campaigns
            .insert("a2".into(), vec![campaign("a2", "c9", "111111 Out")]);

        let r = Reconciler::new(Arc::new(platform), store.clone(), 4);
        let summary = r.run().await.unwrap();
        assert_eq!(summary.accounts, 1);
        assert_eq!(summary.campaigns, 1);

        let repo = CampaignRepo::new(store);
        assert!(repo.get("a2", "c9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unmatched_campaign_keeps_persisted_performance() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let repo = CampaignRepo::new(store.clone());
        repo.put_all(&[Campaign {
            revenue: 75.0,
            profit: 25.0,
            roi: 50.0,
            ..campaign("a1", "c1", "482913 Seasoned")
        }])
        .await
        .unwrap();

        let mut platform = FakePlatform {
            accounts: vec![account("a1", 1)],
            ..Default::default()
        };
        platform
            .campaigns
            .insert("a1".into(), vec![campaign("a1", "c1", "482913 Seasoned")]);

        let r = Reconciler::new(Arc::new(platform), store.clone(), 4);
        let summary = r.run().await.unwrap();
        assert_eq!(summary.carried, 1);

        let c1 = CampaignRepo::new(store).get("a1", "c1").await.unwrap().unwrap();
        assert_eq!(c1.revenue, 75.0);
        assert_eq!(c1.profit, 25.0);
        assert_eq!(c1.roi, 50.0);
    }

    #[tokio::test]
    async fn failed_write_chunk_still_completes_the_pass() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        // Batch call 1 is the account snapshot; call 2 is the single
        // campaign chunk.
        store.fail_batch_calls(&[2]);

        let mut platform = FakePlatform {
            accounts: vec![account("a1", 1)],
            ..Default::default()
        };
        platform.campaigns.insert(
            "a1".into(),
            vec![
                campaign("a1", "c1", "482913 One"),
                campaign("a1", "c2", "515151 Two"),
            ],
        );

        let r = Reconciler::new(Arc::new(platform), store.clone(), 4);
        let summary = r.run().await.unwrap();

        // The pass reports success with an honest written count.
        assert_eq!(summary.campaigns, 2);
        assert_eq!(summary.written, 0);

        let repo = CampaignRepo::new(store);
        assert!(repo.get("a1", "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn enumeration_failure_aborts_the_pass() {
        struct DownPlatform;

        #[async_trait]
        impl AdPlatform for DownPlatform {
            async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError> {
                Err(PlatformError::Api {
                    status: 503,
                    body: "down".into(),
                })
            }
            async fn fetch_campaigns(&self, _: &str) -> Result<Vec<Campaign>, PlatformError> {
                unreachable!()
            }
            async fn fetch_insights(&self, _: &str) -> Result<Vec<Insight>, PlatformError> {
                unreachable!()
            }
            async fn set_status(&self, _: &str, _: Status) -> Result<(), PlatformError> {
                unreachable!()
            }
        }

        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let r = Reconciler::new(Arc::new(DownPlatform), store, 4);
        assert!(r.run().await.is_err());
    }
}
