//! Graph API HTTP client.
//!
//! The platform paginates every collection endpoint with `paging.next`
//! cursors; [`GraphClient`] follows the cursor chain and returns the merged
//! `data` pages. Connect-level failures are retried with linear backoff
//! (attempt number times one second) up to a bounded attempt count; HTTP
//! error statuses and decode failures propagate immediately.

use crate::{AdPlatform, Insight, PlatformError};
use adpilot_core::account::AdAccount;
use adpilot_core::campaign::{Campaign, Status};
use adpilot_core::config::PlatformConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const ACCOUNT_FIELDS: &str = "account_id,account_status,name,created_time";
const CAMPAIGN_FIELDS: &str =
    "id,name,status,daily_budget,budget_remaining,created_time,updated_time";
const INSIGHT_FIELDS: &str = "campaign_id,clicks,impressions,spend,cpc,cpp,cpm,ctr";

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default)]
    data: Vec<T>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Deserialize, Default)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    user_id: String,
    max_attempts: u32,
}

impl GraphClient {
    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            access_token: cfg.access_token.clone(),
            user_id: cfg.user_id.clone(),
            max_attempts: cfg.max_attempts,
        })
    }

    /// Issue one GET, retrying connect-level failures with linear backoff.
    async fn get(&self, url: &str) -> Result<String, PlatformError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.http.get(url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp.text().await?),
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    return Err(PlatformError::Api { status, body });
                }
                Err(err) => {
                    // Only connection establishment is worth waiting out.
                    if !err.is_connect() || attempt >= self.max_attempts {
                        return Err(err.into());
                    }
                    warn!(attempt, error = %err, "platform unreachable, backing off");
                    tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
                }
            }
        }
    }

    /// Fetch a paginated collection, following `paging.next` until exhausted.
    async fn get_all<T: DeserializeOwned + Default>(
        &self,
        first_url: String,
    ) -> Result<Vec<T>, PlatformError> {
        let mut url = first_url;
        let mut out = Vec::new();
        loop {
            let body = self.get(&url).await?;
            let page: Page<T> = serde_json::from_str(&body)?;
            out.extend(page.data);
            match page.paging.and_then(|p| p.next) {
                Some(next) if !next.is_empty() => url = next,
                _ => break,
            }
        }
        debug!(items = out.len(), "fetched paginated collection");
        Ok(out)
    }

    fn collection_url(&self, node: &str, edge: &str, params: &str) -> String {
        format!(
            "{}/{}/{}?{}&access_token={}",
            self.base_url, node, edge, params, self.access_token
        )
    }
}

#[async_trait]
impl AdPlatform for GraphClient {
    async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError> {
        let url = self.collection_url(
            &self.user_id,
            "adaccounts",
            &format!("fields={ACCOUNT_FIELDS}"),
        );
        self.get_all(url).await
    }

    async fn fetch_campaigns(&self, account_id: &str) -> Result<Vec<Campaign>, PlatformError> {
        let url = self.collection_url(
            &format!("act_{account_id}"),
            "campaigns",
            &format!("fields={CAMPAIGN_FIELDS}"),
        );
        let mut campaigns: Vec<Campaign> = self.get_all(url).await?;
        // Payloads carry no owning account; stamp it here.
        for c in &mut campaigns {
            c.account_id = account_id.to_string();
        }
        Ok(campaigns)
    }

    async fn fetch_insights(&self, account_id: &str) -> Result<Vec<Insight>, PlatformError> {
        let url = self.collection_url(
            &format!("act_{account_id}"),
            "insights",
            &format!("level=campaign&date_preset=today&fields={INSIGHT_FIELDS}"),
        );
        self.get_all(url).await
    }

    async fn set_status(&self, campaign_id: &str, status: Status) -> Result<(), PlatformError> {
        let url = format!(
            "{}/{}?status={}&access_token={}",
            self.base_url,
            campaign_id,
            status.as_str(),
            self.access_token
        );
        let resp = self.http.post(&url).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            Err(PlatformError::Api { status, body })
        }
    }
}
