//! Ad platform collaborator.
//!
//! [`AdPlatform`] is the seam between the engines and the external ad
//! platform. [`GraphClient`] is the HTTP implementation against the
//! platform's Graph API; tests substitute their own mock implementations.

pub mod http;
pub mod offline;

use adpilot_core::account::AdAccount;
use adpilot_core::campaign::{Campaign, Status};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use http::GraphClient;
pub use offline::OfflinePlatform;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("platform request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("platform response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Per-campaign delivery metrics for the current day.
///
/// The platform reports every metric as a decimal string; they are carried
/// verbatim onto the campaign record and only parsed at the point of use.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Insight {
    pub campaign_id: String,
    #[serde(default)]
    pub clicks: String,
    #[serde(default)]
    pub impressions: String,
    #[serde(default)]
    pub spend: String,
    #[serde(default)]
    pub cpc: String,
    #[serde(default)]
    pub cpp: String,
    #[serde(default)]
    pub cpm: String,
    #[serde(default)]
    pub ctr: String,
}

/// Read and control surface of the external ad platform.
#[async_trait]
pub trait AdPlatform: Send + Sync {
    /// Every ad account visible to the configured platform user.
    async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError>;

    /// Every campaign under one account, all pages merged.
    async fn fetch_campaigns(&self, account_id: &str) -> Result<Vec<Campaign>, PlatformError>;

    /// Campaign-level delivery metrics for today, all pages merged.
    async fn fetch_insights(&self, account_id: &str) -> Result<Vec<Insight>, PlatformError>;

    /// Change a campaign's delivery status on the platform.
    async fn set_status(&self, campaign_id: &str, status: Status) -> Result<(), PlatformError>;
}
