//! Offline platform stub for development mode.
//!
//! Used when no access token is configured. Reads return empty collections
//! and status changes only log, so the rest of the system can be exercised
//! against seeded storage without platform credentials.

use crate::{AdPlatform, Insight, PlatformError};
use adpilot_core::account::AdAccount;
use adpilot_core::campaign::{Campaign, Status};
use async_trait::async_trait;
use tracing::info;

pub struct OfflinePlatform;

#[async_trait]
impl AdPlatform for OfflinePlatform {
    async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError> {
        Ok(Vec::new())
    }

    async fn fetch_campaigns(&self, _account_id: &str) -> Result<Vec<Campaign>, PlatformError> {
        Ok(Vec::new())
    }

    async fn fetch_insights(&self, _account_id: &str) -> Result<Vec<Insight>, PlatformError> {
        Ok(Vec::new())
    }

    async fn set_status(&self, campaign_id: &str, status: Status) -> Result<(), PlatformError> {
        info!(campaign = %campaign_id, %status, "offline mode, status change dropped");
        Ok(())
    }
}
