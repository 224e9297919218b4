//! Status-change emission.
//!
//! A satisfied rule produces a [`StatusChange`] that is dispatched
//! fire-and-forget: the evaluation loop never waits on the platform call and
//! the outcome is visible only in logs. The campaign's own status is the
//! repeat protection, so a lost emission is retried naturally on the next
//! automation pass.

use adpilot_core::campaign::Status;
use adpilot_platform::{AdPlatform, PlatformError};
use adpilot_store::repo::CampaignRepo;
use adpilot_store::{KeyValueStore, StoreError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum EmitError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// One requested campaign status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub account_id: String,
    pub campaign_id: String,
    pub status: Status,
}

#[async_trait]
pub trait StatusEmitter: Send + Sync {
    async fn emit(&self, change: StatusChange) -> Result<(), EmitError>;
}

/// Emitter that applies the change on the ad platform and then mirrors it
/// onto the stored campaign record.
pub struct PlatformEmitter {
    platform: Arc<dyn AdPlatform>,
    campaigns: CampaignRepo,
}

impl PlatformEmitter {
    pub fn new(platform: Arc<dyn AdPlatform>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            platform,
            campaigns: CampaignRepo::new(store),
        }
    }
}

#[async_trait]
impl StatusEmitter for PlatformEmitter {
    async fn emit(&self, change: StatusChange) -> Result<(), EmitError> {
        self.platform
            .set_status(&change.campaign_id, change.status)
            .await?;
        self.campaigns
            .set_status(&change.account_id, &change.campaign_id, change.status)
            .await?;
        Ok(())
    }
}

/// Dispatch a change without waiting for it.
///
/// The spawned task logs success or failure and nothing else; callers get no
/// delivery guarantee. Returns the task handle so tests can await it.
pub fn dispatch(
    emitter: Arc<dyn StatusEmitter>,
    change: StatusChange,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let campaign_id = change.campaign_id.clone();
        let status = change.status;
        match emitter.emit(change).await {
            Ok(()) => {
                metrics::counter!("automation.status_changes").increment(1);
                info!(campaign = %campaign_id, %status, "status change emitted");
            }
            Err(e) => {
                metrics::counter!("automation.status_change_failures").increment(1);
                error!(campaign = %campaign_id, %status, error = %e, "status change failed");
            }
        }
    })
}
