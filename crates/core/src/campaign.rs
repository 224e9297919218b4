//! Campaign entity and lifecycle status.

use crate::money;
use crate::utm;
use serde::{Deserialize, Serialize};

/// Campaign lifecycle status as the ad platform spells it on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Active,
    Paused,
    Deleted,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "ACTIVE",
            Status::Paused => "PAUSED",
            Status::Deleted => "DELETED",
            Status::Archived => "ARCHIVED",
        }
    }

    /// Parse a wire-format status, rejecting anything outside the four values.
    pub fn parse(s: &str) -> Result<Self, crate::PilotError> {
        match s {
            "ACTIVE" => Ok(Status::Active),
            "PAUSED" => Ok(Status::Paused),
            "DELETED" => Ok(Status::Deleted),
            "ARCHIVED" => Ok(Status::Archived),
            other => Err(crate::PilotError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single ad campaign with its platform metrics and reconciled performance.
///
/// The partition key is `account_id`; `id` is the platform-assigned campaign
/// id. Metric fields arrive from the platform as decimal strings and are kept
/// that way; `spend()` parses on demand. Revenue, profit, and ROI are filled
/// in by the reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Campaign {
    /// Absent in platform payloads; the fetching side stamps it.
    #[serde(default)]
    pub account_id: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub daily_budget: String,
    #[serde(default)]
    pub budget_remaining: String,
    #[serde(default, rename = "created_time")]
    pub created: String,
    /// Updating budgets on the platform does not bump this field.
    #[serde(default, rename = "updated_time")]
    pub updated: String,

    #[serde(default)]
    pub clicks: String,
    #[serde(default)]
    pub impressions: String,
    #[serde(default)]
    pub spend: String,
    /// Average cost per click (all).
    #[serde(default)]
    pub cpc: String,
    /// Average cost to reach 1,000 people. Estimated by the platform.
    #[serde(default)]
    pub cpp: String,
    /// Average cost per 1,000 impressions.
    #[serde(default)]
    pub cpm: String,
    /// Percentage of views that produced a click (all).
    #[serde(default)]
    pub ctr: String,

    /// Correlation key joining this campaign to externally-reported revenue.
    #[serde(default)]
    pub utm: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub profit: f64,
    /// Return on investment as a percentage. Derived, non-authoritative.
    #[serde(default)]
    pub roi: f64,
}

impl Campaign {
    /// Spend parsed to a float; empty or malformed spend counts as zero.
    pub fn spend(&self) -> f64 {
        if self.spend.is_empty() {
            return 0.0;
        }
        self.spend.parse().unwrap_or_else(|_| {
            tracing::trace!(spend = %self.spend, campaign = %self.id, "unparseable spend");
            0.0
        })
    }

    /// Resolve and stamp the correlation key from the campaign name.
    pub fn set_utm(&mut self) {
        self.utm = utm::resolve(&self.name, &self.id);
    }

    /// Display-formatted view of the money and count fields.
    pub fn formatted(&self) -> Formatted {
        Formatted {
            daily_budget: money::usd_str(&self.daily_budget),
            budget_remaining: money::usd_str(&self.budget_remaining),
            clicks: money::int_str(&self.clicks),
            impressions: money::int_str(&self.impressions),
            spend: money::usd(self.spend()),
            cpc: money::usd_str(&self.cpc),
            cpp: money::usd_str(&self.cpp),
            cpm: money::usd_str(&self.cpm),
            ctr: money::percent_str(&self.ctr, 2),
            revenue: money::usd(self.revenue),
            profit: money::usd(self.profit),
            roi: money::percent(self.roi, 0),
        }
    }
}

/// Human-readable projection of a campaign for UI consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formatted {
    pub daily_budget: String,
    pub budget_remaining: String,
    pub clicks: String,
    pub impressions: String,
    pub spend: String,
    pub cpc: String,
    pub cpp: String,
    pub cpm: String,
    pub ctr: String,
    pub revenue: String,
    pub profit: String,
    pub roi: String,
}
