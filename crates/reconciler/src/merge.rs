//! Pure per-campaign reconciliation.
//!
//! Joins one campaign against the two revenue feeds. Feed precedence is
//! fixed: a platform-keyed record is authoritative and adopted verbatim; a
//! correlation-keyed record drives a local profit and ROI computation; with
//! neither, the previously persisted performance is carried forward so a feed
//! gap never erases history. Every input campaign produces a write-ready
//! output.

use adpilot_core::campaign::Campaign;
use adpilot_core::revenue::{PlatformRevenue, TrackedRevenue};

/// Which source supplied the reconciled performance numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Platform-keyed feed record, adopted verbatim.
    Platform,
    /// Correlation-keyed feed record, profit and ROI computed locally.
    Tracked,
    /// Neither feed matched; prior persisted values carried forward.
    Carried,
}

/// ROI as a percentage, with the degenerate spend/revenue cases pinned.
///
/// Zero profit is zero ROI even when both sides are zero. Revenue with no
/// spend is +100; spend with no revenue is -100. Otherwise profit over spend.
pub fn roi(revenue: f64, spend: f64, profit: f64) -> f64 {
    if profit == 0.0 {
        0.0
    } else if spend == 0.0 {
        100.0
    } else if revenue == 0.0 {
        -100.0
    } else {
        profit / spend * 100.0
    }
}

/// Reconcile one campaign in place against its candidate feed records.
pub fn reconcile(
    campaign: &mut Campaign,
    platform: Option<&PlatformRevenue>,
    tracked: Option<&TrackedRevenue>,
    prior: Option<&Campaign>,
) -> Source {
    if let Some(rec) = platform {
        campaign.revenue = rec.revenue;
        campaign.profit = rec.profit;
        campaign.roi = rec.roi;
        return Source::Platform;
    }

    if let Some(rec) = tracked {
        let spend = campaign.spend();
        campaign.revenue = rec.revenue;
        campaign.profit = rec.revenue - spend;
        campaign.roi = roi(rec.revenue, spend, campaign.profit);
        return Source::Tracked;
    }

    if let Some(prev) = prior {
        campaign.revenue = prev.revenue;
        campaign.profit = prev.profit;
        campaign.roi = prev.roi;
    }
    Source::Carried
}
