//! Revenue-attribution feed records.
//!
//! Two independently operated feeds deliver revenue on their own schedule;
//! this crate only models their persisted, queryable form. Type A is keyed by
//! the platform campaign id and arrives with revenue, profit, and ROI already
//! computed — authoritative when present. Type B is keyed by the correlation
//! key (UTM) and carries raw revenue plus secondary signals, so profit and ROI
//! are computed locally during reconciliation.

use serde::{Deserialize, Serialize};

/// Platform-keyed revenue record (feed type A).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformRevenue {
    /// Platform campaign id this record is keyed by.
    pub id: String,
    #[serde(default)]
    pub utm: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub profit: f64,
    #[serde(default)]
    pub roi: f64,
}

/// Correlation-keyed revenue record (feed type B).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackedRevenue {
    /// Correlation key this record is keyed by.
    pub utm: String,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub impressions: i64,
    #[serde(default)]
    pub sessions: i64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub page_views: i64,
}
