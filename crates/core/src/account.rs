//! Ad accounts and the ignore list.

use serde::{Deserialize, Serialize};

/// Platform status codes the ad platform reports for operable accounts.
const ACTIVE_STATUS_CODES: [i64; 2] = [1, 201];

/// An ad account as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdAccount {
    #[serde(rename = "account_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "account_status")]
    pub status: i64,
    #[serde(default, rename = "created_time")]
    pub created: String,
}

impl AdAccount {
    /// Accounts outside the platform's operable status codes carry no
    /// campaigns worth reconciling.
    pub fn is_active(&self) -> bool {
        ACTIVE_STATUS_CODES.contains(&self.status)
    }
}

/// An entry on the account ignore list. Ignored accounts are excluded from
/// reconciliation and from account listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredAccount {
    pub account_id: String,
}
