//! Request and response shapes for the REST API.

use adpilot_core::campaign::{Campaign, Formatted, Status};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    pub account_id: String,
    /// Comma-separated campaign ids; absent means the whole account.
    pub campaign_ids: Option<String>,
}

impl CampaignQuery {
    pub fn ids(&self) -> Option<Vec<String>> {
        let raw = self.campaign_ids.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(
            raw.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

/// Campaign plus its display projection, for UI listings.
#[derive(Debug, Serialize)]
pub struct CampaignView {
    pub account_id: String,
    pub id: String,
    pub name: String,
    pub status: Status,
    pub display: Formatted,
}

impl From<Campaign> for CampaignView {
    fn from(c: Campaign) -> Self {
        let display = c.formatted();
        Self {
            account_id: c.account_id,
            id: c.id,
            name: c.name,
            status: c.status,
            display,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub account_id: String,
    pub campaign_id: String,
    /// Wire-format status, e.g. `PAUSED`.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn campaign_ids_parse() {
        let q = CampaignQuery {
            account_id: "a1".into(),
            campaign_ids: Some("c1, c2 ,,c3".into()),
        };
        assert_eq!(q.ids().unwrap(), vec!["c1", "c2", "c3"]);

        let whole = CampaignQuery {
            account_id: "a1".into(),
            campaign_ids: Some("  ".into()),
        };
        assert!(whole.ids().is_none());
    }
}
