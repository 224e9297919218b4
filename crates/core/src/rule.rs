//! Automation rules and their threshold conditions.

use crate::campaign::{Campaign, Status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A user-authored automation rule.
///
/// When every condition holds for a campaign in scope, the controller applies
/// `effect` to that campaign. A rule with zero conditions is valid and always
/// satisfied. The controller never mutates rules; they change only through
/// direct user action.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Rule {
    /// Generated unique identifier and partition key.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Inactive rules are skipped by batch automation passes.
    #[serde(default)]
    pub active: bool,
    /// Evaluated in order with AND semantics.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Target campaign status applied when the rule is satisfied.
    #[serde(default)]
    pub effect: Status,
    /// Account id -> campaign ids. An empty list means every campaign under
    /// the account.
    #[serde(default)]
    pub scope: HashMap<String, Vec<String>>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated: DateTime<Utc>,
}

impl Rule {
    /// Stamp timestamps and assign an id ahead of the first write.
    pub fn pre_put(&mut self) {
        let now = Utc::now();
        self.updated = now;
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
            self.created = now;
        }
    }
}

/// Reconciled-performance field a condition reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lhs {
    Roi,
    Spend,
    Profit,
}

impl Lhs {
    /// Pull the named performance value off a campaign.
    pub fn of(&self, campaign: &Campaign) -> f64 {
        match self {
            Lhs::Roi => campaign.roi,
            Lhs::Spend => campaign.spend(),
            Lhs::Profit => campaign.profit,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Op {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

/// A stateless threshold predicate over one performance field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub lhs: Lhs,
    pub op: Op,
    pub rhs: f64,
}

impl Condition {
    pub fn met(&self, value: f64) -> bool {
        match self.op {
            Op::Gt => value > self.rhs,
            Op::Lt => value < self.rhs,
        }
    }
}
