//! Automation pass controller.
//!
//! `run_all` is the batch entry point: every active rule gets its own task
//! and its own failure domain, so one misbehaving rule cannot starve the
//! rest. `run_one` evaluates a single rule on demand and backs the
//! interactive dry-run. Neither keeps state between passes.

use crate::emitter::{self, StatusChange, StatusEmitter};
use crate::evaluator::{self, Verdict};
use adpilot_core::rule::Rule;
use adpilot_store::repo::{CampaignRepo, RuleRepo};
use adpilot_store::{KeyValueStore, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Outcome counts of one `run_all` pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Active rules the pass ran.
    pub rules: usize,
    /// Rule-campaign evaluations performed.
    pub evaluated: usize,
    /// Status changes dispatched (fire-and-forget, not confirmed).
    pub dispatched: usize,
}

/// Verdict for one campaign under one rule, as returned by dry-runs.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignVerdict {
    pub account_id: String,
    pub campaign_id: String,
    pub verdict: Verdict,
}

#[derive(Clone)]
pub struct AutomationEngine {
    store: Arc<dyn KeyValueStore>,
    emitter: Arc<dyn StatusEmitter>,
}

impl AutomationEngine {
    pub fn new(store: Arc<dyn KeyValueStore>, emitter: Arc<dyn StatusEmitter>) -> Self {
        Self { store, emitter }
    }

    /// Run every active rule once, each in its own task.
    ///
    /// Returns `Err` only when the rule scan itself fails. Anything that goes
    /// wrong inside a single rule is logged and confined to that rule.
    pub async fn run_all(&self) -> Result<RunSummary, StoreError> {
        let rules = RuleRepo::new(self.store.clone()).all().await?;
        let active: Vec<Rule> = rules.into_iter().filter(|r| r.active).collect();

        let mut summary = RunSummary {
            rules: active.len(),
            ..Default::default()
        };

        let mut tasks = JoinSet::new();
        for rule in active {
            let engine = self.clone();
            tasks.spawn(async move {
                let verdicts = engine.run_one(&rule, false).await;
                (rule.id, verdicts)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((rule_id, verdicts)) => {
                    let dispatched = verdicts
                        .iter()
                        .filter(|v| v.verdict == Verdict::Satisfied)
                        .count();
                    debug!(rule = %rule_id, evaluated = verdicts.len(), dispatched, "rule complete");
                    summary.evaluated += verdicts.len();
                    summary.dispatched += dispatched;
                }
                Err(e) => {
                    error!(error = %e, "rule task panicked");
                }
            }
        }

        metrics::counter!("automation.passes").increment(1);
        info!(
            rules = summary.rules,
            evaluated = summary.evaluated,
            dispatched = summary.dispatched,
            "automation pass complete"
        );
        Ok(summary)
    }

    /// Evaluate one rule across its scope.
    ///
    /// An empty campaign-id list in a scope entry means every campaign under
    /// that account. With `dry_run` no change is dispatched; the verdicts are
    /// returned either way. A scope entry that cannot be fetched is logged
    /// and skipped.
    pub async fn run_one(&self, rule: &Rule, dry_run: bool) -> Vec<CampaignVerdict> {
        let repo = CampaignRepo::new(self.store.clone());
        let mut out = Vec::new();

        for (account_id, campaign_ids) in &rule.scope {
            let fetched = if campaign_ids.is_empty() {
                repo.by_account(account_id).await
            } else {
                repo.subset(account_id, campaign_ids).await
            };
            let campaigns = match fetched {
                Ok(c) => c,
                Err(e) => {
                    warn!(rule = %rule.id, account = %account_id, error = %e, "scope fetch failed");
                    continue;
                }
            };

            for campaign in campaigns {
                let verdict = evaluator::evaluate(rule, &campaign);
                if verdict == Verdict::Satisfied && !dry_run {
                    emitter::dispatch(
                        self.emitter.clone(),
                        StatusChange {
                            account_id: campaign.account_id.clone(),
                            campaign_id: campaign.id.clone(),
                            status: rule.effect,
                        },
                    );
                }
                out.push(CampaignVerdict {
                    account_id: campaign.account_id,
                    campaign_id: campaign.id,
                    verdict,
                });
            }
        }
        out
    }
}
