//! Stateless rule evaluation.

use adpilot_core::campaign::Campaign;
use adpilot_core::rule::Rule;
use serde::Serialize;

/// Outcome of evaluating one rule against one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The campaign already carries the rule's effect; nothing to do.
    NoOp,
    /// At least one condition does not hold.
    NotSatisfied,
    /// Every condition holds; the effect should be applied.
    Satisfied,
}

/// Evaluate `rule` against `campaign`.
///
/// The idempotency check runs before any condition: a campaign already in
/// the rule's target status is a no-op even when every condition holds, which
/// is the only repeat protection the engine has. Conditions are AND-ed in
/// list order and the first miss stops evaluation. A rule with no conditions
/// is satisfied.
pub fn evaluate(rule: &Rule, campaign: &Campaign) -> Verdict {
    if campaign.status == rule.effect {
        return Verdict::NoOp;
    }
    for condition in &rule.conditions {
        if !condition.met(condition.lhs.of(campaign)) {
            return Verdict::NotSatisfied;
        }
    }
    Verdict::Satisfied
}
