//! Rule-based campaign automation.
//!
//! Rules are stateless threshold predicates over reconciled performance.
//! The [`controller::AutomationEngine`] evaluates them in a single pass and
//! dispatches status changes fire-and-forget through an
//! [`emitter::StatusEmitter`].

pub mod controller;
pub mod emitter;
pub mod evaluator;

pub use controller::{AutomationEngine, CampaignVerdict, RunSummary};
pub use emitter::{dispatch, EmitError, PlatformEmitter, StatusChange, StatusEmitter};
pub use evaluator::{evaluate, Verdict};
