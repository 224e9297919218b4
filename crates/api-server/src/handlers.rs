//! Axum REST handlers.
//!
//! Handlers are a thin shell over the repositories and engines. Per-item
//! reconciliation and automation issues surface in logs, not in responses;
//! a triggered pass reports its summary as long as it ran at all.

use crate::models::{CampaignQuery, CampaignView, ErrorResponse, StatusChangeRequest};
use adpilot_automation::{AutomationEngine, CampaignVerdict, RunSummary, StatusChange, StatusEmitter};
use adpilot_core::account::AdAccount;
use adpilot_core::campaign::Status;
use adpilot_core::rule::Rule;
use adpilot_reconciler::{PassSummary, Reconciler};
use adpilot_store::repo::{AccountRepo, CampaignRepo, RuleRepo};
use adpilot_store::{KeyValueStore, StoreError};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;
use tracing::error;

/// Shared API state: the storage handle plus the two engines.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn KeyValueStore>,
    pub reconciler: Arc<Reconciler>,
    pub automation: AutomationEngine,
    pub emitter: Arc<dyn StatusEmitter>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn storage_error(e: StoreError) -> ApiError {
    error!(error = %e, "storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("storage", e)),
    )
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

// ─── Rules ─────────────────────────────────────────────────────────────────

pub async fn list_rules(State(state): State<ApiState>) -> Result<Json<Vec<Rule>>, ApiError> {
    let rules = RuleRepo::new(state.store.clone())
        .all()
        .await
        .map_err(storage_error)?;
    Ok(Json(rules))
}

pub async fn get_rule(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Rule>, ApiError> {
    RuleRepo::new(state.store.clone())
        .get(&id)
        .await
        .map_err(storage_error)?
        .map(Json)
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("not_found", format!("no rule {id}"))),
        ))
}

pub async fn put_rule(
    State(state): State<ApiState>,
    Json(mut rule): Json<Rule>,
) -> Result<Json<Rule>, ApiError> {
    RuleRepo::new(state.store.clone())
        .put(&mut rule)
        .await
        .map_err(storage_error)?;
    metrics::counter!("api.rules.saved").increment(1);
    Ok(Json(rule))
}

pub async fn delete_rule(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    RuleRepo::new(state.store.clone())
        .delete(&id)
        .await
        .map_err(storage_error)?;
    metrics::counter!("api.rules.deleted").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(
    State(state): State<ApiState>,
    Query(query): Query<CampaignQuery>,
) -> Result<Json<Vec<CampaignView>>, ApiError> {
    let repo = CampaignRepo::new(state.store.clone());
    let campaigns = match query.ids() {
        Some(ids) => repo.subset(&query.account_id, &ids).await,
        None => repo.by_account(&query.account_id).await,
    }
    .map_err(storage_error)?;
    Ok(Json(campaigns.into_iter().map(CampaignView::from).collect()))
}

/// Direct user-initiated status change. Unlike rule automation this is
/// synchronous: the caller learns whether the platform accepted it.
pub async fn change_status(
    State(state): State<ApiState>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<StatusCode, ApiError> {
    let status = Status::parse(&req.status).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid_status", e)),
        )
    })?;

    state
        .emitter
        .emit(StatusChange {
            account_id: req.account_id,
            campaign_id: req.campaign_id,
            status,
        })
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse::new("emit_failed", e)),
            )
        })?;
    metrics::counter!("api.campaigns.status_changes").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

// ─── Accounts ──────────────────────────────────────────────────────────────

pub async fn list_accounts(
    State(state): State<ApiState>,
) -> Result<Json<Vec<AdAccount>>, ApiError> {
    let repo = AccountRepo::new(state.store.clone());
    let ignored = repo.ignored().await.map_err(storage_error)?;
    let accounts = repo
        .all()
        .await
        .map_err(storage_error)?
        .into_iter()
        .filter(|a| !ignored.contains(&a.id))
        .collect();
    Ok(Json(accounts))
}

pub async fn list_ignored(
    State(state): State<ApiState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let mut ignored: Vec<String> = AccountRepo::new(state.store.clone())
        .ignored()
        .await
        .map_err(storage_error)?
        .into_iter()
        .collect();
    ignored.sort();
    Ok(Json(ignored))
}

pub async fn ignore_account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    AccountRepo::new(state.store.clone())
        .ignore(&id)
        .await
        .map_err(storage_error)?;
    metrics::counter!("api.accounts.ignored").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unignore_account(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    AccountRepo::new(state.store.clone())
        .unignore(&id)
        .await
        .map_err(storage_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Engines ───────────────────────────────────────────────────────────────

pub async fn trigger_reconcile(
    State(state): State<ApiState>,
) -> Result<Json<PassSummary>, ApiError> {
    metrics::counter!("api.reconcile.triggered").increment(1);
    state.reconciler.run().await.map(Json).map_err(|e| {
        error!(error = %e, "reconciliation pass aborted");
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new("reconcile_failed", e)),
        )
    })
}

pub async fn run_automation(
    State(state): State<ApiState>,
) -> Result<Json<RunSummary>, ApiError> {
    metrics::counter!("api.automation.triggered").increment(1);
    state
        .automation
        .run_all()
        .await
        .map(Json)
        .map_err(storage_error)
}

/// Evaluate a rule as posted, without persisting it or emitting changes.
pub async fn dry_run_rule(
    State(state): State<ApiState>,
    Json(rule): Json<Rule>,
) -> Json<Vec<CampaignVerdict>> {
    Json(state.automation.run_one(&rule, true).await)
}
