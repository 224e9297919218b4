//! API router. Mounts every endpoint under /api/v1.

use crate::handlers::{self, ApiState};
use adpilot_automation::{AutomationEngine, PlatformEmitter, StatusEmitter};
use adpilot_platform::AdPlatform;
use adpilot_reconciler::Reconciler;
use adpilot_store::KeyValueStore;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Wire the engines over one store and platform handle.
pub fn build_state(
    store: Arc<dyn KeyValueStore>,
    platform: Arc<dyn AdPlatform>,
    max_fanout: usize,
) -> ApiState {
    let emitter: Arc<dyn StatusEmitter> =
        Arc::new(PlatformEmitter::new(platform.clone(), store.clone()));
    ApiState {
        reconciler: Arc::new(Reconciler::new(platform, store.clone(), max_fanout)),
        automation: AutomationEngine::new(store.clone(), emitter.clone()),
        emitter,
        store,
    }
}

pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        // Rules
        .route(
            "/api/v1/rules",
            get(handlers::list_rules).put(handlers::put_rule),
        )
        .route(
            "/api/v1/rules/:id",
            get(handlers::get_rule).delete(handlers::delete_rule),
        )
        // Campaigns
        .route("/api/v1/campaigns", get(handlers::list_campaigns))
        .route("/api/v1/campaigns/status", patch(handlers::change_status))
        // Accounts
        .route("/api/v1/accounts", get(handlers::list_accounts))
        .route("/api/v1/accounts/ignored", get(handlers::list_ignored))
        .route(
            "/api/v1/accounts/ignored/:id",
            put(handlers::ignore_account).delete(handlers::unignore_account),
        )
        // Engines
        .route("/api/v1/reconcile", post(handlers::trigger_reconcile))
        .route("/api/v1/automation/run", post(handlers::run_automation))
        .route("/api/v1/automation/dry-run", post(handlers::dry_run_rule))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
