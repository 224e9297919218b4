//! End-to-end routing tests over an in-memory store and a stub ad platform.

use adpilot_api::{api_router, build_state};
use adpilot_core::account::AdAccount;
use adpilot_core::campaign::{Campaign, Status};
use adpilot_platform::{AdPlatform, Insight, PlatformError};
use adpilot_store::MemoryStore;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Default)]
struct StubPlatform {
    status_calls: Mutex<Vec<(String, Status)>>,
}

#[async_trait]
impl AdPlatform for StubPlatform {
    async fn fetch_accounts(&self) -> Result<Vec<AdAccount>, PlatformError> {
        Ok(vec![AdAccount {
            id: "a1".into(),
            name: "main".into(),
            status: 1,
            ..Default::default()
        }])
    }

    async fn fetch_campaigns(&self, account_id: &str) -> Result<Vec<Campaign>, PlatformError> {
        Ok(vec![
            Campaign {
                account_id: account_id.into(),
                id: "c1".into(),
                name: "482913 Evergreen".into(),
                ..Default::default()
            },
            Campaign {
                account_id: account_id.into(),
                id: "c2".into(),
                name: "515151 Burner".into(),
                ..Default::default()
            },
        ])
    }

    async fn fetch_insights(&self, _account_id: &str) -> Result<Vec<Insight>, PlatformError> {
        Ok(vec![Insight {
            campaign_id: "c2".into(),
            spend: "150".into(),
            clicks: "1200".into(),
            ..Default::default()
        }])
    }

    async fn set_status(&self, campaign_id: &str, status: Status) -> Result<(), PlatformError> {
        self.status_calls
            .lock()
            .push((campaign_id.to_string(), status));
        Ok(())
    }
}

fn app() -> (Router, Arc<StubPlatform>) {
    let store = Arc::new(MemoryStore::new());
    let platform = Arc::new(StubPlatform::default());
    let state = build_state(store, platform.clone(), 4);
    (api_router(state), platform)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn rule_crud_round_trip() {
    let (app, _) = app();

    let rule = json!({
        "name": "pause losers",
        "active": true,
        "conditions": [{"lhs": "SPEND", "op": ">", "rhs": 100.0}],
        "effect": "PAUSED",
        "scope": {"a1": []}
    });
    let (status, saved) = send(&app, json_req("PUT", "/api/v1/rules", rule)).await;
    assert_eq!(status, StatusCode::OK);
    let id = saved["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());

    let (status, listed) = send(&app, get_req("/api/v1/rules")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, fetched) = send(&app, get_req(&format!("/api/v1/rules/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "pause losers");

    let del = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/rules/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, del).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get_req(&format!("/api/v1/rules/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconcile_then_query_campaigns() {
    let (app, _) = app();

    let (status, summary) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/reconcile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["accounts"], 1);
    assert_eq!(summary["campaigns"], 2);
    assert_eq!(summary["written"], 2);

    let (status, views) = send(&app, get_req("/api/v1/campaigns?account_id=a1")).await;
    assert_eq!(status, StatusCode::OK);
    let views = views.as_array().unwrap().clone();
    assert_eq!(views.len(), 2);
    let c2 = views.iter().find(|v| v["id"] == "c2").unwrap();
    // Display projection carries formatted strings.
    assert_eq!(c2["display"]["spend"], "$150");
    assert_eq!(c2["display"]["clicks"], "1,200");

    let (status, subset) = send(
        &app,
        get_req("/api/v1/campaigns?account_id=a1&campaign_ids=c1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(subset.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dry_run_reports_verdicts_without_changes() {
    let (app, platform) = app();

    // Persist campaigns first.
    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/reconcile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let rule = json!({
        "name": "pause spenders",
        "active": true,
        "conditions": [{"lhs": "SPEND", "op": ">", "rhs": 100.0}],
        "effect": "PAUSED",
        "scope": {"a1": []}
    });
    let (status, verdicts) = send(&app, json_req("POST", "/api/v1/automation/dry-run", rule)).await;
    assert_eq!(status, StatusCode::OK);
    let verdicts = verdicts.as_array().unwrap().clone();
    assert_eq!(verdicts.len(), 2);
    let c2 = verdicts.iter().find(|v| v["campaign_id"] == "c2").unwrap();
    assert_eq!(c2["verdict"], "satisfied");
    assert!(platform.status_calls.lock().is_empty());
}

#[tokio::test]
async fn direct_status_change_is_synchronous() {
    let (app, platform) = app();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/reconcile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        json_req(
            "PATCH",
            "/api/v1/campaigns/status",
            json!({"account_id": "a1", "campaign_id": "c1", "status": "PAUSED"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        platform.status_calls.lock().as_slice(),
        &[("c1".to_string(), Status::Paused)]
    );

    let (status, body) = send(
        &app,
        json_req(
            "PATCH",
            "/api/v1/campaigns/status",
            json!({"account_id": "a1", "campaign_id": "c1", "status": "RUNNING"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_status");
}

#[tokio::test]
async fn ignored_accounts_shape_listings() {
    let (app, _) = app();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/api/v1/reconcile")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, accounts) = send(&app, get_req("/api/v1/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(accounts.as_array().unwrap().len(), 1);

    let ignore = Request::builder()
        .method("PUT")
        .uri("/api/v1/accounts/ignored/a1")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, ignore).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, accounts) = send(&app, get_req("/api/v1/accounts")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(accounts.as_array().unwrap().is_empty());

    let (status, ignored) = send(&app, get_req("/api/v1/accounts/ignored")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ignored, json!(["a1"]));
}
