use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

use stackassign_api::app::{build_app, services::AppServices};
use stackassign_auth::{Actor, InMemorySessionStore, SessionValidator};
use stackassign_core::UserId;

struct TestServer {
    base_url: String,
    admin_token: String,
    customer_token: String,
    other_customer_token: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let sessions = Arc::new(InMemorySessionStore::new());
        let admin_token = sessions.issue(Actor::admin(UserId::new())).to_string();
        let customer_token = sessions.issue(Actor::customer(UserId::new())).to_string();
        let other_customer_token = sessions.issue(Actor::customer(UserId::new())).to_string();

        let services = Arc::new(AppServices::new());
        let app = build_app(services, sessions.clone() as Arc<dyn SessionValidator>);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            admin_token,
            customer_token,
            other_customer_token,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn order_body() -> Value {
    json!({
        "title": "Macroeconomics essay",
        "description": "Five pages on inflation targeting in emerging markets.",
        "subject": "Economics",
        "academic_level": "bachelor",
        "paper_type": "essay",
        "pages": 5,
        "deadline": (Utc::now() + Duration::days(14)).to_rfc3339(),
    })
}

fn inquiry_body() -> Value {
    json!({
        "name": "Priya Sharma",
        "email": "Priya@Example.com",
        "subject": "Dissertation help",
        "message": "I need help with my literature review chapter.",
    })
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_endpoints_require_a_valid_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/orders", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/orders", srv.base_url))
        .bearer_auth("not-a-session")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pricing_calculator_is_public_and_pins_the_examples() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/pricing/calculate", srv.base_url))
        .json(&json!({"academic_level": "bachelor", "deadline": 14, "pages": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["pricing"]["price_per_page"], 350);
    assert_eq!(body["pricing"]["urgency_multiplier"], 1.0);
    assert_eq!(body["pricing"]["total_price"], 1750);

    let res = client
        .post(format!("{}/pricing/calculate", srv.base_url))
        .json(&json!({"academic_level": "phd", "deadline": 1, "pages": 2}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["pricing"]["total_price"], 4500);

    let res = client
        .post(format!("{}/pricing/calculate", srv.base_url))
        .json(&json!({"academic_level": "bachelor", "deadline": -2, "pages": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pricing_tiers_fall_back_on_unknown_levels() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/pricing/tiers?academic_level=postdoc&pages=4",
            srv.base_url
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    // Unknown level prices at the high-school rate, by design.
    assert_eq!(body["academic_level"], "high_school");
    assert_eq!(body["tiers"][0]["total_price"], 1000);
}

#[tokio::test]
async fn order_ownership_and_cancellation_rules() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .json(&order_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["total_price"], 1750);
    assert!(body["order"]["order_number"]
        .as_str()
        .unwrap()
        .starts_with("SA-"));

    // A different customer cannot even see the order.
    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.other_customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // ...and a mutation attempt is forbidden outright.
    let res = client
        .post(format!("{}/orders/{}/status", srv.base_url, order_id))
        .bearer_auth(&srv.other_customer_token)
        .json(&json!({"status": "completed"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner cancels their pending order.
    let res = client
        .post(format!("{}/orders/{}/cancel", srv.base_url, order_id))
        .bearer_auth(&srv.customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["status"], "cancelled");

    // Cancelling again is an invalid transition, not a policy denial.
    let res = client
        .post(format!("{}/orders/{}/cancel", srv.base_url, order_id))
        .bearer_auth(&srv.customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");
    assert_eq!(body["from"], "cancelled");
}

#[tokio::test]
async fn page_count_edits_reprice_pending_orders() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .json(&order_body())
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let res = client
        .patch(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.customer_token)
        .json(&json!({"pages": 8}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["pages"], 8);
    assert_eq!(body["order"]["total_price"], 2800);
}

#[tokio::test]
async fn admin_runs_the_lifecycle_and_the_customer_loses_edit_rights() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .json(&order_body())
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    for status in ["confirmed", "in_progress", "review", "completed"] {
        let res = client
            .post(format!("{}/orders/{}/status", srv.base_url, order_id))
            .bearer_auth(&srv.admin_token)
            .json(&json!({"status": status}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "transition to {status}");
    }

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.admin_token)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["order"]["status"], "completed");
    assert!(!body["order"]["completed_at"].is_null());

    // Content edits by the owner stopped being possible after `pending`.
    let res = client
        .patch(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.customer_token)
        .json(&json!({"notes": "too late for this"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Hard delete is admin-only and final.
    let res = client
        .delete(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/orders/{}", srv.base_url, order_id))
        .bearer_auth(&srv.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn inquiries_are_public_to_create_and_admin_to_work() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/inquiries", srv.base_url))
        .json(&inquiry_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    let inquiry_id = body["inquiry"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["inquiry"]["status"], "new");
    assert_eq!(body["inquiry"]["email"], "priya@example.com");
    assert!(body["inquiry"]["responded_at"].is_null());

    let res = client
        .get(format!("{}/inquiries", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/inquiries/{}/status", srv.base_url, inquiry_id))
        .bearer_auth(&srv.admin_token)
        .json(&json!({"status": "in_progress"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let responded_at = body["inquiry"]["responded_at"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/inquiries/{}/status", srv.base_url, inquiry_id))
        .bearer_auth(&srv.admin_token)
        .json(&json!({"status": "resolved"}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["inquiry"]["responded_at"], responded_at.as_str());

    let res = client
        .post(format!("{}/inquiries/{}/status", srv.base_url, inquiry_id))
        .bearer_auth(&srv.admin_token)
        .json(&json!({"status": "new"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn publications_probe_slugs_and_hide_drafts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let create = |title: &str| {
        json!({
            "kind": "service",
            "title": title,
            "body": "Professional essay writing for all academic levels.",
        })
    };

    let res = client
        .post(format!("{}/publications", srv.base_url))
        .bearer_auth(&srv.admin_token)
        .json(&create("Essay Writing!"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["publication"]["slug"], "essay-writing");

    let res = client
        .post(format!("{}/publications", srv.base_url))
        .bearer_auth(&srv.admin_token)
        .json(&create("Essay Writing"))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["publication"]["slug"], "essay-writing-1");

    // Customers cannot author content.
    let res = client
        .post(format!("{}/publications", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .json(&create("Thesis Writing"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Drafts are invisible to the public until published.
    let res = client
        .get(format!("{}/publications/essay-writing", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!(
            "{}/publications/essay-writing/publish",
            srv.base_url
        ))
        .bearer_auth(&srv.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/publications/essay-writing", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["publication"]["published"], true);
    assert!(!body["publication"]["published_at"].is_null());

    let res = client
        .get(format!("{}/publications", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["publications"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_is_admin_only() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&srv.customer_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/dashboard/stats", srv.base_url))
        .bearer_auth(&srv.admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["stats"]["total_orders"], 0);
}
