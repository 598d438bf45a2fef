// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{spawn_app, CALLBACK_URL};
use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};
use ytpush::domain::models::subscription::{topic_url_for_channel, SubscriptionStatus};
use ytpush::domain::repositories::subscription_repository::SubscriptionRepository;
use ytpush::domain::services::hub_client::MAX_LEASE_SECONDS;

#[tokio::test]
async fn test_create_subscription_calls_hub_and_returns_active() {
    let app = spawn_app("s3cr3t").await;
    Mock::given(method("POST"))
        .and(path("/subscribe"))
        .and(body_string_contains("hub.mode=subscribe"))
        .and(body_string_contains("hub.lease_seconds=3600"))
        .and(body_string_contains("hub.secret=s3cr3t"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&app.hub)
        .await;

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCabc", "lease_seconds": 3600 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["status"], "active");
    assert_eq!(body["channel_id"], "UCabc");
    assert_eq!(body["topic_url"], topic_url_for_channel("UCabc"));
    assert_eq!(body["callback_url"], CALLBACK_URL);
    assert!(body.get("secret").is_none());
}

#[tokio::test]
async fn test_negotiated_lease_above_ceiling_is_capped() {
    let app = spawn_app("").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hub.lease_seconds=99999999"))
        .mount(&app.hub)
        .await;

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCabc", "lease_seconds": 3600 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["lease_seconds"], MAX_LEASE_SECONDS);

    let renewed = app
        .server
        .post(&format!("/v1/subscriptions/{}/renew", body["id"].as_str().unwrap()))
        .await;
    assert_eq!(renewed.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_hub_rejection_is_bad_request_and_persisted_as_failed() {
    let app = spawn_app("").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid topic"))
        .mount(&app.hub)
        .await;

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCbad" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let stored = app
        .subscriptions
        .find_by_channel_and_callback("UCbad", CALLBACK_URL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Failed);
}

#[tokio::test]
async fn test_invalid_request_is_rejected_before_hub() {
    let app = spawn_app("").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&app.hub)
        .await;

    let response = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCabc", "lease_seconds": 864_001 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_list_renew_and_delete() {
    let app = spawn_app("").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&app.hub)
        .await;

    let created: Value = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCabc" }))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let fetched = app.server.get(&format!("/v1/subscriptions/{}", id)).await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    assert_eq!(fetched.json::<Value>()["lease_seconds"], 432_000);

    let listed: Value = app
        .server
        .get("/v1/subscriptions")
        .add_query_param("status", "active")
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let renewed = app
        .server
        .post(&format!("/v1/subscriptions/{}/renew", id))
        .await;
    assert_eq!(renewed.status_code(), StatusCode::OK);

    let deleted = app
        .server
        .delete(&format!("/v1/subscriptions/{}", id))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let body: Value = deleted.json();
    assert_eq!(body["deleted"], true);
    assert_eq!(body["unsubscribed"], true);

    let missing = app.server.get(&format!("/v1/subscriptions/{}", id)).await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    let requests = app.hub.received_requests().await.unwrap();
    let modes: Vec<bool> = requests
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).contains("hub.mode=unsubscribe"))
        .collect();
    assert_eq!(modes, vec![false, false, true]);
}

#[tokio::test]
async fn test_delete_succeeds_when_hub_unsubscribe_fails() {
    let app = spawn_app("").await;
    Mock::given(method("POST"))
        .and(body_string_contains("hub.mode=unsubscribe"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.hub)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&app.hub)
        .await;

    let created: Value = app
        .server
        .post("/v1/subscriptions")
        .json(&json!({ "channel_id": "UCabc" }))
        .await
        .json();
    let id = created["id"].as_str().unwrap().to_string();

    let deleted = app
        .server
        .delete(&format!("/v1/subscriptions/{}", id))
        .await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let body: Value = deleted.json();
    assert_eq!(body["deleted"], true);
    assert_eq!(body["unsubscribed"], false);
    assert_eq!(body["hub_status"], 500);
}

#[tokio::test]
async fn test_unknown_status_filter_is_bad_request() {
    let app = spawn_app("").await;
    let response = app
        .server
        .get("/v1/subscriptions")
        .add_query_param("status", "zombie")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
