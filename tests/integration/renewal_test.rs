// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{spawn_app, subscription};
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::Value;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, ResponseTemplate};
use ytpush::domain::models::subscription::SubscriptionStatus;
use ytpush::domain::repositories::subscription_repository::SubscriptionRepository;

#[tokio::test]
async fn test_sweep_renews_due_subscriptions_against_hub() {
    let app = spawn_app("").await;
    let hub_url = app.hub_url();

    let mut channels = Vec::new();
    for (channel, hours) in [("UCfirst", 1), ("UCsecond", 2), ("UCthird", 3)] {
        let mut sub = subscription(channel, &hub_url, 3600);
        sub.mark_active(Utc::now() + Duration::hours(hours) - Duration::seconds(3600), None);
        app.subscriptions.create(&sub).await.unwrap();
        channels.push(sub);
    }

    Mock::given(method("POST"))
        .and(body_string_contains("channel_id%3DUCsecond"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.hub)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&app.hub)
        .await;

    let report = app.scheduler.run_sweep().await.unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(app.hub.received_requests().await.unwrap().len(), 3);

    let statuses: Vec<SubscriptionStatus> = {
        let mut out = Vec::new();
        for sub in &channels {
            out.push(
                app.subscriptions
                    .find_by_id(sub.id)
                    .await
                    .unwrap()
                    .unwrap()
                    .status,
            );
        }
        out
    };
    assert_eq!(
        statuses,
        vec![
            SubscriptionStatus::Active,
            SubscriptionStatus::Failed,
            SubscriptionStatus::Active
        ]
    );
}

#[tokio::test]
async fn test_renewal_endpoint_reports_counts() {
    let app = spawn_app("").await;
    let mut sub = subscription("UCabc", &app.hub_url(), 3600);
    sub.mark_active(Utc::now() - Duration::minutes(30), None);
    app.subscriptions.create(&sub).await.unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&app.hub)
        .await;

    let response = app.server.post("/v1/renewals").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["attempted"], 1);
    assert_eq!(body["succeeded"], 1);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn test_unreachable_hub_marks_failed_and_retries_next_sweep() {
    let app = spawn_app("").await;
    // Port 1 refuses connections
    let mut sub = subscription("UCabc", "http://127.0.0.1:1/subscribe", 3600);
    sub.mark_active(Utc::now() - Duration::minutes(30), None);
    app.subscriptions.create(&sub).await.unwrap();

    let report = app.scheduler.run_sweep().await.unwrap();
    assert_eq!(report.failed, 1);
    let stored = app.subscriptions.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Failed);

    let report = app.scheduler.run_sweep().await.unwrap();
    assert_eq!(report.attempted, 1);
}
