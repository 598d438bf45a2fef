// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::setup_db;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use ytpush::domain::models::webhook_event::{ProcessingOutcome, WebhookEvent};
use ytpush::domain::repositories::subscription_repository::RepositoryError;
use ytpush::domain::repositories::webhook_event_repository::WebhookEventRepository;
use ytpush::domain::services::fingerprint::content_fingerprint;
use ytpush::infrastructure::database::entities::webhook_event;
use ytpush::infrastructure::repositories::webhook_event_repo_impl::WebhookEventRepoImpl;

fn event(body: &str) -> WebhookEvent {
    WebhookEvent::new(
        body.as_bytes().to_vec(),
        content_fingerprint(body.as_bytes()),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_duplicate_fingerprint_is_rejected() {
    let repo = WebhookEventRepoImpl::new(setup_db().await);
    let first = event("<feed/>");
    repo.insert_new(&first).await.unwrap();

    let err = repo.insert_new(&event("<feed/>")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate));

    let stored = repo
        .find_by_content_hash(&first.content_hash)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, first.id);
    assert_eq!(stored.content_hash.len(), 64);
}

#[tokio::test]
async fn test_raw_body_bytes_are_stored_verbatim() {
    let repo = WebhookEventRepoImpl::new(setup_db().await);
    let body: &[u8] = &[0x3c, 0x66, 0xff, 0xfe];
    let ev = WebhookEvent::new(body.to_vec(), content_fingerprint(body), Utc::now());
    repo.insert_new(&ev).await.unwrap();

    let stored = repo.find_by_id(ev.id).await.unwrap().unwrap();
    assert_eq!(stored.raw_body, body);
    assert_eq!(content_fingerprint(&stored.raw_body), stored.content_hash);
}

#[tokio::test]
async fn test_record_outcome_updates_processing_columns() {
    let repo = WebhookEventRepoImpl::new(setup_db().await);
    let ev = event("<feed><entry/></feed>");
    repo.insert_new(&ev).await.unwrap();

    repo.record_outcome(
        ev.id,
        &ProcessingOutcome::succeeded(Some("vid".to_string()), Some("UCabc".to_string())),
    )
    .await
    .unwrap();

    let stored = repo.find_by_id(ev.id).await.unwrap().unwrap();
    assert!(stored.processed);
    assert_eq!(stored.video_id.as_deref(), Some("vid"));
    assert_eq!(stored.channel_id.as_deref(), Some("UCabc"));
    assert_eq!(stored.raw_body, ev.raw_body);
}

#[tokio::test]
async fn test_record_outcome_for_unknown_event_is_not_found() {
    let repo = WebhookEventRepoImpl::new(setup_db().await);
    let err = repo
        .record_outcome(uuid::Uuid::new_v4(), &ProcessingOutcome::rejected("bad"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn test_stored_fields_are_immutable() {
    let db = setup_db().await;
    let repo = WebhookEventRepoImpl::new(db.clone());
    let ev = event("<feed>original</feed>");
    repo.insert_new(&ev).await.unwrap();

    let result = webhook_event::Entity::update_many()
        .col_expr(webhook_event::Column::RawBody, Expr::value(b"<feed>tampered</feed>".to_vec()))
        .filter(webhook_event::Column::Id.eq(ev.id))
        .exec(db.as_ref())
        .await;
    assert!(result.is_err());

    let result = webhook_event::Entity::update_many()
        .col_expr(webhook_event::Column::ContentHash, Expr::value("0".repeat(64)))
        .filter(webhook_event::Column::Id.eq(ev.id))
        .exec(db.as_ref())
        .await;
    assert!(result.is_err());

    let stored = repo.find_by_id(ev.id).await.unwrap().unwrap();
    assert_eq!(stored.raw_body, b"<feed>original</feed>");
}

#[tokio::test]
async fn test_events_cannot_be_deleted() {
    let db = setup_db().await;
    let repo = WebhookEventRepoImpl::new(db.clone());
    let ev = event("<feed>keep me</feed>");
    repo.insert_new(&ev).await.unwrap();

    let result = webhook_event::Entity::delete_by_id(ev.id)
        .exec(db.as_ref())
        .await;
    assert!(result.is_err());
    assert!(repo.find_by_id(ev.id).await.unwrap().is_some());
}
