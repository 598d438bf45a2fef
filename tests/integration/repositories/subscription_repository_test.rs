// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::super::helpers::{setup_db, subscription, CALLBACK_URL};
use chrono::{Duration, Utc};
use ytpush::domain::models::subscription::{topic_url_for_channel, Subscription, SubscriptionStatus};
use ytpush::domain::repositories::subscription_repository::{
    RepositoryError, SubscriptionQuery, SubscriptionRepository,
};
use ytpush::infrastructure::repositories::subscription_repo_impl::SubscriptionRepositoryImpl;

const HUB: &str = "https://pubsubhubbub.appspot.com/subscribe";

/// `expires_in` 后到期的活跃订阅
fn active(channel_id: &str, expires_in: Duration) -> Subscription {
    let mut sub = subscription(channel_id, HUB, 3600);
    sub.mark_active(Utc::now() + expires_in - Duration::seconds(3600), None);
    sub
}

#[tokio::test]
async fn test_create_and_find() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let sub = subscription("UCabc", HUB, 3600);
    repo.create(&sub).await.unwrap();

    let by_id = repo.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(by_id.channel_id, "UCabc");
    assert_eq!(by_id.status, SubscriptionStatus::Pending);
    assert_eq!(by_id.topic_url, topic_url_for_channel("UCabc"));

    let by_pair = repo
        .find_by_channel_and_callback("UCabc", CALLBACK_URL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_pair.id, sub.id);

    let by_topic = repo.find_by_topic(&sub.topic_url).await.unwrap();
    assert_eq!(by_topic.len(), 1);
}

#[tokio::test]
async fn test_channel_callback_pair_is_unique() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    repo.create(&subscription("UCabc", HUB, 3600)).await.unwrap();

    let err = repo
        .create(&subscription("UCabc", HUB, 7200))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate));
}

#[tokio::test]
async fn test_update_persists_lifecycle_fields() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let mut sub = subscription("UCabc", HUB, 3600);
    repo.create(&sub).await.unwrap();

    let now = Utc::now();
    sub.mark_active(now, Some(7200));
    sub.record_verification(now, None);
    repo.update(&sub).await.unwrap();

    let stored = repo.find_by_id(sub.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Active);
    assert_eq!(stored.lease_seconds, 7200);
    assert_eq!(
        stored.expires_at.timestamp(),
        (now + Duration::seconds(7200)).timestamp()
    );
    assert!(stored.last_verified_at.is_some());
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let err = repo
        .update(&subscription("UCghost", HUB, 3600))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
async fn test_find_expiring_orders_by_expiry_and_skips_pending() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let later = active("UClater", Duration::hours(20));
    let sooner = active("UCsooner", Duration::hours(2));
    let outside = active("UCoutside", Duration::days(3));
    let mut failed = active("UCfailed", Duration::hours(10));
    failed.mark_failed(Utc::now());
    let pending = subscription("UCpending", HUB, 3600);
    for sub in [&later, &sooner, &outside, &failed, &pending] {
        repo.create(sub).await.unwrap();
    }

    let due = repo
        .find_expiring(Utc::now() + Duration::hours(24), 10)
        .await
        .unwrap();
    let channels: Vec<&str> = due.iter().map(|s| s.channel_id.as_str()).collect();
    assert_eq!(channels, vec!["UCsooner", "UClater", "UCfailed"]);

    let limited = repo
        .find_expiring(Utc::now() + Duration::hours(24), 1)
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].channel_id, "UCsooner");
}

#[tokio::test]
async fn test_find_expiring_fills_spare_capacity_with_retries() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let long_ago = Utc::now() - Duration::days(3);

    let mut stale_failed = active("UCstale", -Duration::days(3));
    stale_failed.mark_failed(long_ago);
    let mut recent_failed = active("UCrecent", -Duration::days(3));
    recent_failed.mark_failed(Utc::now() - Duration::hours(1));
    let mut expired = active("UCexpired", -Duration::days(2));
    assert!(expired.mark_expired(Utc::now() - Duration::days(1)));
    let due = active("UCdue", Duration::hours(1));
    for sub in [&stale_failed, &recent_failed, &expired, &due] {
        repo.create(sub).await.unwrap();
    }

    let before = Utc::now() + Duration::hours(24);

    let batch = repo.find_expiring(before, 2).await.unwrap();
    let channels: Vec<&str> = batch.iter().map(|s| s.channel_id.as_str()).collect();
    assert_eq!(channels, vec!["UCdue", "UCstale"]);

    let batch = repo.find_expiring(before, 10).await.unwrap();
    let channels: Vec<&str> = batch.iter().map(|s| s.channel_id.as_str()).collect();
    assert_eq!(channels, vec!["UCdue", "UCstale", "UCexpired", "UCrecent"]);
}

#[tokio::test]
async fn test_mark_lapsed_and_derived_expired_listing() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    let lapsed = active("UClapsed", -Duration::hours(1));
    let fresh = active("UCfresh", Duration::hours(5));
    repo.create(&lapsed).await.unwrap();
    repo.create(&fresh).await.unwrap();

    let query = |status| SubscriptionQuery {
        status: Some(status),
        limit: 50,
        offset: 0,
    };

    // Derived before any write
    let expired = repo.list(query(SubscriptionStatus::Expired)).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].id, lapsed.id);
    let active_rows = repo.list(query(SubscriptionStatus::Active)).await.unwrap();
    assert_eq!(active_rows.len(), 1);
    assert_eq!(active_rows[0].id, fresh.id);

    assert_eq!(repo.mark_lapsed(Utc::now()).await.unwrap(), 1);
    let stored = repo.find_by_id(lapsed.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SubscriptionStatus::Expired);

    let expired = repo.list(query(SubscriptionStatus::Expired)).await.unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(repo.mark_lapsed(Utc::now()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_paginates_and_delete() {
    let repo = SubscriptionRepositoryImpl::new(setup_db().await);
    for channel in ["UCa", "UCb", "UCc"] {
        repo.create(&subscription(channel, HUB, 3600)).await.unwrap();
    }

    let page = repo
        .list(SubscriptionQuery {
            status: None,
            limit: 2,
            offset: 1,
        })
        .await
        .unwrap();
    assert_eq!(page.len(), 2);

    let target = page[0].id;
    assert!(repo.delete(target).await.unwrap());
    assert!(!repo.delete(target).await.unwrap());
    assert!(repo.find_by_id(target).await.unwrap().is_none());
}
