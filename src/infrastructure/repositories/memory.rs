// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 内存仓库实现
//!
//! 与 SeaORM 实现满足同一契约（唯一约束、只追加审计），用于测试和本地调试。

use crate::domain::models::subscription::{Subscription, SubscriptionStatus};
use crate::domain::models::webhook_event::{ProcessingOutcome, WebhookEvent};
use crate::domain::repositories::subscription_repository::{
    RepositoryError, SubscriptionQuery, SubscriptionRepository,
};
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// 内存订阅仓库
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<HashMap<Uuid, Subscription>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前所有记录的快照
    pub fn snapshot(&self) -> Vec<Subscription> {
        let mut rows: Vec<_> = self.rows.lock().values().cloned().collect();
        rows.sort_by_key(|s| s.created_at);
        rows
    }

    /// 直接写入记录，绕过唯一性检查
    pub fn seed(&self, subscription: Subscription) {
        self.rows.lock().insert(subscription.id, subscription);
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, RepositoryError> {
        let mut rows = self.rows.lock();
        let conflict = rows.values().any(|s| {
            s.id == subscription.id
                || (s.channel_id == subscription.channel_id
                    && s.callback_url == subscription.callback_url)
        });
        if conflict {
            return Err(RepositoryError::Duplicate);
        }
        rows.insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self.rows.lock().get(&id).cloned())
    }

    async fn find_by_channel_and_callback(
        &self,
        channel_id: &str,
        callback_url: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .values()
            .find(|s| s.channel_id == channel_id && s.callback_url == callback_url)
            .cloned())
    }

    async fn find_by_topic(&self, topic_url: &str) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|s| s.topic_url == topic_url)
            .cloned()
            .collect())
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, RepositoryError> {
        let mut rows = self.rows.lock();
        match rows.get_mut(&subscription.id) {
            Some(row) => {
                *row = subscription.clone();
                Ok(subscription.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn list(&self, query: SubscriptionQuery) -> Result<Vec<Subscription>, RepositoryError> {
        let now = Utc::now();
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|s| match query.status {
                Some(status) => s.effective_status(now) == status,
                None => true,
            })
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn find_expiring(
        &self,
        before: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let rows = self.rows.lock();
        let limit = limit as usize;

        let mut due: Vec<_> = rows
            .values()
            .filter(|s| s.status == SubscriptionStatus::Active && s.expires_at <= before)
            .cloned()
            .collect();
        due.sort_by_key(|s| s.expires_at);
        due.truncate(limit);

        let mut retries: Vec<_> = rows
            .values()
            .filter(|s| {
                matches!(
                    s.status,
                    SubscriptionStatus::Failed | SubscriptionStatus::Expired
                ) && s.expires_at <= before
            })
            .cloned()
            .collect();
        retries.sort_by_key(|s| s.updated_at);
        retries.truncate(limit - due.len());

        due.extend(retries);
        Ok(due)
    }

    async fn mark_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut count = 0;
        for row in self.rows.lock().values_mut() {
            if row.mark_expired(now) {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.rows.lock().remove(&id).is_some())
    }
}

/// 内存Webhook事件仓库
#[derive(Default)]
pub struct InMemoryWebhookEventRepository {
    rows: Mutex<Vec<WebhookEvent>>,
}

impl InMemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<WebhookEvent> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl WebhookEventRepository for InMemoryWebhookEventRepository {
    async fn insert_new(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
        let mut rows = self.rows.lock();
        if rows
            .iter()
            .any(|e| e.content_hash == event.content_hash || e.id == event.id)
        {
            return Err(RepositoryError::Duplicate);
        }
        rows.push(event.clone());
        Ok(event.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEvent>, RepositoryError> {
        Ok(self.rows.lock().iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<WebhookEvent>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|e| e.content_hash == content_hash)
            .cloned())
    }

    async fn record_outcome(
        &self,
        id: Uuid,
        outcome: &ProcessingOutcome,
    ) -> Result<(), RepositoryError> {
        let mut rows = self.rows.lock();
        let row = rows
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.processed = outcome.processed;
        row.processing_error = outcome.error.clone();
        row.video_id = outcome.video_id.clone();
        row.channel_id = outcome.channel_id.clone();
        Ok(())
    }
}
