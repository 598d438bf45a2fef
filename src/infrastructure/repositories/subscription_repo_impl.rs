// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::models::subscription::{Subscription, SubscriptionStatus};
use crate::domain::repositories::subscription_repository::{
    RepositoryError, SubscriptionQuery, SubscriptionRepository,
};
use crate::infrastructure::database::entities::subscription::{self, SeaSubscriptionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// 订阅仓库实现
///
/// 基于SeaORM实现的订阅数据访问层
#[derive(Clone)]
pub struct SubscriptionRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepositoryImpl {
    /// 创建新的订阅仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<SubscriptionStatus> for SeaSubscriptionStatus {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Pending => SeaSubscriptionStatus::Pending,
            SubscriptionStatus::Active => SeaSubscriptionStatus::Active,
            SubscriptionStatus::Expired => SeaSubscriptionStatus::Expired,
            SubscriptionStatus::Failed => SeaSubscriptionStatus::Failed,
        }
    }
}

impl From<SeaSubscriptionStatus> for SubscriptionStatus {
    fn from(status: SeaSubscriptionStatus) -> Self {
        match status {
            SeaSubscriptionStatus::Pending => SubscriptionStatus::Pending,
            SeaSubscriptionStatus::Active => SubscriptionStatus::Active,
            SeaSubscriptionStatus::Expired => SubscriptionStatus::Expired,
            SeaSubscriptionStatus::Failed => SubscriptionStatus::Failed,
        }
    }
}

impl From<subscription::Model> for Subscription {
    fn from(model: subscription::Model) -> Self {
        Self {
            id: model.id,
            channel_id: model.channel_id,
            topic_url: model.topic_url,
            callback_url: model.callback_url,
            hub_url: model.hub_url,
            lease_seconds: model.lease_seconds,
            expires_at: model.expires_at,
            status: model.status.into(),
            secret: model.secret,
            last_verified_at: model.last_verified_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&Subscription> for subscription::ActiveModel {
    fn from(sub: &Subscription) -> Self {
        Self {
            id: Set(sub.id),
            channel_id: Set(sub.channel_id.clone()),
            topic_url: Set(sub.topic_url.clone()),
            callback_url: Set(sub.callback_url.clone()),
            hub_url: Set(sub.hub_url.clone()),
            lease_seconds: Set(sub.lease_seconds),
            expires_at: Set(sub.expires_at),
            status: Set(sub.status.into()),
            secret: Set(sub.secret.clone()),
            last_verified_at: Set(sub.last_verified_at),
            created_at: Set(sub.created_at),
            updated_at: Set(sub.updated_at),
        }
    }
}

/// 派生状态 `expired` 的查询条件：显式过期，或活跃但租约已失效
fn expired_condition(now: DateTime<Utc>) -> Condition {
    Condition::any()
        .add(subscription::Column::Status.eq(SeaSubscriptionStatus::Expired))
        .add(
            Condition::all()
                .add(subscription::Column::Status.eq(SeaSubscriptionStatus::Active))
                .add(subscription::Column::ExpiresAt.lt(now)),
        )
}

#[async_trait]
impl SubscriptionRepository for SubscriptionRepositoryImpl {
    async fn create(&self, sub: &Subscription) -> Result<Subscription, RepositoryError> {
        let active_model: subscription::ActiveModel = sub.into();

        subscription::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        Ok(sub.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError> {
        let model = subscription::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_channel_and_callback(
        &self,
        channel_id: &str,
        callback_url: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let model = subscription::Entity::find()
            .filter(subscription::Column::ChannelId.eq(channel_id))
            .filter(subscription::Column::CallbackUrl.eq(callback_url))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_topic(&self, topic_url: &str) -> Result<Vec<Subscription>, RepositoryError> {
        let models = subscription::Entity::find()
            .filter(subscription::Column::TopicUrl.eq(topic_url))
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(&self, sub: &Subscription) -> Result<Subscription, RepositoryError> {
        // Last write wins; the row must still exist
        let existing = subscription::Entity::find_by_id(sub.id)
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        let mut active: subscription::ActiveModel = existing.into();
        active.lease_seconds = Set(sub.lease_seconds);
        active.expires_at = Set(sub.expires_at);
        active.status = Set(sub.status.into());
        active.secret = Set(sub.secret.clone());
        active.last_verified_at = Set(sub.last_verified_at);
        active.updated_at = Set(sub.updated_at);

        let updated_model = active.update(self.db.as_ref()).await?;

        Ok(updated_model.into())
    }

    async fn list(&self, query: SubscriptionQuery) -> Result<Vec<Subscription>, RepositoryError> {
        let now = Utc::now();
        let mut select = subscription::Entity::find();

        select = match query.status {
            Some(SubscriptionStatus::Expired) => select.filter(expired_condition(now)),
            Some(SubscriptionStatus::Active) => select
                .filter(subscription::Column::Status.eq(SeaSubscriptionStatus::Active))
                .filter(subscription::Column::ExpiresAt.gte(now)),
            Some(status) => {
                select.filter(subscription::Column::Status.eq(SeaSubscriptionStatus::from(status)))
            }
            None => select,
        };

        let models = select
            .order_by_asc(subscription::Column::CreatedAt)
            .offset(query.offset)
            .limit(query.limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_expiring(
        &self,
        before: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        let mut models = subscription::Entity::find()
            .filter(subscription::Column::Status.eq(SeaSubscriptionStatus::Active))
            .filter(subscription::Column::ExpiresAt.lte(before))
            .order_by_asc(subscription::Column::ExpiresAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        let remaining = limit.saturating_sub(models.len() as u64);
        if remaining > 0 {
            let retries = subscription::Entity::find()
                .filter(
                    subscription::Column::Status
                        .is_in([SeaSubscriptionStatus::Failed, SeaSubscriptionStatus::Expired]),
                )
                .filter(subscription::Column::ExpiresAt.lte(before))
                .order_by_asc(subscription::Column::UpdatedAt)
                .limit(remaining)
                .all(self.db.as_ref())
                .await?;
            models.extend(retries);
        }

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn mark_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = subscription::Entity::update_many()
            .col_expr(
                subscription::Column::Status,
                Expr::value(SeaSubscriptionStatus::Expired),
            )
            .col_expr(subscription::Column::UpdatedAt, Expr::value(now))
            .filter(subscription::Column::Status.eq(SeaSubscriptionStatus::Active))
            .filter(subscription::Column::ExpiresAt.lt(now))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = subscription::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected > 0)
    }
}
