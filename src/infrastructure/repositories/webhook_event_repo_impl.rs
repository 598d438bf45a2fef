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

use crate::domain::models::webhook_event::{ProcessingOutcome, WebhookEvent};
use crate::domain::repositories::subscription_repository::RepositoryError;
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use crate::infrastructure::database::entities::webhook_event;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use std::sync::Arc;
use uuid::Uuid;

/// Webhook事件仓库实现
#[derive(Clone)]
pub struct WebhookEventRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookEventRepoImpl {
    /// 创建新的Webhook事件仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WebhookEventRepository for WebhookEventRepoImpl {
    async fn insert_new(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError> {
        let active_model = webhook_event::ActiveModel {
            id: Set(event.id),
            raw_body: Set(event.raw_body.clone()),
            content_hash: Set(event.content_hash.clone()),
            received_at: Set(event.received_at),
            processed: Set(event.processed),
            processing_error: Set(event.processing_error.clone()),
            video_id: Set(event.video_id.clone()),
            channel_id: Set(event.channel_id.clone()),
            created_at: Set(event.created_at),
        };

        // A unique violation on content_hash surfaces as RepositoryError::Duplicate
        webhook_event::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        Ok(event.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEvent>, RepositoryError> {
        let model = webhook_event::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn find_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<WebhookEvent>, RepositoryError> {
        let model = webhook_event::Entity::find()
            .filter(webhook_event::Column::ContentHash.eq(content_hash))
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn record_outcome(
        &self,
        id: Uuid,
        outcome: &ProcessingOutcome,
    ) -> Result<(), RepositoryError> {
        // Only the processing columns are written; the received fields stay untouched
        let result = webhook_event::Entity::update_many()
            .col_expr(webhook_event::Column::Processed, Expr::value(outcome.processed))
            .col_expr(
                webhook_event::Column::ProcessingError,
                Expr::value(outcome.error.clone()),
            )
            .col_expr(
                webhook_event::Column::VideoId,
                Expr::value(outcome.video_id.clone()),
            )
            .col_expr(
                webhook_event::Column::ChannelId,
                Expr::value(outcome.channel_id.clone()),
            )
            .filter(webhook_event::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl From<webhook_event::Model> for WebhookEvent {
    fn from(model: webhook_event::Model) -> Self {
        Self {
            id: model.id,
            raw_body: model.raw_body,
            content_hash: model.content_hash,
            received_at: model.received_at,
            processed: model.processed,
            processing_error: model.processing_error,
            video_id: model.video_id,
            channel_id: model.channel_id,
            created_at: model.created_at,
        }
    }
}
