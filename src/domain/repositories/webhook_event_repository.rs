// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::subscription_repository::RepositoryError;
use crate::domain::models::webhook_event::{ProcessingOutcome, WebhookEvent};
use async_trait::async_trait;
use uuid::Uuid;

/// Webhook事件仓库特质
///
/// 只追加的审计存储。没有删除接口；`insert_new` 依赖内容指纹上的唯一约束
/// 原子地完成去重，重复时返回 `RepositoryError::Duplicate`。
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// 插入新事件
    async fn insert_new(&self, event: &WebhookEvent) -> Result<WebhookEvent, RepositoryError>;
    /// 根据ID查找事件
    async fn find_by_id(&self, id: Uuid) -> Result<Option<WebhookEvent>, RepositoryError>;
    /// 根据内容指纹查找事件
    async fn find_by_content_hash(
        &self,
        content_hash: &str,
    ) -> Result<Option<WebhookEvent>, RepositoryError>;
    /// 写入处理结果
    async fn record_outcome(
        &self,
        id: Uuid,
        outcome: &ProcessingOutcome,
    ) -> Result<(), RepositoryError>;
}
