// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::subscription::{Subscription, SubscriptionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(DbErr),
    /// 违反唯一约束
    #[error("Record already exists")]
    Duplicate,
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Duplicate,
            _ => RepositoryError::Database(err),
        }
    }
}

/// 订阅查询参数
#[derive(Debug, Clone, Default)]
pub struct SubscriptionQuery {
    /// 按状态过滤；`Expired` 同时匹配租约已失效的 `active` 记录
    pub status: Option<SubscriptionStatus>,
    pub limit: u64,
    pub offset: u64,
}

/// 订阅仓库特质
///
/// 订阅记录的持久化边界。实现必须可并发使用，至少提供 last-write-wins 语义。
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// 创建订阅，(channel_id, callback_url) 冲突时返回 `Duplicate`
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, RepositoryError>;
    /// 根据ID查找订阅
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, RepositoryError>;
    async fn find_by_channel_and_callback(
        &self,
        channel_id: &str,
        callback_url: &str,
    ) -> Result<Option<Subscription>, RepositoryError>;
    /// 根据主题URL查找订阅
    async fn find_by_topic(&self, topic_url: &str) -> Result<Vec<Subscription>, RepositoryError>;
    /// 更新订阅
    async fn update(&self, subscription: &Subscription) -> Result<Subscription, RepositoryError>;
    /// 分页查询
    async fn list(&self, query: SubscriptionQuery) -> Result<Vec<Subscription>, RepositoryError>;
    /// 查找 `expires_at <= before` 的待续订订阅
    ///
    /// 先取 `active` 订阅，按过期时间升序；剩余名额再给 `failed` 与 `expired`
    /// 订阅，按上次更新时间升序，使重试在多次扫描间轮转。
    async fn find_expiring(
        &self,
        before: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Subscription>, RepositoryError>;
    /// 将租约已失效的 `active` 订阅写为 `expired`，返回受影响行数
    async fn mark_lapsed(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;
    /// 删除订阅，返回是否存在
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}
