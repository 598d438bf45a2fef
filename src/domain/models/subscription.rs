// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::hub_client::MAX_LEASE_SECONDS;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// YouTube 视频更新 feed 的基础地址
const YOUTUBE_FEED_BASE: &str = "https://www.youtube.com/xml/feeds/videos.xml";

/// 根据频道ID生成订阅主题URL
///
/// 纯函数，相同的频道ID总是得到相同的主题URL，保证重启后订阅身份可复现。
pub fn topic_url_for_channel(channel_id: &str) -> String {
    match Url::parse_with_params(YOUTUBE_FEED_BASE, &[("channel_id", channel_id)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?channel_id={}", YOUTUBE_FEED_BASE, channel_id),
    }
}

/// 订阅实体
///
/// 表示一个针对 hub 的频道订阅。过期时间总是等于最近一次创建或
/// 成功续订的时间加上租约时长。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// 订阅唯一标识符
    pub id: Uuid,
    /// 频道ID
    pub channel_id: String,
    /// 主题URL，由频道ID确定性地生成
    pub topic_url: String,
    /// 回调URL，hub 推送通知的目标地址
    pub callback_url: String,
    /// hub 地址
    pub hub_url: String,
    /// 租约时长（秒）
    pub lease_seconds: i64,
    /// 过期时间
    pub expires_at: DateTime<Utc>,
    /// 生命周期状态
    pub status: SubscriptionStatus,
    /// 共享密钥，hub 用于签名推送内容
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// 最近一次 hub 验证回调的时间
    pub last_verified_at: Option<DateTime<Utc>>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// 创建一个处于 `pending` 状态的新订阅
    pub fn new(
        channel_id: String,
        callback_url: String,
        hub_url: String,
        lease_seconds: i64,
        secret: Option<String>,
    ) -> Self {
        Self::new_at(
            channel_id,
            callback_url,
            hub_url,
            lease_seconds,
            secret,
            Utc::now(),
        )
    }

    pub fn new_at(
        channel_id: String,
        callback_url: String,
        hub_url: String,
        lease_seconds: i64,
        secret: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_url: topic_url_for_channel(&channel_id),
            channel_id,
            callback_url,
            hub_url,
            lease_seconds,
            expires_at: now + Duration::seconds(lease_seconds),
            status: SubscriptionStatus::Pending,
            secret,
            last_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// hub 接受订阅（或续订）
    ///
    /// 过期时间从 `now` 起重新计算，而不是从创建时间起累加。
    /// `negotiated_lease` 为 hub 协商后的租约时长（如有）。
    pub fn mark_active(&mut self, now: DateTime<Utc>, negotiated_lease: Option<i64>) {
        if !self.transition(SubscriptionStatus::Active, now) {
            return;
        }
        if let Some(lease) = bounded_lease(negotiated_lease) {
            self.lease_seconds = lease;
        }
        self.expires_at = now + Duration::seconds(self.lease_seconds);
    }

    /// hub 拒绝或请求出错
    pub fn mark_failed(&mut self, now: DateTime<Utc>) {
        self.transition(SubscriptionStatus::Failed, now);
    }

    /// 将租约已失效的活跃订阅标记为过期
    ///
    /// 只有 `active` 可以转为 `expired`，返回是否发生了转换。
    pub fn mark_expired(&mut self, now: DateTime<Utc>) -> bool {
        self.is_lapsed(now) && self.transition(SubscriptionStatus::Expired, now)
    }

    /// 记录 hub 的验证回调
    ///
    /// 如果 hub 在验证时给出了租约时长，活跃订阅的过期时间按新租约重新计算。
    pub fn record_verification(&mut self, now: DateTime<Utc>, lease_seconds: Option<i64>) {
        self.last_verified_at = Some(now);
        if let Some(lease) = bounded_lease(lease_seconds) {
            self.lease_seconds = lease;
            if self.status == SubscriptionStatus::Active {
                self.expires_at = now + Duration::seconds(lease);
            }
        }
        self.updated_at = now;
    }

    fn transition(&mut self, next: SubscriptionStatus, now: DateTime<Utc>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.updated_at = now;
        true
    }

    /// 状态为 `active` 但租约已过期
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at < now
    }

    /// 派生状态：租约失效的活跃订阅视为 `expired`
    pub fn effective_status(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if self.is_lapsed(now) {
            SubscriptionStatus::Expired
        } else {
            self.status
        }
    }

    /// 是否落在续订窗口内
    pub fn needs_renewal(&self, now: DateTime<Utc>, lookahead: Duration) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Active | SubscriptionStatus::Failed
        ) && self.expires_at <= now + lookahead
    }
}

/// 外部给出的租约：非正值忽略，超过上限的截断为 [`MAX_LEASE_SECONDS`]
fn bounded_lease(lease: Option<i64>) -> Option<i64> {
    lease.filter(|l| *l > 0).map(|l| l.min(MAX_LEASE_SECONDS))
}

/// 订阅状态枚举
///
/// 状态转换：
/// Pending → Active/Failed，Active ⇄ Failed，Active → Expired，Expired → Active/Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// 已发起订阅，等待 hub 响应
    #[default]
    Pending,
    /// hub 已接受
    Active,
    /// 租约失效且未成功续订
    Expired,
    /// hub 拒绝或请求出错
    Failed,
}

impl SubscriptionStatus {
    pub fn can_transition_to(self, next: SubscriptionStatus) -> bool {
        use SubscriptionStatus::*;
        match (self, next) {
            (_, Pending) => false,
            (Active, Expired) => true,
            (_, Expired) => false,
            (_, Active) | (_, Failed) => true,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubscriptionStatus::Pending => write!(f, "pending"),
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown subscription status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SubscriptionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubscriptionStatus::Pending),
            "active" => Ok(SubscriptionStatus::Active),
            "expired" => Ok(SubscriptionStatus::Expired),
            "failed" => Ok(SubscriptionStatus::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
