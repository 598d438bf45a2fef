// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::subscription::{Subscription, SubscriptionStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// 订阅响应
///
/// `status` 为派生状态：租约已失效的 `active` 记录显示为 `expired`。
/// 共享密钥不会出现在响应中。
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub channel_id: String,
    pub topic_url: String,
    pub callback_url: String,
    pub hub_url: String,
    pub lease_seconds: i64,
    pub expires_at: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub last_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionResponse {
    pub fn from_subscription(subscription: Subscription, now: DateTime<Utc>) -> Self {
        Self {
            status: subscription.effective_status(now),
            id: subscription.id,
            channel_id: subscription.channel_id,
            topic_url: subscription.topic_url,
            callback_url: subscription.callback_url,
            hub_url: subscription.hub_url,
            lease_seconds: subscription.lease_seconds,
            expires_at: subscription.expires_at,
            last_verified_at: subscription.last_verified_at,
            created_at: subscription.created_at,
            updated_at: subscription.updated_at,
        }
    }
}

/// 删除订阅的结果
#[derive(Debug, Clone, Serialize)]
pub struct UnsubscribeResponse {
    pub id: Uuid,
    pub deleted: bool,
    /// hub 是否接受了退订请求
    pub unsubscribed: bool,
    pub hub_status: Option<u16>,
    pub hub_error: Option<String>,
}
