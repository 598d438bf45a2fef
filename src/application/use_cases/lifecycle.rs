// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 订阅握手结果的落库逻辑
//!
//! 手动订阅、手动续订和后台扫描共用同一套状态转换。

use crate::domain::models::subscription::Subscription;
use crate::domain::repositories::subscription_repository::{
    RepositoryError, SubscriptionRepository,
};
use crate::domain::services::hub_client::{HubError, HubRequest, HubResponse};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

/// 握手错误
///
/// hub 错误与持久化错误分开；hub 已失败时持久化错误只记录日志。
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error(transparent)]
    Hub(#[from] HubError),
    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

/// 由订阅记录生成 hub 请求
pub fn hub_request(subscription: &Subscription) -> HubRequest {
    HubRequest {
        hub_url: subscription.hub_url.clone(),
        topic_url: subscription.topic_url.clone(),
        callback_url: subscription.callback_url.clone(),
        lease_seconds: subscription.lease_seconds,
        secret: subscription.secret.clone(),
    }
}

/// 根据 hub 调用结果更新订阅并持久化
///
/// - 接受：`active`，过期时间从 `now` 起按租约重新计算
/// - 拒绝或传输错误：`failed`；若此时写库失败，仍返回原始 hub 错误
pub async fn apply_hub_result(
    repo: &dyn SubscriptionRepository,
    subscription: &mut Subscription,
    result: Result<HubResponse, HubError>,
    now: DateTime<Utc>,
) -> Result<HubResponse, HandshakeError> {
    match result {
        Ok(response) => {
            subscription.mark_active(now, response.lease_seconds);
            repo.update(subscription).await?;
            info!(
                subscription_id = %subscription.id,
                channel_id = %subscription.channel_id,
                status_code = response.status_code,
                expires_at = %subscription.expires_at,
                "Hub accepted subscription"
            );
            Ok(response)
        }
        Err(hub_error) => {
            subscription.mark_failed(now);
            warn!(
                subscription_id = %subscription.id,
                channel_id = %subscription.channel_id,
                error = %hub_error,
                "Hub handshake failed"
            );
            if let Err(persist_error) = repo.update(subscription).await {
                error!(
                    subscription_id = %subscription.id,
                    error = %persist_error,
                    "Failed to persist failed status after hub error"
                );
            }
            Err(HandshakeError::Hub(hub_error))
        }
    }
}
