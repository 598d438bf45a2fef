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

use crate::{
    application::{
        dto::{
            subscription_request::{CreateSubscriptionRequest, ListSubscriptionsQuery},
            subscription_response::UnsubscribeResponse,
        },
        use_cases::lifecycle::{apply_hub_result, hub_request, HandshakeError},
    },
    config::settings::HubSettings,
    domain::{
        models::subscription::{Subscription, SubscriptionStatus},
        repositories::subscription_repository::{
            RepositoryError, SubscriptionQuery, SubscriptionRepository,
        },
        services::hub_client::{validate_lease, HubClient, HubError, MAX_LEASE_SECONDS},
    },
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

const DEFAULT_PAGE_SIZE: u64 = 50;

#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error("Validation failed: {0}")]
    InvalidRequest(String),
    #[error("Subscription not found")]
    NotFound,
    #[error(transparent)]
    Hub(HubError),
    #[error("Repository error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<HandshakeError> for SubscriptionError {
    fn from(err: HandshakeError) -> Self {
        match err {
            HandshakeError::Hub(e) => SubscriptionError::Hub(e),
            HandshakeError::Persistence(e) => SubscriptionError::Persistence(e),
        }
    }
}

/// 新订阅所用的 hub 参数
#[derive(Debug, Clone)]
pub struct SubscriptionDefaults {
    pub hub_url: String,
    pub callback_url: String,
    pub secret: Option<String>,
    pub default_lease_seconds: i64,
    pub max_lease_seconds: i64,
}

impl From<&HubSettings> for SubscriptionDefaults {
    fn from(settings: &HubSettings) -> Self {
        Self {
            hub_url: settings.hub_url.clone(),
            callback_url: settings.callback_url.clone(),
            secret: settings.secret(),
            default_lease_seconds: settings.default_lease_seconds,
            max_lease_seconds: settings.max_lease_seconds.min(MAX_LEASE_SECONDS),
        }
    }
}

/// hub 验证回调中的意图
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationIntent {
    Subscribe {
        topic_url: String,
        lease_seconds: Option<i64>,
    },
    Unsubscribe {
        topic_url: String,
    },
    Denied {
        topic_url: String,
        reason: Option<String>,
    },
}

/// 订阅管理用例
pub struct SubscriptionService {
    repo: Arc<dyn SubscriptionRepository>,
    hub: Arc<dyn HubClient>,
    defaults: SubscriptionDefaults,
}

impl SubscriptionService {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        hub: Arc<dyn HubClient>,
        defaults: SubscriptionDefaults,
    ) -> Self {
        Self {
            repo,
            hub,
            defaults,
        }
    }

    /// 订阅频道
    ///
    /// 先以 `pending` 落库再发起握手；已存在的 (频道, 回调) 组合重新握手。
    /// hub 失败时记录保持为 `failed`，错误原样返回。
    pub async fn subscribe(
        &self,
        dto: CreateSubscriptionRequest,
    ) -> Result<Subscription, SubscriptionError> {
        dto.validate()
            .map_err(|e| SubscriptionError::InvalidRequest(e.to_string()))?;

        let lease_seconds = dto
            .lease_seconds
            .unwrap_or(self.defaults.default_lease_seconds);
        validate_lease(lease_seconds, self.defaults.max_lease_seconds)
            .map_err(|e| SubscriptionError::InvalidRequest(e.to_string()))?;

        let existing = self
            .repo
            .find_by_channel_and_callback(&dto.channel_id, &self.defaults.callback_url)
            .await?;

        let mut subscription = match existing {
            Some(mut subscription) => {
                info!(
                    subscription_id = %subscription.id,
                    channel_id = %subscription.channel_id,
                    "Re-subscribing existing channel"
                );
                subscription.lease_seconds = lease_seconds;
                subscription.secret = self.defaults.secret.clone();
                subscription
            }
            None => {
                let subscription = Subscription::new(
                    dto.channel_id,
                    self.defaults.callback_url.clone(),
                    self.defaults.hub_url.clone(),
                    lease_seconds,
                    self.defaults.secret.clone(),
                );
                self.repo.create(&subscription).await?
            }
        };

        let result = self.hub.subscribe(&hub_request(&subscription)).await;
        apply_hub_result(self.repo.as_ref(), &mut subscription, result, Utc::now()).await?;
        Ok(subscription)
    }

    /// 手动续订单个订阅
    pub async fn renew(&self, id: Uuid) -> Result<Subscription, SubscriptionError> {
        let mut subscription = self.get(id).await?;
        let result = self.hub.subscribe(&hub_request(&subscription)).await;
        apply_hub_result(self.repo.as_ref(), &mut subscription, result, Utc::now()).await?;
        Ok(subscription)
    }

    /// 退订并删除本地记录
    ///
    /// 退订失败不阻止删除，远端订阅会随租约到期自行失效。
    pub async fn unsubscribe_and_delete(
        &self,
        id: Uuid,
    ) -> Result<UnsubscribeResponse, SubscriptionError> {
        let subscription = self.get(id).await?;

        let (unsubscribed, hub_status, hub_error) =
            match self.hub.unsubscribe(&hub_request(&subscription)).await {
                Ok(response) => (response.accepted, Some(response.status_code), None),
                Err(e) => {
                    warn!(
                        subscription_id = %id,
                        error = %e,
                        "Unsubscribe failed; deleting local record anyway"
                    );
                    let status = match &e {
                        HubError::SubscriptionFailed { status, .. } => Some(*status),
                        _ => None,
                    };
                    (false, status, Some(e.to_string()))
                }
            };

        let deleted = self.repo.delete(id).await?;
        info!(subscription_id = %id, unsubscribed, "Subscription deleted");

        Ok(UnsubscribeResponse {
            id,
            deleted,
            unsubscribed,
            hub_status,
            hub_error,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Subscription, SubscriptionError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(SubscriptionError::NotFound)
    }

    pub async fn list(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<Vec<Subscription>, SubscriptionError> {
        query
            .validate()
            .map_err(|e| SubscriptionError::InvalidRequest(e.to_string()))?;

        let status = query
            .status
            .as_deref()
            .map(str::parse::<SubscriptionStatus>)
            .transpose()
            .map_err(|e| SubscriptionError::InvalidRequest(e.to_string()))?;

        Ok(self
            .repo
            .list(SubscriptionQuery {
                status,
                limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                offset: query.offset.unwrap_or(0),
            })
            .await?)
    }

    /// 处理 hub 的验证回调
    ///
    /// 返回匹配到的订阅数。
    pub async fn confirm_verification(
        &self,
        intent: VerificationIntent,
    ) -> Result<usize, SubscriptionError> {
        let now = Utc::now();
        match intent {
            VerificationIntent::Subscribe {
                topic_url,
                lease_seconds,
            } => {
                let matches = self.repo.find_by_topic(&topic_url).await?;
                for mut subscription in matches.iter().cloned() {
                    subscription.record_verification(now, lease_seconds);
                    self.repo.update(&subscription).await?;
                    info!(
                        subscription_id = %subscription.id,
                        lease_seconds = subscription.lease_seconds,
                        "Hub verified subscription"
                    );
                }
                Ok(matches.len())
            }
            VerificationIntent::Unsubscribe { topic_url } => {
                let matches = self.repo.find_by_topic(&topic_url).await?;
                info!(topic = %topic_url, matched = matches.len(), "Hub verified unsubscribe");
                Ok(matches.len())
            }
            VerificationIntent::Denied { topic_url, reason } => {
                let matches = self.repo.find_by_topic(&topic_url).await?;
                for mut subscription in matches.iter().cloned() {
                    subscription.mark_failed(now);
                    self.repo.update(&subscription).await?;
                    warn!(
                        subscription_id = %subscription.id,
                        reason = reason.as_deref().unwrap_or(""),
                        "Hub denied subscription"
                    );
                }
                Ok(matches.len())
            }
        }
    }
}

#[cfg(test)]
#[path = "subscription_use_case_test.rs"]
mod tests;
