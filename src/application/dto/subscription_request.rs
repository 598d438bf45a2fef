// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::hub_client::MAX_LEASE_SECONDS;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// 创建订阅请求
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateSubscriptionRequest {
    /// YouTube 频道ID，例如 `UC_x5XG1OV2P6uZZ5FSM9Ttw`
    #[validate(length(min = 1, max = 64), custom(function = "validate_channel_id"))]
    pub channel_id: String,
    /// 请求的租约（秒），缺省使用配置中的默认值
    #[validate(range(min = 1, max = MAX_LEASE_SECONDS))]
    pub lease_seconds: Option<i64>,
}

/// 频道ID只允许字母、数字、`-` 和 `_`
fn validate_channel_id(channel_id: &str) -> Result<(), ValidationError> {
    if channel_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_channel_id"))
    }
}

/// 订阅列表查询
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListSubscriptionsQuery {
    /// pending / active / expired / failed
    pub status: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
