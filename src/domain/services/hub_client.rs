// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// hub 允许的最大租约时长（秒），超出的请求在客户端直接拒绝
pub const MAX_LEASE_SECONDS: i64 = 864_000;

/// hub 协议动词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubMode {
    Subscribe,
    Unsubscribe,
}

impl HubMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HubMode::Subscribe => "subscribe",
            HubMode::Unsubscribe => "unsubscribe",
        }
    }
}

impl fmt::Display for HubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订阅/退订请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubRequest {
    pub hub_url: String,
    pub topic_url: String,
    pub callback_url: String,
    pub lease_seconds: i64,
    pub secret: Option<String>,
}

/// hub 同步响应
///
/// 2xx（包括 202 "已接受，异步验证"）即视为接受；真正的确认随后以
/// GET 验证回调的形式到达。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubResponse {
    pub accepted: bool,
    pub status_code: u16,
    /// hub 协商后的租约时长（如响应中携带）
    pub lease_seconds: Option<i64>,
}

/// hub 调用错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// hub 返回非 2xx，调用方可修正
    #[error("subscription failed: hub returned {status}: {body}")]
    SubscriptionFailed { status: u16, body: String },
    /// 网络错误或 hub 不可达，可重试
    #[error("transport error: {0}")]
    Transport(String),
    /// 租约时长超出允许范围，未发出请求
    #[error("invalid lease: {requested}s (allowed 1..={max}s)")]
    InvalidLease { requested: i64, max: i64 },
}

impl HubError {
    pub fn is_transient(&self) -> bool {
        matches!(self, HubError::Transport(_))
    }
}

/// hub 协议客户端
#[async_trait]
pub trait HubClient: Send + Sync {
    async fn subscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError>;
    async fn unsubscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError>;
}

/// 校验租约时长
pub fn validate_lease(lease_seconds: i64, max: i64) -> Result<(), HubError> {
    if lease_seconds <= 0 || lease_seconds > max {
        return Err(HubError::InvalidLease {
            requested: lease_seconds,
            max,
        });
    }
    Ok(())
}
