// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::services::hub_client::{
    validate_lease, HubClient, HubError, HubMode, HubRequest, HubResponse, MAX_LEASE_SECONDS,
};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{header, Client};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// hub 客户端实现
///
/// 以表单 POST 调用 hub 的 subscribe/unsubscribe。
pub struct HubClientImpl {
    /// HTTP 客户端
    client: Client,
    /// 允许的最大租约
    max_lease_seconds: i64,
}

impl HubClientImpl {
    /// 创建新的 hub 客户端
    ///
    /// # 参数
    ///
    /// * `timeout` - 单次请求超时
    /// * `max_lease_seconds` - 客户端侧的租约上限，不超过 hub 的固定上限
    pub fn new(timeout: Duration, max_lease_seconds: i64) -> Result<Self, HubError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("ytpush/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            max_lease_seconds: max_lease_seconds.min(MAX_LEASE_SECONDS),
        })
    }

    async fn send(&self, mode: HubMode, request: &HubRequest) -> Result<HubResponse, HubError> {
        validate_lease(request.lease_seconds, self.max_lease_seconds)?;

        let lease = request.lease_seconds.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("hub.mode", mode.as_str()),
            ("hub.topic", request.topic_url.as_str()),
            ("hub.callback", request.callback_url.as_str()),
            ("hub.lease_seconds", lease.as_str()),
        ];
        if let Some(secret) = request.secret.as_deref().filter(|s| !s.is_empty()) {
            form.push(("hub.secret", secret));
        }

        debug!(
            mode = %mode,
            hub = %request.hub_url,
            topic = %request.topic_url,
            "Sending hub request"
        );
        let start = Instant::now();

        let response = self
            .client
            .post(&request.hub_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                counter!("hub_requests_total", "mode" => mode.as_str(), "result" => "transport_error")
                    .increment(1);
                HubError::Transport(e.to_string())
            })?;

        histogram!("hub_request_duration_seconds", "mode" => mode.as_str())
            .record(start.elapsed().as_secs_f64());

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            counter!("hub_requests_total", "mode" => mode.as_str(), "result" => "accepted")
                .increment(1);
            Ok(HubResponse {
                accepted: true,
                status_code: status.as_u16(),
                lease_seconds: negotiated_lease(&body),
            })
        } else {
            counter!("hub_requests_total", "mode" => mode.as_str(), "result" => "rejected")
                .increment(1);
            warn!(
                mode = %mode,
                status = status.as_u16(),
                topic = %request.topic_url,
                "Hub rejected request"
            );
            Err(HubError::SubscriptionFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// 从响应体中读取协商后的租约（form 编码，可选）
fn negotiated_lease(body: &str) -> Option<i64> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .find(|(key, _)| key == "hub.lease_seconds")
        .and_then(|(_, value)| value.parse().ok())
}

#[async_trait]
impl HubClient for HubClientImpl {
    async fn subscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError> {
        self.send(HubMode::Subscribe, request).await
    }

    async fn unsubscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError> {
        self.send(HubMode::Unsubscribe, request).await
    }
}
