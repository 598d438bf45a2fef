// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 可编排结果的 hub 客户端，仅用于单元测试

use crate::domain::services::hub_client::{
    HubClient, HubError, HubMode, HubRequest, HubResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

/// 按主题URL返回预设结果，未设置的主题返回 202
#[derive(Default)]
pub struct ScriptedHubClient {
    failures: Mutex<HashMap<String, HubError>>,
    calls: Mutex<Vec<(HubMode, HubRequest)>>,
    delay: Option<Duration>,
}

impl ScriptedHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次调用前等待，模拟慢速 hub
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn fail_topic(&self, topic_url: &str, error: HubError) {
        self.failures.lock().insert(topic_url.to_string(), error);
    }

    pub fn calls(&self) -> Vec<(HubMode, HubRequest)> {
        self.calls.lock().clone()
    }

    async fn respond(&self, mode: HubMode, request: &HubRequest) -> Result<HubResponse, HubError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().push((mode, request.clone()));
        match self.failures.lock().get(&request.topic_url) {
            Some(error) => Err(error.clone()),
            None => Ok(HubResponse {
                accepted: true,
                status_code: 202,
                lease_seconds: None,
            }),
        }
    }
}

#[async_trait]
impl HubClient for ScriptedHubClient {
    async fn subscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError> {
        self.respond(HubMode::Subscribe, request).await
    }

    async fn unsubscribe(&self, request: &HubRequest) -> Result<HubResponse, HubError> {
        self.respond(HubMode::Unsubscribe, request).await
    }
}
