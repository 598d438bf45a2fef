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

use crate::application::use_cases::subscription_use_case::{
    SubscriptionService, VerificationIntent,
};
use crate::application::use_cases::webhook_pipeline::{
    PipelineError, PipelineOutcome, WebhookPipeline,
};
use crate::domain::services::signature::SIGNATURE_HEADER;
use crate::presentation::errors::AppError;
use axum::{
    body::Bytes,
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// hub 验证回调参数
#[derive(Debug, Default, Deserialize)]
pub struct VerificationQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.topic")]
    pub topic: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.lease_seconds")]
    pub lease_seconds: Option<String>,
    #[serde(rename = "hub.reason")]
    pub reason: Option<String>,
}

impl VerificationQuery {
    fn intent(&self) -> Option<VerificationIntent> {
        let topic_url = self.topic.clone()?;
        match self.mode.as_deref()? {
            "subscribe" => Some(VerificationIntent::Subscribe {
                topic_url,
                lease_seconds: self
                    .lease_seconds
                    .as_deref()
                    .and_then(|s| s.parse().ok()),
            }),
            "unsubscribe" => Some(VerificationIntent::Unsubscribe { topic_url }),
            "denied" => Some(VerificationIntent::Denied {
                topic_url,
                reason: self.reason.clone(),
            }),
            _ => None,
        }
    }
}

/// GET：hub 验证握手
///
/// 原样回显 `hub.challenge`。验证意图只用于更新订阅记录，存储错误不影响回显。
pub async fn verify_subscription(
    Extension(subscriptions): Extension<Arc<SubscriptionService>>,
    Query(query): Query<VerificationQuery>,
) -> Response {
    let intent = query.intent();
    let challenge = query.challenge.filter(|c| !c.is_empty());
    let denied = matches!(intent, Some(VerificationIntent::Denied { .. }));

    if challenge.is_none() && !denied {
        return (StatusCode::BAD_REQUEST, "missing hub.challenge").into_response();
    }

    if let Some(intent) = intent {
        if let Err(e) = subscriptions.confirm_verification(intent).await {
            warn!("Failed to record hub verification: {}", e);
        }
    }

    match challenge {
        Some(challenge) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            challenge,
        )
            .into_response(),
        None => StatusCode::OK.into_response(),
    }
}

/// POST：hub 推送通知
pub async fn receive_notification(
    Extension(pipeline): Extension<Arc<WebhookPipeline>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|value| value.as_bytes());

    let response = match pipeline.process(&body, signature).await {
        Ok(PipelineOutcome::Accepted { event_id, .. }) => {
            json!({ "status": "accepted", "event_id": event_id })
        }
        Ok(PipelineOutcome::Malformed { event_id, error }) => json!({
            "status": "malformed",
            "event_id": event_id,
            "error": error.to_string(),
            "field": error.field(),
        }),
        Ok(PipelineOutcome::Deferred { event_id, .. }) => {
            json!({ "status": "deferred", "event_id": event_id })
        }
        Err(PipelineError::DuplicateEvent { content_hash }) => {
            info!(fingerprint = %content_hash, "Acknowledging duplicate notification");
            json!({ "status": "duplicate" })
        }
        Err(e) => return Err(e.into()),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
