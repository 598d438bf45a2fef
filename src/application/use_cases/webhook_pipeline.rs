// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::feed_entry::FeedNotification;
use crate::domain::models::webhook_event::{ProcessingOutcome, WebhookEvent};
use crate::domain::repositories::subscription_repository::RepositoryError;
use crate::domain::repositories::webhook_event_repository::WebhookEventRepository;
use crate::domain::services::feed_decoder::{DecodeError, FeedDecoder};
use crate::domain::services::feed_handler::FeedEntryHandler;
use crate::domain::services::fingerprint::content_fingerprint;
use crate::domain::services::signature::{SignatureError, SignatureVerifier};
use chrono::Utc;
use metrics::counter;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 推送处理错误
///
/// 这些错误会中止处理；解码错误不在此列，它会被记录到审计行中。
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("signature verification failed: {0}")]
    Signature(#[from] SignatureError),
    #[error("duplicate event: {content_hash}")]
    DuplicateEvent { content_hash: String },
    #[error("persistence error: {0}")]
    Persistence(#[source] RepositoryError),
}

/// 推送处理结果
#[derive(Debug)]
pub enum PipelineOutcome {
    /// 解码成功并已交给下游
    Accepted {
        event_id: Uuid,
        notification: FeedNotification,
    },
    /// 负载无法解码，原始内容已连同错误记录
    Malformed { event_id: Uuid, error: DecodeError },
    /// 解码成功但下游处理失败，审计行保持未处理
    Deferred { event_id: Uuid, error: String },
}

impl PipelineOutcome {
    pub fn event_id(&self) -> Uuid {
        match self {
            PipelineOutcome::Accepted { event_id, .. }
            | PipelineOutcome::Malformed { event_id, .. }
            | PipelineOutcome::Deferred { event_id, .. } => *event_id,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PipelineOutcome::Accepted { .. } => "accepted",
            PipelineOutcome::Malformed { .. } => "malformed",
            PipelineOutcome::Deferred { .. } => "deferred",
        }
    }
}

/// 推送处理流水线
///
/// 顺序固定：签名校验 → 指纹去重（写入审计行）→ 解码 → 下游处理。
/// 未通过校验的字节不会被持久化或解析；重复内容在解码前被拦下。
pub struct WebhookPipeline {
    verifier: SignatureVerifier,
    decoder: FeedDecoder,
    events: Arc<dyn WebhookEventRepository>,
    handler: Arc<dyn FeedEntryHandler>,
}

impl WebhookPipeline {
    pub fn new(
        verifier: SignatureVerifier,
        events: Arc<dyn WebhookEventRepository>,
        handler: Arc<dyn FeedEntryHandler>,
    ) -> Self {
        Self {
            verifier,
            decoder: FeedDecoder::new(),
            events,
            handler,
        }
    }

    pub async fn process(
        &self,
        body: &[u8],
        signature: Option<&[u8]>,
    ) -> Result<PipelineOutcome, PipelineError> {
        if let Err(e) = self.verifier.verify_header(body, signature) {
            counter!("webhook_notifications_total", "outcome" => "rejected_signature")
                .increment(1);
            warn!(error = %e, "Rejected notification with bad signature");
            return Err(e.into());
        }
        if self.verifier.is_disabled() {
            debug!("Signature verification disabled; accepting unsigned notification");
        }

        let content_hash = content_fingerprint(body);
        let event = WebhookEvent::new(body.to_vec(), content_hash.clone(), Utc::now());

        match self.events.insert_new(&event).await {
            Ok(_) => {}
            Err(RepositoryError::Duplicate) => {
                counter!("webhook_notifications_total", "outcome" => "duplicate").increment(1);
                info!(fingerprint = %content_hash, "Duplicate notification ignored");
                return Err(PipelineError::DuplicateEvent { content_hash });
            }
            Err(e) => return Err(PipelineError::Persistence(e)),
        }

        let outcome = match self.decoder.decode_bytes(body) {
            Ok(notification) => self.hand_off(event.id, notification).await?,
            Err(error) => {
                warn!(
                    event_id = %event.id,
                    fingerprint = %content_hash,
                    error = %error,
                    "Malformed notification recorded"
                );
                self.record(event.id, &ProcessingOutcome::rejected(error.to_string()))
                    .await?;
                PipelineOutcome::Malformed {
                    event_id: event.id,
                    error,
                }
            }
        };

        counter!("webhook_notifications_total", "outcome" => outcome.label()).increment(1);
        Ok(outcome)
    }

    async fn hand_off(
        &self,
        event_id: Uuid,
        notification: FeedNotification,
    ) -> Result<PipelineOutcome, PipelineError> {
        let video_id = notification.video_id().map(str::to_string);
        let channel_id = notification.channel_id().map(str::to_string);

        match self.handler.handle(event_id, &notification).await {
            Ok(()) => {
                self.record(event_id, &ProcessingOutcome::succeeded(video_id, channel_id))
                    .await?;
                Ok(PipelineOutcome::Accepted {
                    event_id,
                    notification,
                })
            }
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(%event_id, error = %error, "Downstream handler failed");
                let mut outcome = ProcessingOutcome::failed(error.clone());
                outcome.video_id = video_id;
                outcome.channel_id = channel_id;
                self.record(event_id, &outcome).await?;
                Ok(PipelineOutcome::Deferred { event_id, error })
            }
        }
    }

    async fn record(&self, event_id: Uuid, outcome: &ProcessingOutcome) -> Result<(), PipelineError> {
        self.events
            .record_outcome(event_id, outcome)
            .await
            .map_err(PipelineError::Persistence)
    }
}

#[cfg(test)]
#[path = "webhook_pipeline_test.rs"]
mod tests;
