// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::feed_entry::FeedNotification;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// 下游处理特质
///
/// 接收每条成功解码的通知。实现返回错误时，审计记录保持 `processed = false`。
#[async_trait]
pub trait FeedEntryHandler: Send + Sync {
    async fn handle(&self, event_id: Uuid, notification: &FeedNotification) -> anyhow::Result<()>;
}

/// 只记录日志的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFeedEntryHandler;

#[async_trait]
impl FeedEntryHandler for LoggingFeedEntryHandler {
    async fn handle(&self, event_id: Uuid, notification: &FeedNotification) -> anyhow::Result<()> {
        match notification {
            FeedNotification::Entry(entry) => info!(
                %event_id,
                video_id = %entry.video_id,
                channel_id = %entry.channel_id,
                title = %entry.title,
                "Video update received"
            ),
            FeedNotification::Deleted(notice) => info!(
                %event_id,
                entry_ref = notice.entry_ref.as_deref().unwrap_or(""),
                "Video deletion received"
            ),
        }
        Ok(())
    }
}
