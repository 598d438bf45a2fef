// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// 解码后的视频条目
///
/// 每次通知解码时新建，交给下游处理后即丢弃，不在本层持久化。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedFeedEntry {
    pub video_id: String,
    pub channel_id: String,
    pub title: String,
    /// 规范观看地址，缺少 link 元素时由视频ID生成
    pub url: String,
    pub published_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 删除通知（Atom tombstone）
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DeletionNotice {
    /// tombstone 的 `ref` 属性，原样保留
    pub entry_ref: Option<String>,
    /// tombstone 的 `when` 属性，原样保留
    pub deleted_at: Option<String>,
}

/// hub 推送内容的两种形态
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedNotification {
    Entry(DecodedFeedEntry),
    Deleted(DeletionNotice),
}

impl FeedNotification {
    pub fn is_deletion(&self) -> bool {
        matches!(self, FeedNotification::Deleted(_))
    }

    pub fn entry(&self) -> Option<&DecodedFeedEntry> {
        match self {
            FeedNotification::Entry(entry) => Some(entry),
            FeedNotification::Deleted(_) => None,
        }
    }

    pub fn video_id(&self) -> Option<&str> {
        self.entry().map(|e| e.video_id.as_str())
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.entry().map(|e| e.channel_id.as_str())
    }
}
