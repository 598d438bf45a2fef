// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 入站通知审计记录
///
/// 每个新的通知体在通过签名验证后只写入一次。之后只允许更新处理结果
/// （`processed`、错误信息、提取出的标识符），永不删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// 事件唯一标识符
    pub id: Uuid,
    /// 原始请求体，按收到的字节原样保存
    pub raw_body: Vec<u8>,
    /// 内容指纹（64位小写十六进制），全局唯一
    pub content_hash: String,
    /// 接收时间
    pub received_at: DateTime<Utc>,
    /// 是否已交给下游处理
    pub processed: bool,
    /// 处理错误信息
    pub processing_error: Option<String>,
    /// 提取出的视频ID
    pub video_id: Option<String>,
    /// 提取出的频道ID
    pub channel_id: Option<String>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl WebhookEvent {
    pub fn new(raw_body: Vec<u8>, content_hash: String, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw_body,
            content_hash,
            received_at,
            processed: false,
            processing_error: None,
            video_id: None,
            channel_id: None,
            created_at: Utc::now(),
        }
    }
}

/// 事件处理结果
///
/// 审计记录上唯一允许写入的字段集合。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessingOutcome {
    pub processed: bool,
    pub error: Option<String>,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

impl ProcessingOutcome {
    pub fn succeeded(video_id: Option<String>, channel_id: Option<String>) -> Self {
        Self {
            processed: true,
            error: None,
            video_id,
            channel_id,
        }
    }

    /// 载荷永久无效，处理已结束
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            processed: true,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// 下游处理失败，保留 `processed = false` 以便重放
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            processed: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
