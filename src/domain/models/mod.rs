// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 订阅（subscription）：频道订阅及其生命周期状态
/// - Webhook事件（webhook_event）：只追加的原始通知审计记录
/// - 通知条目（feed_entry）：解码后的视频更新或删除通知
pub mod feed_entry;
pub mod subscription;
pub mod webhook_event;
