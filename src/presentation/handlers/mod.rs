// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// - 订阅管理（subscription_handler）
/// - hub 回调（webhook_handler）：验证握手和推送通知
pub mod subscription_handler;
pub mod webhook_handler;
