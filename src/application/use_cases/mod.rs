// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// - 握手结果处理（lifecycle）：订阅、续订共用的状态转换
/// - 订阅管理（subscription_use_case）
/// - 推送处理流水线（webhook_pipeline）
pub mod lifecycle;
pub mod subscription_use_case;
pub mod webhook_pipeline;
