// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供：
/// - 订阅仓库（subscription_repository）
/// - Webhook事件仓库（webhook_event_repository）：只追加，按内容指纹唯一
pub mod subscription_repository;
pub mod webhook_event_repository;
