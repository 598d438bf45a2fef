// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 提供领域仓库接口的具体实现：
/// - SeaORM 实现（subscription_repo_impl / webhook_event_repo_impl）
/// - 内存实现（memory），用于测试
pub mod memory;
pub mod subscription_repo_impl;
pub mod webhook_event_repo_impl;
