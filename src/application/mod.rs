// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含订阅管理和推送处理的用例实现
pub mod dto;
pub mod use_cases;
