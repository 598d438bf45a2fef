// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 外部服务实现模块
pub mod hub_client_impl;

#[cfg(test)]
pub mod scripted_hub;
