// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 后台订阅续订调度
pub mod renewal_worker;

pub use renewal_worker::RenewalScheduler;
