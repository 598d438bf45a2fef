// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod helpers;
pub mod renewal_test;
pub mod repositories;
pub mod subscription_api_test;
