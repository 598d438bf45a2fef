// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 签名校验（signature）：X-Hub-Signature 的 HMAC 校验
/// - 内容指纹（fingerprint）：原始请求体的去重摘要
/// - 通知解码（feed_decoder）：Atom 负载解析
/// - hub 客户端（hub_client）：订阅/退订协议接口
/// - 下游处理（feed_handler）：解码后通知的交接点
pub mod feed_decoder;
pub mod feed_handler;
pub mod fingerprint;
pub mod hub_client;
pub mod signature;
