// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sha2::{Digest, Sha256};

/// 指纹长度（十六进制字符数）
pub const FINGERPRINT_LEN: usize = 64;

/// 计算原始请求体的内容指纹
///
/// 对完全相同的字节总是返回相同的 64 位小写十六进制 SHA-256 摘要。
/// 去重本身由存储层的唯一约束完成，这里只是纯函数。
pub fn content_fingerprint(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
