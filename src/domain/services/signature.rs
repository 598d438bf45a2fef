// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use thiserror::Error;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// hub 推送时携带签名的请求头
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature";

/// 签名校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,
    #[error("signature header malformed")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
}

/// 签名校验器
///
/// 对原始请求体（不重新序列化）计算 HMAC，并以常量时间与 `X-Hub-Signature`
/// 头比较。头格式为 `sha1=<hex>`，也接受 `sha256=<hex>`。
///
/// 密钥为空表示显式关闭校验，此时 [`SignatureVerifier::verify`] 总是成功。
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<Vec<u8>>,
}

impl SignatureVerifier {
    pub fn new(secret: &str) -> Self {
        let secret = if secret.is_empty() {
            None
        } else {
            Some(secret.as_bytes().to_vec())
        };
        Self { secret }
    }

    /// 校验是否被显式关闭
    pub fn is_disabled(&self) -> bool {
        self.secret.is_none()
    }

    pub fn verify(&self, body: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        let Some(secret) = self.secret.as_deref() else {
            return Ok(());
        };

        let header = match header {
            Some(h) if !h.is_empty() => h,
            _ => return Err(SignatureError::Missing),
        };

        let (algorithm, hex_digest) = header.split_once('=').ok_or(SignatureError::Malformed)?;
        let expected = hex::decode(hex_digest).map_err(|_| SignatureError::Malformed)?;

        let verified = match algorithm {
            "sha1" => {
                let mut mac =
                    HmacSha1::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
                mac.update(body);
                mac.verify_slice(&expected)
            }
            "sha256" => {
                let mut mac =
                    HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::Mismatch)?;
                mac.update(body);
                mac.verify_slice(&expected)
            }
            _ => return Err(SignatureError::Malformed),
        };

        verified.map_err(|_| SignatureError::Mismatch)
    }

    /// 以原始头字节校验，非 UTF-8 的头视为格式错误
    pub fn verify_header(&self, body: &[u8], header: Option<&[u8]>) -> Result<(), SignatureError> {
        if self.is_disabled() {
            return Ok(());
        }
        let header = header
            .map(std::str::from_utf8)
            .transpose()
            .map_err(|_| SignatureError::Malformed)?;
        self.verify(body, header)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("enabled", &self.secret.is_some())
            .finish()
    }
}

/// 计算 `sha1=<hex>` 格式的签名头
pub fn sign_sha1(secret: &[u8], body: &[u8]) -> String {
    let mut mac = match HmacSha1::new_from_slice(secret) {
        Ok(mac) => mac,
        // HMAC accepts keys of any length
        Err(_) => return String::new(),
    };
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}
