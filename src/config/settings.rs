// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、数据库、hub、续订调度、指标和日志等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 数据库配置
    pub database: DatabaseSettings,
    /// hub 配置
    pub hub: HubSettings,
    /// 续订调度配置
    pub renewal: RenewalSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// 接收 hub 推送的路径
    pub webhook_path: String,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
    /// 是否输出 SQL 日志
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// hub 配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    /// hub 订阅地址
    pub hub_url: String,
    /// 本服务对外可达的回调地址
    pub callback_url: String,
    /// 共享密钥；为空表示显式关闭签名校验
    #[serde(default)]
    pub secret: String,
    /// 默认租约（秒）
    pub default_lease_seconds: i64,
    /// 最大租约（秒）
    pub max_lease_seconds: i64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl HubSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 非空时作为 `hub.secret` 发送
    pub fn secret(&self) -> Option<String> {
        if self.secret.is_empty() {
            None
        } else {
            Some(self.secret.clone())
        }
    }
}

/// 续订调度配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct RenewalSettings {
    /// 是否启用后台续订
    pub enabled: bool,
    /// 两次扫描之间的间隔（秒）
    pub interval_secs: u64,
    /// 续订窗口（小时）
    pub lookahead_hours: i64,
    /// 每次扫描最多处理的订阅数
    pub batch_size: u64,
    /// 单次扫描内的并发度
    pub concurrency: usize,
}

impl RenewalSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::hours(self.lookahead_hours)
    }
}

impl Default for RenewalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 3600,
            lookahead_hours: 24,
            batch_size: 100,
            concurrency: 4,
        }
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default)]
    pub format: LogFormat,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从默认值、配置文件和环境变量加载配置
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::with_builder(
            Self::defaults()?
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name(&format!("config/{}", env)).required(false))
                .add_source(Environment::with_prefix("YTPUSH").separator("__")),
        )
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.webhook_path", "/webhooks/youtube")?
            // Default DB pool settings
            .set_default("database.url", "sqlite://ytpush.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            .set_default("database.sqlx_logging", false)?
            // Hub
            .set_default("hub.hub_url", "https://pubsubhubbub.appspot.com/subscribe")?
            .set_default("hub.callback_url", "http://localhost:3000/webhooks/youtube")?
            .set_default("hub.secret", "")?
            .set_default("hub.default_lease_seconds", 432_000)?
            .set_default("hub.max_lease_seconds", 864_000)?
            .set_default("hub.request_timeout_secs", 10)?
            // Renewal
            .set_default("renewal.enabled", true)?
            .set_default("renewal.interval_secs", 3600)?
            .set_default("renewal.lookahead_hours", 24)?
            .set_default("renewal.batch_size", 100)?
            .set_default("renewal.concurrency", 4)?
            // Metrics
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            // Logging
            .set_default("logging.format", "pretty")
    }

    fn with_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    /// 签名校验是否被显式关闭
    pub fn signature_disabled(&self) -> bool {
        self.hub.secret.is_empty()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
