// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::subscription_use_case::SubscriptionService;
use crate::application::use_cases::webhook_pipeline::WebhookPipeline;
use crate::presentation::handlers::{subscription_handler, webhook_handler};
use crate::workers::renewal_worker::RenewalScheduler;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// 路由依赖的组件
#[derive(Clone)]
pub struct AppComponents {
    pub pipeline: Arc<WebhookPipeline>,
    pub subscriptions: Arc<SubscriptionService>,
    pub scheduler: Arc<RenewalScheduler>,
}

/// 创建应用路由
///
/// # 参数
///
/// * `webhook_path` - hub 回调路径，GET 用于验证握手，POST 用于推送
/// * `components` - 处理器使用的用例和调度器
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(webhook_path: &str, components: AppComponents) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let webhook_routes = Router::new().route(
        webhook_path,
        get(webhook_handler::verify_subscription).post(webhook_handler::receive_notification),
    );

    let api_routes = Router::new()
        .route(
            "/v1/subscriptions",
            post(subscription_handler::create_subscription)
                .get(subscription_handler::list_subscriptions),
        )
        .route(
            "/v1/subscriptions/{id}",
            get(subscription_handler::get_subscription)
                .delete(subscription_handler::delete_subscription),
        )
        .route(
            "/v1/subscriptions/{id}/renew",
            post(subscription_handler::renew_subscription),
        )
        .route("/v1/renewals", post(subscription_handler::trigger_renewal));

    Router::new()
        .merge(public_routes)
        .merge(webhook_routes)
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(components.pipeline))
                .layer(Extension(components.subscriptions))
                .layer(Extension(components.scheduler)),
        )
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
