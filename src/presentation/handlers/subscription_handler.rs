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

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    application::{
        dto::{
            subscription_request::{CreateSubscriptionRequest, ListSubscriptionsQuery},
            subscription_response::{SubscriptionResponse, UnsubscribeResponse},
        },
        use_cases::subscription_use_case::SubscriptionService,
    },
    presentation::errors::AppError,
    workers::renewal_worker::{RenewalScheduler, SweepReport},
};

/// 创建订阅
pub async fn create_subscription(
    Extension(service): Extension<Arc<SubscriptionService>>,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), AppError> {
    let subscription = service.subscribe(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from_subscription(subscription, Utc::now())),
    ))
}

/// 查询订阅列表
pub async fn list_subscriptions(
    Extension(service): Extension<Arc<SubscriptionService>>,
    Query(query): Query<ListSubscriptionsQuery>,
) -> Result<Json<Vec<SubscriptionResponse>>, AppError> {
    let now = Utc::now();
    let subscriptions = service.list(query).await?;
    Ok(Json(
        subscriptions
            .into_iter()
            .map(|s| SubscriptionResponse::from_subscription(s, now))
            .collect(),
    ))
}

/// 获取订阅详情
pub async fn get_subscription(
    Extension(service): Extension<Arc<SubscriptionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    let subscription = service.get(id).await?;
    Ok(Json(SubscriptionResponse::from_subscription(
        subscription,
        Utc::now(),
    )))
}

/// 退订并删除
pub async fn delete_subscription(
    Extension(service): Extension<Arc<SubscriptionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UnsubscribeResponse>, AppError> {
    Ok(Json(service.unsubscribe_and_delete(id).await?))
}

/// 手动续订
pub async fn renew_subscription(
    Extension(service): Extension<Arc<SubscriptionService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    let subscription = service.renew(id).await?;
    Ok(Json(SubscriptionResponse::from_subscription(
        subscription,
        Utc::now(),
    )))
}

/// 立即执行一次续订扫描
pub async fn trigger_renewal(
    Extension(scheduler): Extension<Arc<RenewalScheduler>>,
) -> Result<Json<SweepReport>, AppError> {
    let report = scheduler.spawn_sweep().await??;
    Ok(Json(report))
}
