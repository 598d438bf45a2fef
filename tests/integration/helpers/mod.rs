// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;
use ytpush::application::use_cases::subscription_use_case::{
    SubscriptionDefaults, SubscriptionService,
};
use ytpush::application::use_cases::webhook_pipeline::WebhookPipeline;
use ytpush::config::settings::RenewalSettings;
use ytpush::domain::models::subscription::Subscription;
use ytpush::domain::services::feed_handler::LoggingFeedEntryHandler;
use ytpush::domain::services::hub_client::MAX_LEASE_SECONDS;
use ytpush::domain::services::signature::SignatureVerifier;
use ytpush::infrastructure::repositories::subscription_repo_impl::SubscriptionRepositoryImpl;
use ytpush::infrastructure::repositories::webhook_event_repo_impl::WebhookEventRepoImpl;
use ytpush::infrastructure::services::hub_client_impl::HubClientImpl;
use ytpush::presentation::routes::{self, AppComponents};
use ytpush::workers::RenewalScheduler;

pub const WEBHOOK_PATH: &str = "/webhooks/youtube";
pub const CALLBACK_URL: &str = "https://ytpush.example.com/webhooks/youtube";

/// SQLite 内存数据库，已应用全部迁移
pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let db = Arc::new(db);
    Migrator::up(db.as_ref(), None).await.unwrap();
    db
}

pub fn subscription(channel_id: &str, hub_url: &str, lease_seconds: i64) -> Subscription {
    Subscription::new(
        channel_id.to_string(),
        CALLBACK_URL.to_string(),
        hub_url.to_string(),
        lease_seconds,
        None,
    )
}

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub hub: MockServer,
    pub subscriptions: Arc<SubscriptionRepositoryImpl>,
    pub events: Arc<WebhookEventRepoImpl>,
    pub scheduler: Arc<RenewalScheduler>,
    pub shutdown: CancellationToken,
}

impl TestApp {
    pub fn hub_url(&self) -> String {
        format!("{}/subscribe", self.hub.uri())
    }
}

/// 以 SQLite 和 wiremock hub 组装完整的应用，不启动后台调度
pub async fn spawn_app(secret: &str) -> TestApp {
    let db = setup_db().await;
    let hub = MockServer::start().await;

    let subscriptions = Arc::new(SubscriptionRepositoryImpl::new(db.clone()));
    let events = Arc::new(WebhookEventRepoImpl::new(db.clone()));
    let hub_client = Arc::new(HubClientImpl::new(Duration::from_secs(5), MAX_LEASE_SECONDS).unwrap());

    let pipeline = Arc::new(WebhookPipeline::new(
        SignatureVerifier::new(secret),
        events.clone(),
        Arc::new(LoggingFeedEntryHandler),
    ));
    let service = Arc::new(SubscriptionService::new(
        subscriptions.clone(),
        hub_client.clone(),
        SubscriptionDefaults {
            hub_url: format!("{}/subscribe", hub.uri()),
            callback_url: CALLBACK_URL.to_string(),
            secret: if secret.is_empty() {
                None
            } else {
                Some(secret.to_string())
            },
            default_lease_seconds: 432_000,
            max_lease_seconds: MAX_LEASE_SECONDS,
        },
    ));

    let shutdown = CancellationToken::new();
    let scheduler = Arc::new(RenewalScheduler::new(
        subscriptions.clone(),
        hub_client,
        RenewalSettings::default(),
        shutdown.clone(),
    ));

    let app = routes::routes(
        WEBHOOK_PATH,
        AppComponents {
            pipeline,
            subscriptions: service,
            scheduler: scheduler.clone(),
        },
    );

    TestApp {
        server: TestServer::new(app).unwrap(),
        db,
        hub,
        subscriptions,
        events,
        scheduler,
        shutdown,
    }
}
