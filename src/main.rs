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

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ytpush::application::use_cases::subscription_use_case::{
    SubscriptionDefaults, SubscriptionService,
};
use ytpush::application::use_cases::webhook_pipeline::WebhookPipeline;
use ytpush::config::settings::Settings;
use ytpush::domain::services::feed_handler::LoggingFeedEntryHandler;
use ytpush::domain::services::signature::SignatureVerifier;
use ytpush::infrastructure::database::connection;
use ytpush::infrastructure::repositories::subscription_repo_impl::SubscriptionRepositoryImpl;
use ytpush::infrastructure::repositories::webhook_event_repo_impl::WebhookEventRepoImpl;
use ytpush::infrastructure::services::hub_client_impl::HubClientImpl;
use ytpush::presentation::routes::{self, AppComponents};
use ytpush::utils::telemetry;
use ytpush::workers::RenewalScheduler;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration and initialize logging
    let settings = Settings::new()?;
    telemetry::init_telemetry(settings.logging.format);
    info!("Starting ytpush...");

    if settings.signature_disabled() {
        warn!("hub.secret is empty: X-Hub-Signature verification is DISABLED");
    }

    // Initialize Prometheus Metrics
    ytpush::infrastructure::metrics::init_metrics(&settings.metrics);

    // 2. Connect to database and apply migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 3. Initialize Components
    let subscription_repo = Arc::new(SubscriptionRepositoryImpl::new(db.clone()));
    let event_repo = Arc::new(WebhookEventRepoImpl::new(db.clone()));
    let hub = Arc::new(HubClientImpl::new(
        settings.hub.request_timeout(),
        settings.hub.max_lease_seconds,
    )?);

    let pipeline = Arc::new(WebhookPipeline::new(
        SignatureVerifier::new(&settings.hub.secret),
        event_repo,
        Arc::new(LoggingFeedEntryHandler),
    ));
    let subscriptions = Arc::new(SubscriptionService::new(
        subscription_repo.clone(),
        hub.clone(),
        SubscriptionDefaults::from(&settings.hub),
    ));

    // 4. Start renewal scheduler
    let shutdown = CancellationToken::new();
    let scheduler = Arc::new(RenewalScheduler::new(
        subscription_repo,
        hub,
        settings.renewal.clone(),
        shutdown.clone(),
    ));
    let scheduler_handle = if settings.renewal.enabled {
        Some(scheduler.clone().start())
    } else {
        info!("Background renewal disabled");
        None
    };

    // 5. Serve
    let app = routes::routes(
        &settings.server.webhook_path,
        AppComponents {
            pipeline,
            subscriptions,
            scheduler,
        },
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // 6. Drain background work
    shutdown.cancel();
    if let Some(handle) = scheduler_handle {
        if let Err(e) = handle.await {
            warn!("Renewal scheduler terminated abnormally: {}", e);
        }
    }
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Shutdown signal received"),
        _ = shutdown.cancelled() => {}
    }
    shutdown.cancel();
}
