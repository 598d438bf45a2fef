// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::lifecycle::{apply_hub_result, hub_request, HandshakeError};
use crate::config::settings::RenewalSettings;
use crate::domain::models::subscription::Subscription;
use crate::domain::repositories::subscription_repository::{
    RepositoryError, SubscriptionRepository,
};
use crate::domain::services::hub_client::HubClient;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// 单次扫描的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// 发起了 hub 调用的订阅数
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// 因关闭而未处理的订阅数
    pub skipped: u64,
    /// 扫描结束时标记为过期的订阅数
    pub lapsed: u64,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("a renewal sweep is already running")]
    AlreadyRunning,
    #[error("failed to list expiring subscriptions: {0}")]
    Listing(#[source] RepositoryError),
}

enum RenewalResult {
    Renewed,
    Failed,
    Skipped,
}

/// 订阅续订调度器
///
/// 启动时立即扫描一次，之后按固定间隔扫描。同一时刻最多只有一次扫描在运行，
/// 手动触发与定时触发共用同一把锁。关闭信号在每个订阅开始前检查；
/// 正在进行的 hub 调用会被放弃，但已开始的写库不会被打断。
pub struct RenewalScheduler {
    repo: Arc<dyn SubscriptionRepository>,
    hub: Arc<dyn HubClient>,
    settings: RenewalSettings,
    shutdown: CancellationToken,
    sweep_lock: Mutex<()>,
}

impl RenewalScheduler {
    pub fn new(
        repo: Arc<dyn SubscriptionRepository>,
        hub: Arc<dyn HubClient>,
        settings: RenewalSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            repo,
            hub,
            settings,
            shutdown,
            sweep_lock: Mutex::new(()),
        }
    }

    /// 运行调度循环，直到收到关闭信号
    pub async fn run(&self) {
        info!(
            interval_secs = self.settings.interval().as_secs(),
            lookahead_hours = self.settings.lookahead_hours,
            "Renewal scheduler started"
        );

        let mut interval = tokio::time::interval(self.settings.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            match self.run_sweep().await {
                Ok(report) => info!(
                    attempted = report.attempted,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    skipped = report.skipped,
                    lapsed = report.lapsed,
                    "Renewal sweep finished"
                ),
                Err(SweepError::AlreadyRunning) => {
                    debug!("Previous renewal sweep still running; skipping tick")
                }
                Err(e) => error!("Renewal sweep aborted: {}", e),
            }
        }

        info!("Renewal scheduler stopped");
    }

    /// 启动后台运行
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// 在独立任务中执行一次扫描
    ///
    /// 调用方放弃等待时扫描仍会运行到结束。
    pub fn spawn_sweep(self: &Arc<Self>) -> JoinHandle<Result<SweepReport, SweepError>> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run_sweep().await })
    }

    /// 执行一次扫描
    ///
    /// 单个订阅失败不会中止扫描；只有列出待续订订阅失败时返回错误。
    pub async fn run_sweep(&self) -> Result<SweepReport, SweepError> {
        let _guard = self
            .sweep_lock
            .try_lock()
            .map_err(|_| SweepError::AlreadyRunning)?;

        let start = Instant::now();
        let now = Utc::now();
        let due = self
            .repo
            .find_expiring(now + self.settings.lookahead(), self.settings.batch_size)
            .await
            .map_err(|e| {
                counter!("renewal_sweeps_total", "result" => "listing_error").increment(1);
                SweepError::Listing(e)
            })?;

        debug!(due = due.len(), "Renewal sweep started");

        let results: Vec<RenewalResult> = stream::iter(due)
            .map(|subscription| self.renew_one(subscription))
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut report = SweepReport::default();
        for result in results {
            match result {
                RenewalResult::Renewed => {
                    report.attempted += 1;
                    report.succeeded += 1;
                }
                RenewalResult::Failed => {
                    report.attempted += 1;
                    report.failed += 1;
                }
                RenewalResult::Skipped => report.skipped += 1,
            }
        }

        if !self.shutdown.is_cancelled() {
            match self.repo.mark_lapsed(Utc::now()).await {
                Ok(count) => report.lapsed = count,
                Err(e) => warn!("Failed to mark lapsed subscriptions: {}", e),
            }
        }

        counter!("renewal_sweeps_total", "result" => "completed").increment(1);
        counter!("renewal_subscriptions_total", "result" => "renewed").increment(report.succeeded);
        counter!("renewal_subscriptions_total", "result" => "failed").increment(report.failed);
        counter!("renewal_subscriptions_total", "result" => "skipped").increment(report.skipped);
        histogram!("renewal_sweep_duration_seconds").record(start.elapsed().as_secs_f64());

        Ok(report)
    }

    async fn renew_one(&self, mut subscription: Subscription) -> RenewalResult {
        if self.shutdown.is_cancelled() {
            return RenewalResult::Skipped;
        }

        let request = hub_request(&subscription);
        let result = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => {
                debug!(subscription_id = %subscription.id, "Renewal cut short by shutdown");
                return RenewalResult::Skipped;
            }
            result = self.hub.subscribe(&request) => result,
        };

        match apply_hub_result(self.repo.as_ref(), &mut subscription, result, Utc::now()).await {
            Ok(_) => RenewalResult::Renewed,
            Err(HandshakeError::Hub(e)) => {
                warn!(
                    subscription_id = %subscription.id,
                    channel_id = %subscription.channel_id,
                    transient = e.is_transient(),
                    error = %e,
                    "Renewal failed"
                );
                RenewalResult::Failed
            }
            Err(HandshakeError::Persistence(e)) => {
                error!(
                    subscription_id = %subscription.id,
                    error = %e,
                    "Renewal accepted by hub but could not be persisted"
                );
                RenewalResult::Failed
            }
        }
    }
}

#[cfg(test)]
#[path = "renewal_worker_test.rs"]
mod tests;
