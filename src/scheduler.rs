//! Background retention sweeper: prunes old login attempts and
//! deactivates expired sessions.

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::RetentionConfig;
use crate::db::Store;

pub struct RetentionSweeper {
    store: Store,
    config: RetentionConfig,
    running: Arc<RwLock<bool>>,
}

impl RetentionSweeper {
    #[must_use]
    pub fn new(store: Store, config: RetentionConfig) -> Self {
        Self {
            store,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Retention sweeper is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting retention sweeper");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let retention_days = self.config.attempt_retention_days;
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let store = store.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                sweep(&store, retention_days).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Retention sweeper running with cron: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let interval_mins = self.config.sweep_interval_minutes.max(1);

        info!("Retention sweeper running: sweep every {}m", interval_mins);

        let mut sweep_interval = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            sweep_interval.tick().await;
            if !*self.running.read().await {
                break;
            }
            sweep(&self.store, self.config.attempt_retention_days).await;
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping retention sweeper...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn run_once(&self) -> Result<()> {
        let cutoff = (Utc::now()
            - ChronoDuration::days(i64::from(self.config.attempt_retention_days)))
        .to_rfc3339();
        let pruned = self.store.prune_login_attempts(&cutoff).await?;

        let now = Utc::now().to_rfc3339();
        let deactivated = self.store.deactivate_expired_sessions(&now).await?;

        info!(
            pruned_attempts = pruned,
            deactivated_sessions = deactivated,
            "Retention sweep complete"
        );

        Ok(())
    }
}

async fn sweep(store: &Store, retention_days: u32) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "retention_sweep", "Starting retention sweep");

    let cutoff = (Utc::now() - ChronoDuration::days(i64::from(retention_days))).to_rfc3339();
    match store.prune_login_attempts(&cutoff).await {
        Ok(pruned) => {
            if pruned > 0 {
                info!(pruned_attempts = pruned, "Pruned old login attempts");
            }
        }
        Err(e) => {
            error!(event = "job_failed", job_name = "retention_sweep", error = %e, "Failed to prune login attempts");
        }
    }

    let now = Utc::now().to_rfc3339();
    match store.deactivate_expired_sessions(&now).await {
        Ok(deactivated) => {
            if deactivated > 0 {
                info!(deactivated_sessions = deactivated, "Deactivated expired sessions");
            }
        }
        Err(e) => {
            error!(event = "job_failed", job_name = "retention_sweep", error = %e, "Failed to deactivate sessions");
        }
    }

    info!(
        event = "job_finished",
        job_name = "retention_sweep",
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Retention sweep finished"
    );
}
