// Main application implementation.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info};

use crate::config::Config;
use crate::runner::Runnable;
use crate::services::{ServiceError, ServiceManager};

/// Drives the ServiceManager on behalf of the app runner.
pub struct App {
    cfg: Config,
    manager: Arc<ServiceManager>,
    done: CancellationToken,
    stopped: AtomicBool,
    workers: TaskTracker,
}

impl App {
    /// Creates an application around `manager`.
    pub fn new(cfg: Config, manager: Arc<ServiceManager>) -> Arc<Self> {
        Arc::new(Self {
            cfg,
            manager,
            done: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            workers: TaskTracker::new(),
        })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn manager(&self) -> &Arc<ServiceManager> {
        &self.manager
    }
}

#[async_trait]
impl Runnable for App {
    async fn run(&self, ctx: CancellationToken) -> Result<()> {
        if self.done.is_cancelled() {
            return Ok(());
        }

        info!(component = "app", event = "running", env = %self.cfg.env, "running app");

        let run_ctx = ctx.child_token();
        let (res_tx, res_rx) = oneshot::channel::<Result<(), ServiceError>>();

        self.workers.reopen();
        let manager = self.manager.clone();
        let services = self.cfg.app.services.clone();
        let worker_ctx = run_ctx.clone();
        self.workers.spawn(async move {
            let _ = res_tx.send(manager.run_only(worker_ctx, &services).await);
        });

        let res = tokio::select! {
            _ = run_ctx.cancelled() => Ok(()),
            outcome = res_rx => match outcome {
                Ok(Err(err)) => Err(anyhow::Error::new(err).context("failed to run app")),
                // manager returned on its own
                _ => Ok(()),
            },
            _ = self.done.cancelled() => Ok(()),
        };

        run_ctx.cancel();
        if let Err(err) = self.stop(ctx).await {
            error!(component = "app", event = "stop_failed", error = %format!("{err:#}"), "failed to stop app");
        }
        self.workers.close();
        self.workers.wait().await;

        res
    }

    async fn stop(&self, ctx: CancellationToken) -> Result<()> {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        info!(component = "app", event = "stopping", "stopping app");

        self.done.cancel();
        self.manager.stop(ctx).await;
        self.workers.close();
        self.workers.wait().await;

        info!(component = "app", event = "stopped", "stopped app");
        Ok(())
    }
}
