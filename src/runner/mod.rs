//! Process driver: runs a [`Runnable`] until it fails or a signal arrives, then
//! drives a timeout-bounded graceful stop.
//!
//! ```text
//! Idle ──run──► Running ──signal / run returned──► ShuttingDown ──► Stopped
//! ```
//!
//! Result composition once shutting down:
//! - stop failed             → run error (if any) and stop error, composed
//! - deadline elapsed        → `ShutdownTimeout`, overriding everything else
//! - stop and run both done  → the pending run result

pub mod error;
pub mod signal;


pub use error::RunnerError;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config;

/// Two-method capability driven by [`AppRunner`].
#[async_trait]
pub trait Runnable: Send + Sync {
    async fn run(&self, ctx: CancellationToken) -> anyhow::Result<()>;
    async fn stop(&self, ctx: CancellationToken) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

/// Installs signal handling and drives `runnable` to completion.
pub async fn run(runnable: Arc<dyn Runnable>, cfg: &config::Runner) -> Result<(), RunnerError> {
    let signals = signal::listen()?;
    AppRunner::new(runnable, cfg.shutdown_timeout)
        .run_until(signals)
        .await
}

pub struct AppRunner {
    runnable: Arc<dyn Runnable>,
    shutdown_timeout: Duration,
    phase: Phase,
}

impl AppRunner {
    pub fn new(runnable: Arc<dyn Runnable>, shutdown_timeout: Duration) -> Self {
        Self {
            runnable,
            shutdown_timeout,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs until `shutdown` resolves (a signal name) or the runnable returns.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<(), RunnerError>
    where
        S: Future<Output = &'static str>,
    {
        let ctx = CancellationToken::new();
        let _cancel_on_exit = ctx.clone().drop_guard();

        self.transition(Phase::Running);

        let runnable = self.runnable.clone();
        let run_ctx = ctx.clone();
        let mut run_task = tokio::spawn(async move {
            info!(component = "app-runner", event = "starting", "starting application");
            runnable.run(run_ctx).await
        });

        tokio::pin!(shutdown);
        let (pending, run_finished) = tokio::select! {
            sig = &mut shutdown => {
                info!(component = "app-runner", event = "os_signal", signal = sig, "received signal");
                (None, false)
            }
            joined = &mut run_task => {
                let res = flatten(joined);
                if let Err(err) = &res {
                    error!(
                        component = "app-runner",
                        event = "run_failed",
                        error = %format!("{err:#}"),
                        "application encountered an error"
                    );
                }
                (res.err(), true)
            }
        };

        let res = self.shutdown(&ctx, run_task, run_finished, pending).await;
        self.transition(Phase::Stopped);
        res
    }

    async fn shutdown(
        &mut self,
        ctx: &CancellationToken,
        mut run_task: JoinHandle<anyhow::Result<()>>,
        mut run_finished: bool,
        mut pending: Option<anyhow::Error>,
    ) -> Result<(), RunnerError> {
        self.transition(Phase::ShuttingDown);
        info!(
            component = "app-runner",
            event = "shutdown_started",
            timeout = ?self.shutdown_timeout,
            "initiating graceful shutdown"
        );

        let stop_ctx = ctx.child_token();
        let runnable = self.runnable.clone();
        let token = stop_ctx.clone();
        let mut stop_task = tokio::spawn(async move { runnable.stop(token).await });
        let mut stop_finished = false;

        let deadline = tokio::time::sleep(self.shutdown_timeout);
        tokio::pin!(deadline);

        loop {
            if stop_finished && run_finished {
                info!(
                    component = "app-runner",
                    event = "shutdown_success",
                    "shutdown completed successfully"
                );
                return pending.take().map_or(Ok(()), |err| Err(RunnerError::Run(err)));
            }

            tokio::select! {
                joined = &mut stop_task, if !stop_finished => {
                    stop_finished = true;
                    if let Err(stop) = flatten(joined) {
                        error!(
                            component = "app-runner",
                            event = "stop_failed",
                            error = %format!("{stop:#}"),
                            "application stop failed"
                        );
                        return Err(match pending.take() {
                            Some(run) => RunnerError::RunAndStopFailed { run, stop },
                            None => RunnerError::StopFailed(stop),
                        });
                    }
                }
                joined = &mut run_task, if !run_finished => {
                    run_finished = true;
                    if let Err(err) = flatten(joined) {
                        warn!(
                            component = "app-runner",
                            event = "late_run_error",
                            error = %format!("{err:#}"),
                            "application returned an error after shutdown began"
                        );
                    }
                }
                _ = &mut deadline => {
                    stop_ctx.cancel();
                    error!(
                        component = "app-runner",
                        event = "shutdown_timeout",
                        timeout = ?self.shutdown_timeout,
                        "not all services were stopped within timeout"
                    );
                    return Err(RunnerError::ShutdownTimeout(self.shutdown_timeout));
                }
            }
        }
    }

    fn transition(&mut self, next: Phase) {
        debug!(component = "app-runner", from = ?self.phase, to = ?next, "phase changed");
        self.phase = next;
    }
}

fn flatten(joined: Result<anyhow::Result<()>, JoinError>) -> anyhow::Result<()> {
    match joined {
        Ok(res) => res,
        Err(err) if err.is_panic() => Err(anyhow::anyhow!("application worker panicked")),
        Err(err) => Err(anyhow::anyhow!("application worker aborted: {err}")),
    }
}
