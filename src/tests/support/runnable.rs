// Runnable test double for the app runner.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::runner::Runnable;

/// Configurable Runnable. By default `run` blocks until `stop` is called.
#[derive(Default)]
pub struct MockRunnable {
    run_error: Option<String>,
    stop_error: Option<String>,
    stop_delay: Duration,
    runs: AtomicUsize,
    stops: AtomicUsize,
    halt: CancellationToken,
}

impl MockRunnable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_run(mut self, msg: &str) -> Self {
        self.run_error = Some(msg.to_string());
        self
    }

    pub fn failing_stop(mut self, msg: &str) -> Self {
        self.stop_error = Some(msg.to_string());
        self
    }

    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runnable for MockRunnable {
    async fn run(&self, _ctx: CancellationToken) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.run_error {
            return Err(anyhow!("{msg}"));
        }
        self.halt.cancelled().await;
        Ok(())
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        if !self.stop_delay.is_zero() {
            tokio::time::sleep(self.stop_delay).await;
        }
        self.halt.cancel();
        match &self.stop_error {
            Some(msg) => Err(anyhow!("{msg}")),
            None => Ok(()),
        }
    }
}
