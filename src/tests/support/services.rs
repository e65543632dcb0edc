// Service test double.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::services::Service;

/// Records run/stop calls. `run` blocks until the context is cancelled or `stop` is called.
pub struct MockService {
    name: String,
    run_error: Option<String>,
    stop_error: Option<String>,
    stop_delay: Duration,
    ignore_ctx: bool,
    runs: AtomicUsize,
    stops: AtomicUsize,
    running: AtomicBool,
    halt: CancellationToken,
}

impl MockService {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            run_error: None,
            stop_error: None,
            stop_delay: Duration::ZERO,
            ignore_ctx: false,
            runs: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            running: AtomicBool::new(false),
            halt: CancellationToken::new(),
        }
    }

    /// `run` returns this error immediately.
    pub fn failing_run(mut self, msg: &str) -> Self {
        self.run_error = Some(msg.to_string());
        self
    }

    /// `stop` halts the service, then returns this error.
    pub fn failing_stop(mut self, msg: &str) -> Self {
        self.stop_error = Some(msg.to_string());
        self
    }

    /// `stop` sleeps before halting the service.
    pub fn slow_stop(mut self, delay: Duration) -> Self {
        self.stop_delay = delay;
        self
    }

    /// `run` only returns once `stop` is called.
    pub fn ignoring_ctx(mut self) -> Self {
        self.ignore_ctx = true;
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

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Service for MockService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);

        if let Some(msg) = &self.run_error {
            return Err(anyhow!("{msg}"));
        }

        self.running.store(true, Ordering::SeqCst);
        if self.ignore_ctx {
            self.halt.cancelled().await;
        } else {
            tokio::select! {
                _ = ctx.cancelled() => {}
                _ = self.halt.cancelled() => {}
            }
        }
        self.running.store(false, Ordering::SeqCst);

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

/// Upcasts mocks for `ServiceManager::add`.
pub fn as_services(mocks: &[Arc<MockService>]) -> Vec<Arc<dyn Service>> {
    mocks
        .iter()
        .map(|mock| mock.clone() as Arc<dyn Service>)
        .collect()
}
