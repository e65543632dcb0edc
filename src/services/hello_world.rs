//! Example service that greets on every tick.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::Service;

pub const SERVICE_NAME: &str = "hello-world";

pub struct HelloWorld {
    tick: Duration,
    halt: CancellationToken,
}

impl HelloWorld {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            halt: CancellationToken::new(),
        }
    }
}

#[async_trait]
impl Service for HelloWorld {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!(service = SERVICE_NAME, event = "starting", "starting service");

        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval yields immediately on the first tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!(service = SERVICE_NAME, event = "ctx_done", "context cancelled, stopping service");
                    return Ok(());
                }
                _ = self.halt.cancelled() => {
                    return Ok(());
                }
                _ = ticker.tick() => {
                    info!(service = SERVICE_NAME, event = "tick", "Hello, World!");
                }
            }
        }
    }

    async fn stop(&self, _ctx: CancellationToken) -> Result<()> {
        info!(service = SERVICE_NAME, event = "stopping", "stopping service");
        self.halt.cancel();
        Ok(())
    }
}
