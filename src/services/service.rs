// Service capability driven by the ServiceManager.

use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Service is a named, independently startable and stoppable unit of work.
#[async_trait]
pub trait Service: Send + Sync {
    /// Gets the service name. Names are registry keys, the last registration wins.
    fn name(&self) -> &str;

    /// Blocks until `ctx` is cancelled, the service is stopped, or it fails.
    async fn run(&self, ctx: CancellationToken) -> Result<()>;

    /// Requests termination. Must be safe to call after `run` has returned.
    async fn stop(&self, ctx: CancellationToken) -> Result<()>;
}
