// Common test utilities.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// Upper bound for anything that is expected to finish "promptly".
pub const PROMPT: Duration = Duration::from_secs(2);

/// Polls `cond` every few milliseconds until it holds or `limit` elapses.
pub async fn wait_until<F>(limit: Duration, mut cond: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + limit;
    loop {
        if cond() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(2)).await;
    }
}

/// Awaits `fut`, panicking if it takes longer than [`PROMPT`].
pub async fn promptly<F: Future>(what: &str, fut: F) -> F::Output {
    match timeout(PROMPT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("{what} did not complete within {PROMPT:?}"),
    }
}
