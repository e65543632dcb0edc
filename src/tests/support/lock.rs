//! Global test lock for serializing tests that touch process-wide state.
//!
//! The shared ServiceManager returned by `services::instance()` outlives every
//! test, so tests that register into it must not overlap.

use std::sync::OnceLock;
use tokio::sync::Mutex;

static GLOBAL_TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Executes a test function while holding a global lock.
pub async fn with_global_lock<F, Fut, T>(f: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = T>,
{
    let lock = GLOBAL_TEST_LOCK.get_or_init(|| Mutex::new(()));
    let _guard = lock.lock().await;
    f().await
}
