//! Service orchestration: registry, concurrent run and a one-shot stop broadcast.
//!
//! `run` snapshots the registry, starts one worker per service and returns on the
//! first of: context cancelled, a service failure, or `stop`. Only the first
//! failure is reported; failures arriving after it are logged and dropped.

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::{Service, ServiceError};

static INSTANCE: OnceLock<Arc<ServiceManager>> = OnceLock::new();

/// Returns the process-wide manager, creating it on first access.
pub fn instance() -> Arc<ServiceManager> {
    INSTANCE
        .get_or_init(|| Arc::new(ServiceManager::new()))
        .clone()
}

/// ServiceManager owns the service registry and coordinates a shared shutdown.
pub struct ServiceManager {
    services: RwLock<HashMap<String, Arc<dyn Service>>>,
    running: Mutex<Vec<Arc<dyn Service>>>,
    done: CancellationToken,
    stopped: AtomicBool,
    workers: TaskTracker,
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceManager {
    /// Creates an isolated manager with an empty registry.
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::with_capacity(8)),
            running: Mutex::new(Vec::new()),
            done: CancellationToken::new(),
            stopped: AtomicBool::new(false),
            workers: TaskTracker::new(),
        }
    }

    /// Upserts services by name.
    pub fn add<I>(&self, services: I)
    where
        I: IntoIterator<Item = Arc<dyn Service>>,
    {
        let mut registry = self.services.write();
        for service in services {
            registry.insert(service.name().to_string(), service);
        }
    }

    /// Drops every registration.
    pub fn clear(&self) {
        *self.services.write() = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of the services started so far, in start order.
    pub fn running(&self) -> Vec<String> {
        self.running
            .lock()
            .iter()
            .map(|service| service.name().to_string())
            .collect()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Runs every registered service until cancellation, stop or first failure.
    pub async fn run(&self, ctx: CancellationToken) -> Result<(), ServiceError> {
        self.run_only(ctx, &[]).await
    }

    /// Runs the named services only. An empty list selects every registered service.
    pub async fn run_only(
        &self,
        ctx: CancellationToken,
        names: &[String],
    ) -> Result<(), ServiceError> {
        if self.done.is_cancelled() {
            return Err(ServiceError::AlreadyStopped);
        }

        info!(component = "service-manager", event = "run", "running services");

        let enabled = self.select(names)?;
        if enabled.is_empty() {
            return Err(ServiceError::NoEnabledServices);
        }

        let (err_tx, mut err_rx) = mpsc::channel::<ServiceError>(1);
        self.spawn_all(&ctx, enabled, err_tx)?;

        let res = tokio::select! {
            _ = ctx.cancelled() => {
                info!(component = "service-manager", event = "ctx_done", "services run context done");
                Ok(())
            }
            Some(err) = err_rx.recv() => Err(err),
            _ = self.done.cancelled() => Ok(()),
        };

        self.stop(ctx).await;
        self.workers.close();
        self.workers.wait().await;

        res
    }

    /// Stops every started service. Executes once per manager lifetime.
    pub async fn stop(&self, ctx: CancellationToken) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        info!(component = "service-manager", event = "stopping", "stopping services");
        self.done.cancel();

        let running: Vec<Arc<dyn Service>> = self.running.lock().clone();
        join_all(running.into_iter().map(|service| {
            let ctx = ctx.clone();
            async move {
                if let Err(err) = guarded(service.stop(ctx)).await {
                    error!(
                        component = "service-manager",
                        event = "stop_failed",
                        service = %service.name(),
                        error = %format!("{err:#}"),
                        "failed to stop service"
                    );
                }
            }
        }))
        .await;

        info!(component = "service-manager", event = "stopped", "stopped services");
    }

    fn select(&self, names: &[String]) -> Result<Vec<Arc<dyn Service>>, ServiceError> {
        let registry = self.services.read();

        if names.is_empty() {
            return Ok(registry.values().cloned().collect());
        }

        let mut enabled: Vec<Arc<dyn Service>> = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                continue;
            }
            match registry.get(name) {
                Some(service) => enabled.push(service.clone()),
                None => return Err(ServiceError::NotFound(name.clone())),
            }
        }

        for name in registry.keys().filter(|name| !names.contains(name)) {
            info!(
                component = "service-manager",
                event = "not_enabled",
                service = %name,
                "service is not enabled"
            );
        }

        Ok(enabled)
    }

    fn spawn_all(
        &self,
        ctx: &CancellationToken,
        services: Vec<Arc<dyn Service>>,
        err_tx: mpsc::Sender<ServiceError>,
    ) -> Result<(), ServiceError> {
        // stop cancels `done` before it snapshots `running`
        let mut running = self.running.lock();
        if self.done.is_cancelled() {
            return Err(ServiceError::AlreadyStopped);
        }
        self.workers.reopen();

        for service in services {
            let worker = service.clone();
            let ctx = ctx.clone();
            let err_tx = err_tx.clone();

            self.workers.spawn(async move {
                let Err(err) = guarded(worker.run(ctx)).await else {
                    return;
                };

                let failure = ServiceError::Failed {
                    name: worker.name().to_string(),
                    error: err,
                };
                match err_tx.try_send(failure) {
                    Ok(()) => {}
                    Err(TrySendError::Full(dropped)) => warn!(
                        component = "service-manager",
                        event = "failure_dropped",
                        error = %dropped,
                        "another service failure is already pending"
                    ),
                    Err(TrySendError::Closed(dropped)) => debug!(
                        component = "service-manager",
                        event = "failure_after_run",
                        error = %dropped,
                        "service failed after run returned"
                    ),
                }
            });

            running.push(service);
        }

        Ok(())
    }
}

/// Turns a panic inside a service call into an error.
async fn guarded<F>(fut: F) -> anyhow::Result<()>
where
    F: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!("service panicked")),
    }
}
