//! OS signal interception for the app runner.
//!
//! Handlers are registered synchronously by [`listen`], so a failure to install
//! them surfaces before the application starts.

use std::future::Future;

/// Installs handlers and returns a future resolving to the received signal's name.
///
/// Unix: SIGINT, SIGTERM and SIGQUIT.
#[cfg(unix)]
pub fn listen() -> std::io::Result<impl Future<Output = &'static str>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = sigquit.recv() => "SIGQUIT",
        }
    })
}

/// Installs handlers and returns a future resolving to the received signal's name.
///
/// Non-unix: Ctrl-C only.
#[cfg(not(unix))]
pub fn listen() -> std::io::Result<impl Future<Output = &'static str>> {
    Ok(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "CTRL_C",
            Err(_) => std::future::pending::<&'static str>().await,
        }
    })
}
