// Errors returned by the app runner.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// Graceful stop did not finish within the configured timeout.
    #[error("shutdown timeout of {0:?} exceeded")]
    ShutdownTimeout(Duration),

    /// The application's run failed and its stop succeeded.
    #[error("{0:#}")]
    Run(anyhow::Error),

    #[error("stop failed: {0:#}")]
    StopFailed(anyhow::Error),

    /// Both run and stop failed; both messages are kept.
    #[error("{stop:#}: {run:#}")]
    RunAndStopFailed {
        run: anyhow::Error,
        stop: anyhow::Error,
    },

    #[error("failed to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}

impl RunnerError {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunnerError::ShutdownTimeout(_) => "shutdown_timeout",
            RunnerError::Run(_) => "run_failed",
            RunnerError::StopFailed(_) => "stop_failed",
            RunnerError::RunAndStopFailed { .. } => "run_and_stop_failed",
            RunnerError::Signal(_) => "signal_setup_failed",
        }
    }
}
