// Errors surfaced by the ServiceManager.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Nothing was selected to run.
    #[error("no enabled services")]
    NoEnabledServices,

    /// A service requested by name is not registered.
    #[error("service not found: {0}")]
    NotFound(String),

    /// First failure reported by a running service.
    #[error("service failed: {name}: {error:#}")]
    Failed { name: String, error: anyhow::Error },

    /// The manager has already executed its stop sequence.
    #[error("service manager already stopped")]
    AlreadyStopped,
}

impl ServiceError {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ServiceError::NoEnabledServices => "no_enabled_services",
            ServiceError::NotFound(_) => "service_not_found",
            ServiceError::Failed { .. } => "service_failed",
            ServiceError::AlreadyStopped => "already_stopped",
        }
    }
}
