//! Long-running services and the manager that runs them together.

pub mod error;
pub mod hello_world;
pub mod manager;
pub mod service;


pub use error::ServiceError;
pub use hello_world::HelloWorld;
pub use manager::{instance, ServiceManager};
pub use service::Service;

use std::sync::Arc;

use crate::config::Config;

/// Builds the services shipped with the binary.
pub fn builtin(cfg: &Config) -> Vec<Arc<dyn Service>> {
    vec![Arc::new(HelloWorld::new(cfg.app.hello_world.tick))]
}
