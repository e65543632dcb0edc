//! servicepack: runs a pack of long-lived services side by side and shuts them
//! down together on a signal, a failure, or an explicit stop.
//!
//! ```text
//! AppRunner ──► App ──► ServiceManager ──► Service × N
//! ```

#[cfg(test)]
mod tests;

#[cfg(test)]
pub use tests::support;

pub mod app;
pub mod config;
pub mod logger;
pub mod runner;
pub mod services;
