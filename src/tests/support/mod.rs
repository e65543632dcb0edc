// Shared test support code.
// Test doubles and polling helpers used by unit and scenario tests.

pub mod common;
pub mod lock;
pub mod runnable;
pub mod services;

pub use common::*;
pub use lock::with_global_lock;
pub use runnable::MockRunnable;
pub use services::{as_services, MockService};
