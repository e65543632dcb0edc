//! End-to-end lifecycle tests.
//!
//! These drive the whole stack (app runner, app, service manager, services)
//! with test doubles and simulated signals.


pub mod support;
