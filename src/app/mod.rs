// Application wrapper that exposes the ServiceManager as a Runnable.

#[allow(clippy::module_inception)]
pub mod app;


pub use app::App;
