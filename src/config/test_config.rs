use super::{App, Config, Env, HelloWorld, LogFormat, Logs, Runner};
use std::time::Duration;

/// Creates a new test configuration with short timeouts.
pub fn new_test_config() -> Config {
    Config {
        env: Env::Test,
        logs: Logs {
            level: "debug".to_string(),
            format: LogFormat::Text,
            caller: false,
        },
        runner: Runner {
            shutdown_timeout: Duration::from_secs(1),
        },
        app: App {
            nice_field: None,
            services: Vec::new(),
            hello_world: HelloWorld {
                tick: Duration::from_millis(10),
            },
        },
    }
}
