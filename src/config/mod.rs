// Configuration loading and management.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::filter::LevelFilter;

pub const PROD: &str = "prod";
pub const DEV: &str = "dev";
pub const TEST: &str = "test";

pub const ENV_KIND: &str = "ENV";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_LOG_CALLER: &str = "LOG_CALLER";
pub const ENV_SHUTDOWN_TIMEOUT: &str = "APPRUNNER_SHUTDOWNTIMEOUT";
pub const ENV_APP_NICE_FIELD: &str = "APP_NICEFIELD";
pub const ENV_APP_SERVICES: &str = "APP_SERVICES";
pub const ENV_HELLO_WORLD_TICK: &str = "HELLOWORLD_TICK";

pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_HELLO_WORLD_TICK: Duration = Duration::from_secs(5);
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Deployment environment. Anything unknown is treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    #[default]
    Prod,
    Dev,
    Test,
}

impl Env {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            DEV => Env::Dev,
            TEST => Env::Test,
            _ => Env::Prod,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Prod => PROD,
            Env::Dev => DEV,
            Env::Test => TEST,
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("invalid log format: {other:?}"),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Logs {
    pub level: String,
    pub format: LogFormat,
    pub caller: bool,
}

impl Default for Logs {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::Text,
            caller: false,
        }
    }
}

impl Logs {
    /// Parses the level as a `tracing` level filter.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.level.trim())
            .with_context(|| format!("invalid log level: {:?}", self.level))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Runner {
    #[serde(rename = "shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HelloWorld {
    #[serde(with = "humantime_serde")]
    pub tick: Duration,
}

impl Default for HelloWorld {
    fn default() -> Self {
        Self {
            tick: DEFAULT_HELLO_WORLD_TICK,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct App {
    #[serde(rename = "nice_field")]
    pub nice_field: Option<String>,
    /// Services to run by name. Empty runs everything registered.
    pub services: Vec<String>,
    #[serde(rename = "hello_world")]
    pub hello_world: HelloWorld,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub env: Env,
    pub logs: Logs,
    pub runner: Runner,
    pub app: App,
}

impl Config {
    /// Loads the optional YAML file and applies environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Reads configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let abs_path = path
            .canonicalize()
            .with_context(|| format!("failed to resolve absolute config filepath: {:?}", path))?;

        let data = std::fs::read_to_string(&abs_path)
            .with_context(|| format!("read config yaml file {:?}", abs_path))?;

        let cfg: Config = serde_yaml::from_str(&data)
            .with_context(|| format!("unmarshal yaml from {:?}", abs_path))?;

        cfg.logs.level_filter()?;
        if cfg.runner.shutdown_timeout.is_zero() {
            bail!("runner.shutdown_timeout must be positive");
        }

        Ok(cfg)
    }

    /// Overrides fields from environment variables resolved by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_KIND) {
            self.env = Env::parse(&raw);
        }

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            self.logs.level = raw.trim().to_string();
            self.logs.level_filter()?;
        }

        if let Some(raw) = lookup(ENV_LOG_FORMAT) {
            self.logs.format = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_LOG_CALLER) {
            self.logs.caller = parse_bool(&raw)
                .with_context(|| format!("invalid {ENV_LOG_CALLER} value: {raw:?}"))?;
        }

        if let Some(raw) = lookup(ENV_SHUTDOWN_TIMEOUT) {
            self.runner.shutdown_timeout = match humantime::parse_duration(raw.trim()) {
                Ok(timeout) if !timeout.is_zero() => timeout,
                _ => {
                    warn!(
                        component = "config",
                        event = "invalid_shutdown_timeout",
                        value = %raw,
                        default = ?DEFAULT_SHUTDOWN_TIMEOUT,
                        "invalid shutdown timeout, falling back to default"
                    );
                    DEFAULT_SHUTDOWN_TIMEOUT
                }
            };
        }

        if let Some(raw) = lookup(ENV_APP_NICE_FIELD) {
            self.app.nice_field = Some(raw);
        }

        if let Some(raw) = lookup(ENV_APP_SERVICES) {
            self.app.services = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(raw) = lookup(ENV_HELLO_WORLD_TICK) {
            let tick = humantime::parse_duration(raw.trim())
                .with_context(|| format!("invalid {ENV_HELLO_WORLD_TICK} value: {raw:?}"))?;
            if tick.is_zero() {
                bail!("{ENV_HELLO_WORLD_TICK} must be positive");
            }
            self.app.hello_world.tick = tick;
        }

        Ok(())
    }

    pub fn is_prod(&self) -> bool {
        self.env == Env::Prod
    }

    pub fn is_dev(&self) -> bool {
        self.env == Env::Dev
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => bail!("not a boolean"),
    }
}


mod test_config;
#[allow(dead_code)]
pub use test_config::new_test_config;
