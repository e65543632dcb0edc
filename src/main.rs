// Main entrypoint for the servicepack binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use servicepack::app::App;
use servicepack::config::Config;
use servicepack::services::Service;
use servicepack::{logger, runner, services};

const APP_NAME: &str = "servicepack";

/// servicepack - runs a pack of long-lived services until shutdown
#[derive(Parser, Debug)]
#[command(name = APP_NAME, author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    cfg: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the app
    Run,
    /// List the built-in services
    Services,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match load_cfg(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{APP_NAME}: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Services => {
            for svc in services::builtin(&cfg) {
                println!("{}", svc.name());
            }
            ExitCode::SUCCESS
        }
        Command::Run => match run(cfg) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(
                    component = "main",
                    event = "run_failed",
                    error = %format!("{e:#}"),
                    "app runner failed"
                );
                ExitCode::FAILURE
            }
        },
    }
}

/// Loads configuration and configures the logger from it.
fn load_cfg(args: &Args) -> Result<Config> {
    let cfg = Config::load(args.cfg.as_deref())?;
    logger::configure(&cfg.logs)?;
    Ok(cfg)
}

fn run(cfg: Config) -> Result<()> {
    tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")?
        .block_on(async move {
            let manager = services::instance();
            manager.add(services::builtin(&cfg));

            let runner_cfg = cfg.runner.clone();
            let app = App::new(cfg, manager);

            runner::run(app, &runner_cfg).await?;
            Ok(())
        })
}
