use anyhow::Result;
use clap::Parser;
use salat_common::SalatError;
use salat_common::observability::{LogConfig, init_logging};
use salat_config::{SalatConfig, SalatConfigLoader};
use salat_schedule::ScheduleCache;

mod cli;
mod render;
mod watch;

use cli::{Cli, Command};

const DEFAULT_CONFIG_FILE: &str = "salat.yaml";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let cfg = load_config(&cli)?;

    // 2) Logging follows the config; stdout stays clean for output
    let log_path = init_logging(LogConfig {
        app_name: "salat",
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format: cfg.logging.format,
        default_filter: cfg.logging.level.clone(),
    })?;
    tracing::debug!(log=%log_path.display(), source=%cfg.source.url, "app.start");

    let cache = ScheduleCache::from_config(&cfg.source)
        .map_err(|e| SalatError::Schedule(e.to_string()))?;

    match cli.command.unwrap_or_default() {
        Command::Show(opts) => {
            let snap = cache.get_schedule(chrono::Local::now()).await;
            println!("{}", render::render(&snap, &opts)?);
        }
        Command::Watch(opts) => watch::run(cache, opts).await?,
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SalatConfig, SalatError> {
    let loader = match &cli.config {
        Some(path) => SalatConfigLoader::new().with_file(path),
        None => SalatConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().map_err(|e| SalatError::Config(e.to_string()))
}
