//! Logging setup shared by the `salat` binary and the integration tests.
//!
//! Everything goes to a daily rolling file; the CLI may mirror events to
//! stderr so stdout stays reserved for schedule output. [`init_logging`] is
//! process-wide and idempotent: later calls return the path chosen by the
//! first one.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::LogFormat;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "SALAT_LOG_DIR";

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Component name; names the log file and the default directory.
    pub app_name: &'static str,
    /// Explicit log directory. Falls back to `SALAT_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter directives used when `RUST_LOG` is unset (`info`,
    /// `salat_schedule=debug,warn`, ...).
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "salat",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialise the global `tracing` subscriber and return today's log file.
///
/// A malformed `default_filter` is an error.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let filter = build_filter(
        &config.default_filter,
        std::env::var("RUST_LOG").ok().as_deref(),
    )?;

    let dir = resolve_log_dir(
        config.app_name,
        config.log_dir.as_deref(),
        std::env::var(LOG_DIR_ENV).ok().as_deref(),
    );
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let file_name = format!("{}.log", config.app_name);
    let path = todays_log_file(&dir, &file_name);

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &file_name));
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer(config.format, writer))
        .with(config.emit_stderr.then(|| stderr_layer(config.format)))
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    tracing::debug!(
        app = config.app_name,
        path = %path.display(),
        format = ?config.format,
        stderr = config.emit_stderr,
        "logging.ready"
    );

    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

/// `RUST_LOG` wins when set and non-empty; otherwise the configured
/// directives, which must parse.
fn build_filter(default: &str, rust_log: Option<&str>) -> anyhow::Result<EnvFilter> {
    if let Some(env) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(env) {
            return Ok(filter);
        }
    }
    EnvFilter::try_new(default.trim())
        .with_context(|| format!("invalid log level/filter: {default:?}"))
}

fn file_layer<S>(format: LogFormat, writer: NonBlocking) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(false).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn stderr_layer<S>(format: LogFormat) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
    }
}

/// Name `tracing-appender`'s daily roller gives today's file.
fn todays_log_file(dir: &Path, file_name: &str) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d");
    dir.join(format!("{file_name}.{today}"))
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>, env_dir: Option<&str>) -> PathBuf {
    if let Some(dir) = explicit {
        return expand_home(dir);
    }
    if let Some(env_dir) = env_dir.map(str::trim).filter(|s| !s.is_empty()) {
        return expand_home(Path::new(env_dir));
    }
    default_data_dir(app_name)
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".local").join("share").join(app_name),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}
