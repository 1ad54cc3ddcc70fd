//! Loader for `salat.yaml` with environment overlays.
//!
//! Precedence, lowest to highest: built-in defaults, YAML files/snippets in
//! the order they were added, then `SALAT__`-prefixed environment variables
//! (`SALAT__SOURCE__URL`, `SALAT__LOGGING__LEVEL`, ...). After merging,
//! `${VAR}` placeholders in string values are expanded from the process
//! environment.
use config::{Config, ConfigError, Environment, File};
use salat_common::LogFormat;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_SOURCE_URL: &str = "https://najaf.org/english/";
pub const DEFAULT_CONTAINER_ID: &str = "prayer_time";

#[derive(Debug, Default, Deserialize)]
pub struct SalatConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the schedule page lives and how to request it.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Element id holding the `<ul>` of prayer times.
    #[serde(default = "default_container_id")]
    pub container_id: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            container_id: default_container_id(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub stderr: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
            stderr: false,
            dir: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_SOURCE_URL.into()
}
fn default_container_id() -> String {
    DEFAULT_CONTAINER_ID.into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    concat!("salat/", env!("CARGO_PKG_VERSION")).into()
}
fn default_level() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SalatConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SalatConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SalatConfigLoader {
    /// Start empty: defaults plus `SALAT__` env overrides.
    ///
    /// ```
    /// use salat_config::{SalatConfigLoader, DEFAULT_SOURCE_URL};
    ///
    /// let config = SalatConfigLoader::new()
    ///     .with_yaml_str("source:\n  timeout_secs: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.source.timeout_secs, 5);
    /// assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
    /// assert_eq!(config.source.container_id, "prayer_time");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent (headless setups rely on env only).
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use salat_common::LogFormat;
    /// use salat_config::SalatConfigLoader;
    ///
    /// let cfg = SalatConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// logging:
    ///   format: json
    ///   stderr: true
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.logging.format, LogFormat::Json);
    /// assert!(cfg.logging.stderr);
    /// assert_eq!(cfg.logging.level, "info");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use salat_config::SalatConfigLoader;
    ///
    /// unsafe { std::env::set_var("SALAT_DOC_MIRROR", "https://mirror.example/english/"); }
    ///
    /// let config = SalatConfigLoader::new()
    ///     .with_yaml_str("source:\n  url: \"${SALAT_DOC_MIRROR}\"")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.source.url, "https://mirror.example/english/");
    ///
    /// unsafe { std::env::remove_var("SALAT_DOC_MIRROR"); }
    /// ```
    pub fn load(self) -> Result<SalatConfig, ConfigError> {
        // Environment goes last so it overrides every file and snippet.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("SALAT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: SalatConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        if typed.source.container_id.trim().is_empty() {
            return Err(ConfigError::Message(
                "source.container_id must not be empty".into(),
            ));
        }

        Ok(typed)
    }
}
