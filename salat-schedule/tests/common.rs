#![allow(dead_code)]

use async_trait::async_trait;
use salat_common::observability::{LogConfig, LogFormat};
use salat_schedule::{FetchError, PageFetcher, RawPage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::Notify;
use url::Url;

pub const NAJAF_PAGE: &str = include_str!("fixtures/najaf_english.html");

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "salat-tests",
            emit_stderr: true,
            format: if std::env::var("SALAT_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".into(),
            log_dir: Some(std::env::temp_dir().join("salat-tests")),
        };

        salat_common::observability::init_logging(config).unwrap_or_default()
    });
}

pub fn source_url() -> Url {
    Url::parse("https://najaf.org/english/").unwrap()
}

pub fn page_with_items(items: &str) -> String {
    format!(r#"<html><body><div id="prayer_time"><ul>{items}</ul></div></body></html>"#)
}

/// Fetcher that replays scripted responses, counting calls. When gated, each
/// fetch waits for one `notify_one` before answering.
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<String, FetchError>>>,
    fallback: Result<String, FetchError>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedFetcher {
    pub fn always(body: &str) -> Self {
        Self::scripted(Vec::new(), Ok(body.to_string()))
    }

    pub fn failing(err: FetchError) -> Self {
        Self::scripted(Vec::new(), Err(err))
    }

    pub fn scripted(
        script: Vec<Result<String, FetchError>>,
        fallback: Result<String, FetchError>,
    ) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            fallback,
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        next.map(|body| RawPage {
            url: url.clone(),
            body,
        })
    }
}

pub fn unavailable(url: &Url) -> FetchError {
    FetchError::Status {
        url: url.to_string(),
        status: 503,
        cause: "Service Unavailable".into(),
    }
}
