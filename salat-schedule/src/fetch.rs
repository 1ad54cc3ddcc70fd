use async_trait::async_trait;
use salat_config::SourceConfig;
use salat_http::{HttpClient, HttpError, RequestOpts};
use std::time::Duration;
use url::Url;

use crate::error::FetchError;
use crate::types::RawPage;

/// Retrieves the source page. Implementations do not retry; a failed
/// attempt is reported and the cache decides what to serve instead.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError>;
}

/// [`PageFetcher`] over the workspace HTTP client.
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: HttpClient,
}

impl HttpPageFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn from_config(cfg: &SourceConfig) -> Result<Self, FetchError> {
        let client = HttpClient::new(&cfg.url)
            .and_then(|c| c.with_user_agent(&cfg.user_agent))
            .map_err(|e| FetchError::Url(e.to_string()))?
            .with_timeout(Duration::from_secs(cfg.timeout_secs));
        Ok(Self::new(client))
    }
}

fn map_http_error(url: &Url, err: HttpError) -> FetchError {
    match err {
        HttpError::Url(msg) => FetchError::Url(msg),
        HttpError::Build(cause) | HttpError::Network(cause) => FetchError::Transport {
            url: url.to_string(),
            cause,
        },
        HttpError::Api {
            status,
            url,
            message,
        } => FetchError::Status {
            url,
            status: status.as_u16(),
            cause: message,
        },
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawPage, FetchError> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        tracing::debug!(url=%url, "fetch.start");
        match self.client.get_text(url.as_str(), opts).await {
            Ok(resp) => {
                tracing::info!(url=%resp.url, status=%resp.status, bytes=resp.body.len(), "fetch.ok");
                Ok(RawPage {
                    url: resp.url,
                    body: resp.body,
                })
            }
            Err(err) => {
                let err = map_http_error(url, err);
                tracing::warn!(url=%url, error=%err, "fetch.failed");
                Err(err)
            }
        }
    }
}
