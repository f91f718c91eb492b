//! reqwest-backed page renderer.

use std::time::Duration;

use async_trait::async_trait;
use moltreader_core::{FetchError, PageRenderer, ReaderSettings};

const USER_AGENT: &str = concat!("moltreader/", env!("CARGO_PKG_VERSION"));

/// Configuration for [`HttpPageRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Whole-request timeout, treated as the page load timeout.
    pub page_load_timeout: Duration,
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self::from_settings(&ReaderSettings::with_defaults())
    }
}

impl RendererConfig {
    pub fn from_settings(settings: &ReaderSettings) -> Self {
        Self {
            page_load_timeout: settings.page_load_timeout(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Fetches page markup with a single GET request.
///
/// Does not execute scripts: pages that render client-side need a
/// browser-backed [`PageRenderer`] instead.
pub struct HttpPageRenderer {
    client: reqwest::Client,
}

impl HttpPageRenderer {
    pub fn new(config: &RendererConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.page_load_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Navigation(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

/// Map transport failures onto the fetch error taxonomy.
fn map_reqwest_error(err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Navigation(err.to_string())
    }
}

#[async_trait]
impl PageRenderer for HttpPageRenderer {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!(%url, "Fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Page request failed");
            return Err(FetchError::Navigation(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| map_reqwest_error(&e))?;
        tracing::debug!(%url, bytes = body.len(), "Fetched page");
        Ok(body)
    }
}
