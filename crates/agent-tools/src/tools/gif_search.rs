//! Tenor GIF lookup.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use brain_core::MediaResolver;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ToolError;

/// Tenor v2 search endpoint.
pub const DEFAULT_TENOR_URL: &str = "https://tenor.googleapis.com/v2/search";

/// Value shipped in example env files; treated as unset.
const PLACEHOLDER_KEY: &str = "your_tenor_api_key_here";

const CLIENT_KEY: &str = "banter-chat-bot";

const GIF_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct TenorResponse {
    #[serde(default)]
    results: Vec<TenorResult>,
}

#[derive(Debug, Deserialize)]
struct TenorResult {
    media_formats: MediaFormats,
}

#[derive(Debug, Deserialize)]
struct MediaFormats {
    gif: Option<MediaFormat>,
}

#[derive(Debug, Deserialize)]
struct MediaFormat {
    url: String,
}

/// Resolves GIF queries through the Tenor API.
///
/// Without an API key every lookup resolves to `None`.
pub struct TenorGifs {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TenorGifs {
    /// Create a resolver with an optional API key.
    ///
    /// Blank keys and the example-file placeholder count as no key.
    pub fn new(api_key: Option<String>) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder().timeout(GIF_TIMEOUT).build()?;
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_KEY);

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_TENOR_URL.to_string(),
        })
    }

    /// Create a resolver from `TENOR_API_KEY`.
    pub fn from_env() -> Result<Self, ToolError> {
        Self::new(env::var("TENOR_API_KEY").ok())
    }

    /// Point the resolver at a different endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, ToolError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::NotConfigured("TENOR_API_KEY".to_string()))?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("key", key),
                ("client_key", CLIENT_KEY),
                ("limit", "1"),
                ("media_filter", "gif"),
                ("contentfilter", "medium"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::ExecutionFailed(format!(
                "Tenor returned HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        first_gif_url(&body)
    }
}

/// Pull `results[0].media_formats.gif.url` out of a Tenor response body.
fn first_gif_url(body: &str) -> Result<Option<String>, ToolError> {
    let parsed: TenorResponse = serde_json::from_str(body)?;
    Ok(parsed
        .results
        .into_iter()
        .next()
        .and_then(|result| result.media_formats.gif)
        .map(|gif| gif.url))
}

#[async_trait]
impl MediaResolver for TenorGifs {
    async fn resolve(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        match self.lookup(query).await {
            Ok(Some(url)) => {
                debug!("Resolved GIF for {:?}: {}", query, url);
                Some(url)
            }
            Ok(None) => {
                debug!("No GIF found for {:?}", query);
                None
            }
            Err(ToolError::NotConfigured(what)) => {
                debug!("GIF lookup skipped, {} not set", what);
                None
            }
            Err(e) => {
                warn!("GIF lookup failed: {}", e);
                None
            }
        }
    }
}
