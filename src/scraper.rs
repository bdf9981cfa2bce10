use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};

/// A single page fetch as sent to the scraping provider.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(rename = "pageOptions")]
    pub page_options: PageOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageOptions {
    #[serde(rename = "onlyMainContent")]
    pub only_main_content: bool,
}

impl ScrapeRequest {
    pub fn main_content(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_options: PageOptions {
                only_main_content: true,
            },
        }
    }
}

/// Anything that can turn a [`ScrapeRequest`] into a response envelope.
#[async_trait]
pub trait ScrapeProvider: Send + Sync {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Value>;
}

/// Firecrawl REST client.
pub struct FirecrawlProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.firecrawl_api_key.clone(),
            base_url: config.firecrawl_base_url.clone(),
        }
    }
}

#[async_trait]
impl ScrapeProvider for FirecrawlProvider {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Value> {
        let res = self
            .client
            .post(format!("{}/v0/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::FetchError(failure_message(status, &body)));
        }

        let mut json: Value = res.json().await?;
        if json["success"] == Value::Bool(false) {
            let message = json["error"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("scrape request failed with status {}", status));
            return Err(AppError::FetchError(message));
        }

        // The payload lives under `data`; older deployments return it at the top level.
        if json.get("data").is_some() {
            Ok(json["data"].take())
        } else {
            Ok(json)
        }
    }
}

/// Status line plus the provider's `error` text when the body carries one.
fn failure_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());
    if detail.is_empty() {
        format!("scrape request failed with status {}", status)
    } else {
        format!("scrape request failed with status {}: {}", status, detail)
    }
}

/// Pulls the markdown body out of a provider envelope.
pub fn markdown_from_envelope(envelope: &Value) -> Result<String> {
    match envelope.get("markdown").and_then(Value::as_str) {
        Some(markdown) if !markdown.is_empty() => Ok(markdown.to_string()),
        _ => Err(AppError::MissingContent),
    }
}

#[derive(Clone)]
pub struct ContentFetcher {
    provider: Arc<dyn ScrapeProvider>,
}

impl ContentFetcher {
    pub fn new(provider: Arc<dyn ScrapeProvider>) -> Self {
        Self { provider }
    }

    pub fn firecrawl(config: &Config) -> Self {
        Self::new(Arc::new(FirecrawlProvider::new(config)))
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "Fetching main content");
        let start = Instant::now();

        let envelope = self.provider.scrape(&ScrapeRequest::main_content(url)).await?;
        let markdown = markdown_from_envelope(&envelope).inspect_err(|_| {
            warn!(url, "Scrape response carried no markdown");
        })?;

        debug!(chars = markdown.len(), elapsed = ?start.elapsed(), "Fetched content");
        Ok(markdown)
    }
}
