#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_web_extractor::error::{AppError, Result};
use rust_web_extractor::llm::{ChatProvider, ChatRequest, ChatResponse, Extractor};
use rust_web_extractor::pipeline::Pipeline;
use rust_web_extractor::scraper::{ContentFetcher, ScrapeProvider, ScrapeRequest};
use serde_json::{json, Value};

/// Replays a fixed envelope and remembers what it was asked for.
pub struct StubScraper {
    pub envelope: Value,
    pub requests: Mutex<Vec<ScrapeRequest>>,
}

impl StubScraper {
    pub fn new(envelope: Value) -> Arc<Self> {
        Arc::new(Self {
            envelope,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ScrapeProvider for StubScraper {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<Value> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.envelope.clone())
    }
}

pub struct FailingScraper;

#[async_trait]
impl ScrapeProvider for FailingScraper {
    async fn scrape(&self, _request: &ScrapeRequest) -> Result<Value> {
        Err(AppError::FetchError("Unauthorized: invalid token".to_string()))
    }
}

/// Answers every completion with the same choices.
pub struct StubChat {
    pub choices: Value,
    pub requests: Mutex<Vec<Value>>,
}

impl StubChat {
    pub fn replying(content: &str) -> Arc<Self> {
        Self::with_choices(json!([{"index": 0, "message": {"role": "assistant", "content": content}}]))
    }

    pub fn with_choices(choices: Value) -> Arc<Self> {
        Arc::new(Self {
            choices,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> Value {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

#[async_trait]
impl ChatProvider for StubChat {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(serde_json::to_value(request).unwrap());
        Ok(serde_json::from_value(json!({"choices": self.choices.clone()})).unwrap())
    }
}

pub fn pipeline(scraper: Arc<dyn ScrapeProvider>, chat: Arc<dyn ChatProvider>, dir: &Path) -> Pipeline {
    Pipeline::new(ContentFetcher::new(scraper), Extractor::new(chat, "gpt-4o"), dir)
}
