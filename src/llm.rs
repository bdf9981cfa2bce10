use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extraction::ExtractionResult;

/// Used when the caller asks for no fields at all.
pub const DEFAULT_FIELDS: [&str; 10] = [
    "Address",
    "Real Estate Agency",
    "Price",
    "Beds",
    "Baths",
    "Sqft",
    "Home Type",
    "Listing Age",
    "Picture of home URL",
    "Listing URL",
];

pub const SYSTEM_PROMPT: &str = "You are an intelligent text extraction and conversion assistant. \
Your task is to extract structured information from the given text and convert it into a pure JSON format. \
The JSON should contain only the structured data extracted from the text, with no additional commentary, \
explanations, or extraneous information. You could encounter cases where you can't find the data of the \
fields you have to extract or the data will be in a foreign language. Please process the following text \
and provide the output in pure JSON format with no words before or after the JSON:";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub response_format: ResponseFormat,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::LlmError(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(body);
            return Err(AppError::LlmError(format!("{}: {}", status, message)));
        }

        res.json::<ChatResponse>()
            .await
            .map_err(|e| AppError::LlmError(format!("Invalid response format from LLM: {}", e)))
    }
}

/// Field list the model is asked for; falls back to [`DEFAULT_FIELDS`].
pub fn effective_fields(fields: &[String]) -> Vec<String> {
    if fields.is_empty() {
        DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
    } else {
        fields.to_vec()
    }
}

pub fn build_user_prompt(content: &str, fields: &[String]) -> String {
    let field_list = serde_json::to_string(fields).unwrap_or_default();
    let mut result = String::with_capacity(content.len() + field_list.len() + 100);
    result.push_str("Extract the following information from the provided text:\nPage content:\n\n");
    result.push_str(content);
    result.push_str("\n\nInformation to extract: ");
    result.push_str(&field_list);
    result
}

/// Decodes trimmed completion text, keeping the text on failure.
pub fn decode_completion(text: &str) -> Result<ExtractionResult> {
    let trimmed = text.trim();
    serde_json::from_str::<Value>(trimmed)
        .map(ExtractionResult::from)
        .map_err(|e| AppError::DecodeError {
            message: e.to_string(),
            text: trimmed.to_string(),
        })
}

#[derive(Clone)]
pub struct Extractor {
    provider: Arc<dyn ChatProvider>,
    model: String,
}

impl Extractor {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self { provider, model: model.into() }
    }

    pub fn openai(config: &Config) -> Self {
        Self::new(Arc::new(OpenAiProvider::new(config)), config.openai_model.clone())
    }

    pub fn build_request(&self, content: &str, fields: &[String]) -> ChatRequest {
        let fields = effective_fields(fields);
        ChatRequest {
            model: self.model.clone(),
            response_format: ResponseFormat { kind: "json_object".into() },
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(build_user_prompt(content, &fields)),
            ],
        }
    }

    pub async fn extract(&self, content: &str, fields: &[String]) -> Result<ExtractionResult> {
        let request = self.build_request(content, fields);
        info!(model = %self.model, fields = fields.len(), chars = content.len(), "Calling LLM API");
        let start = Instant::now();

        let response = self.provider.complete(&request).await?;
        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AppError::EmptyResponse)?;

        debug!(elapsed = ?start.elapsed(), "Formatted data received from API: {}", text);

        decode_completion(&text).inspect_err(|e| warn!("JSON decoding error: {}", e))
    }
}
