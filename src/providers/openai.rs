use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::BackendError;

use super::{error_for_decode, error_for_status, error_for_transport, BackendCall, TranslationBackend};

const BACKEND_NAME: &str = "OpenAI";

/// OpenAI client for the chat completions endpoint
#[derive(Debug)]
pub struct OpenAIBackend {
    /// HTTP client for API requests
    client: Client,
    /// API key for bearer authentication
    api_key: String,
    /// API base URL, e.g. https://api.openai.com/v1
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

impl ChatCompletionRequest {
    /// Create a new chat completion request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl OpenAIBackend {
    /// Create a new OpenAI client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
        }
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Extract text from an OpenAI response
    pub fn extract_text_from_response(response: &ChatCompletionResponse) -> Option<String> {
        let text = response.choices.first()?.message.content.trim();
        if text.is_empty() { None } else { Some(text.to_string()) }
    }
}

#[async_trait]
impl TranslationBackend for OpenAIBackend {
    async fn invoke(&self, call: &BackendCall) -> Result<String, BackendError> {
        if self.api_key.trim().is_empty() {
            return Err(BackendError::permanent("OpenAI API key is not configured"));
        }

        let request = ChatCompletionRequest::new(&self.model)
            .add_message("system", &call.instruction.system)
            .add_message("user", &call.instruction.user)
            .temperature(self.temperature);
        debug!("OpenAI request: {} ({} -> {})", call.strategy, call.source, call.target);

        let response = self.client.post(self.api_url())
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| error_for_transport(BACKEND_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            return Err(error_for_status(BACKEND_NAME, status, &error_text));
        }

        let body = response.json::<ChatCompletionResponse>().await
            .map_err(|e| error_for_decode(BACKEND_NAME, e))?;

        Self::extract_text_from_response(&body)
            .ok_or_else(|| BackendError::transient("OpenAI API returned no text"))
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
