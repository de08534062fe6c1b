use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::BackendError;

use super::{error_for_decode, error_for_status, error_for_transport, BackendCall, TranslationBackend};

const BACKEND_NAME: &str = "Gemini";

/// Gemini client for the Generative Language `generateContent` endpoint
#[derive(Debug)]
pub struct GeminiBackend {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `key` query parameter
    api_key: String,
    /// API base URL, e.g. https://generativelanguage.googleapis.com/v1beta
    endpoint: String,
    /// Model name
    model: String,
    /// Sampling temperature
    temperature: f32,
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// Conversation turns; a single user turn here
    contents: Vec<GeminiContent>,

    /// Role and rules for the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    temperature: f32,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
}

impl GenerateContentRequest {
    /// Build a request from a system instruction and a user prompt
    pub fn new(system: &str, user: &str, temperature: f32) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: user.to_string() }],
            }],
            system_instruction: Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system.to_string() }],
            }),
            generation_config: Some(GenerationConfig { temperature }),
        }
    }
}

impl GeminiBackend {
    /// Create a new Gemini client
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

    fn api_url(&self) -> Result<Url, BackendError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| BackendError::permanent(format!("Invalid Gemini endpoint '{}': {}", raw, e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Extract text from a Gemini response
    pub fn extract_text_from_response(response: &GenerateContentResponse) -> Option<String> {
        let content = response.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        let text = text.trim();
        if text.is_empty() { None } else { Some(text.to_string()) }
    }
}

#[async_trait]
impl TranslationBackend for GeminiBackend {
    async fn invoke(&self, call: &BackendCall) -> Result<String, BackendError> {
        if self.api_key.trim().is_empty() {
            return Err(BackendError::permanent("Gemini API key is not configured"));
        }

        let request = GenerateContentRequest::new(&call.instruction.system, &call.instruction.user, self.temperature);
        debug!("Gemini request: {} ({} -> {})", call.strategy, call.source, call.target);

        let response = self.client.post(self.api_url()?)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| error_for_transport(BACKEND_NAME, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, error_text);
            return Err(error_for_status(BACKEND_NAME, status, &error_text));
        }

        let body = response.json::<GenerateContentResponse>().await
            .map_err(|e| error_for_decode(BACKEND_NAME, e))?;

        Self::extract_text_from_response(&body)
            .ok_or_else(|| BackendError::transient("Gemini API returned no text"))
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}
