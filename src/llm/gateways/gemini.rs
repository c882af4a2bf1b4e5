//! Gemini gateway for outfit suggestions.
//!
//! Talks to the `generateContent` REST endpoint: the wardrobe JPEG goes in as inline
//! data next to the user prompt, and the stylist persona travels in the separate
//! `system_instruction` field.

use crate::error::{MuseError, Result};
use crate::imaging::WardrobeImage;
use crate::llm::gateway::StylistGateway;
use crate::llm::models::BackendKind;
use crate::llm::prompt::StylistPrompt;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for connecting to the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

/// Gateway for the hosted Gemini multimodal model.
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Create a new Gemini gateway with custom configuration.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl StylistGateway for GeminiGateway {
    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate(&self, image: &WardrobeImage, prompt: &StylistPrompt) -> Result<String> {
        info!("Delegating to Gemini for outfit suggestion");
        debug!(model = %self.config.model, jpeg_bytes = image.as_bytes().len(), "Gemini request");

        let body = build_request_body(image, prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(MuseError::GatewayError(format!(
                "Gemini API error {}: {}",
                status,
                api_error_message(&error_text)
            )));
        }

        let response_body: Value = response.json().await?;
        extract_text(&response_body)
    }
}

fn build_request_body(image: &WardrobeImage, prompt: &StylistPrompt) -> Value {
    let mut body = serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inline_data": {
                        "mime_type": image.mime_type(),
                        "data": image.to_base64()
                    }
                },
                { "text": prompt.user_prompt }
            ]
        }]
    });

    if let Some(system_instruction) = &prompt.system_instruction {
        body["system_instruction"] = serde_json::json!({
            "parts": [{ "text": system_instruction }]
        });
    }

    body
}

// Concatenated text parts of the first candidate
fn extract_text(body: &Value) -> Result<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array();

    let text: String = parts
        .into_iter()
        .flatten()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if !text.is_empty() {
        return Ok(text);
    }

    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        warn!(reason, "Gemini blocked the prompt");
        return Err(MuseError::GatewayError(format!("Prompt blocked: {}", reason)));
    }

    let finish_reason = body["candidates"][0]["finishReason"].as_str().unwrap_or("unknown");
    Err(MuseError::GatewayError(format!(
        "No text in Gemini response (finish reason: {})",
        finish_reason
    )))
}

fn api_error_message(error_text: &str) -> String {
    serde_json::from_str::<Value>(error_text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| error_text.to_string())
}
