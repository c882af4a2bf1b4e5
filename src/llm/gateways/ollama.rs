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

/// Vision model used when none is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "llava:7b";

/// Suggestion text shown when Ollama answers without a `response` field
pub const MISSING_RESPONSE_PLACEHOLDER: &str = "Error: Model response not found.";

/// Configuration for connecting to Ollama server
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

/// Gateway for a local Ollama vision model
///
/// Posts one non-streamed request to `/api/generate` with the prompt and a single
/// base64-encoded JPEG, and reads back the `response` field.
pub struct OllamaGateway {
    client: Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Create a new Ollama gateway from an explicit configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl StylistGateway for OllamaGateway {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.host.trim_end_matches('/'))
    }

    async fn generate(&self, image: &WardrobeImage, prompt: &StylistPrompt) -> Result<String> {
        info!("Delegating to Ollama for outfit suggestion");
        debug!("Model: {}, JPEG bytes: {}", self.config.model, image.as_bytes().len());

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt.user_prompt,
            "images": [image.to_base64()],
            "stream": false
        });

        let endpoint = self.endpoint();
        let response = self.client.post(&endpoint).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                MuseError::BackendUnreachable {
                    endpoint: endpoint.clone(),
                    model: self.config.model.clone(),
                }
            } else {
                MuseError::HttpError(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(MuseError::GatewayError(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let response_body: Value = response.json().await?;

        match response_body["response"].as_str() {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!("Ollama response had no 'response' field");
                Ok(MISSING_RESPONSE_PLACEHOLDER.to_string())
            }
        }
    }
}
