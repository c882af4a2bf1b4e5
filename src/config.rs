//! Process configuration read from the environment.
//!
//! Every setting has a default so both servers start with no configuration at all.
//! Values are read once at startup; `.env` loading happens before this in the binaries.

use crate::error::{MuseError, Result};
use crate::imaging::DEFAULT_JPEG_QUALITY;
use crate::llm::gateways::gemini::{DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
use crate::llm::gateways::ollama::DEFAULT_OLLAMA_MODEL;
use crate::llm::gateways::{GeminiConfig, OllamaConfig};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct MuseConfig {
    pub bind_addr: SocketAddr,
    pub jpeg_quality: u8,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub ollama_host: String,
    pub ollama_model: String,
    pub gemini_base_url: String,
    pub gemini_model: String,
}

impl MuseConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let jpeg_quality: u8 = parse_var(&lookup, "MUSE_JPEG_QUALITY", DEFAULT_JPEG_QUALITY)?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(MuseError::ConfigError(format!(
                "MUSE_JPEG_QUALITY must be between 1 and 100, got {}",
                jpeg_quality
            )));
        }

        let timeout_secs: u64 =
            parse_var(&lookup, "MUSE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(MuseError::ConfigError(
                "MUSE_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: parse_var(&lookup, "MUSE_BIND_ADDR", default_bind_addr())?,
            jpeg_quality,
            max_upload_bytes: parse_var(
                &lookup,
                "MUSE_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            request_timeout: Duration::from_secs(timeout_secs),
            ollama_host: get("OLLAMA_HOST", DEFAULT_OLLAMA_HOST),
            ollama_model: get("MUSE_OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL),
            gemini_base_url: get("GEMINI_API_ENDPOINT", DEFAULT_GEMINI_BASE_URL),
            gemini_model: get("MUSE_GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        })
    }

    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            host: self.ollama_host.clone(),
            model: self.ollama_model.clone(),
            timeout: Some(self.request_timeout),
        }
    }

    pub fn gemini_config(&self, api_key: impl Into<String>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.into(),
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
            timeout: Some(self.request_timeout),
        }
    }
}

impl Default for MuseConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8501))
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| MuseError::ConfigError(format!("{}={:?}: {}", key, raw, e))),
    }
}
