//! Wiring shared by the server binaries.

use crate::config::MuseConfig;
use crate::credentials::{load_env_file, require_api_key, EnvFileStatus};
use crate::error::Result;
use crate::llm::gateways::{GeminiGateway, OllamaGateway};
use crate::stylist::Stylist;
use crate::web::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Load the nearest `.env` before configuration is read, and log what happened.
pub fn load_env(start_dir: &Path) -> EnvFileStatus {
    let status = load_env_file(start_dir);
    match &status.found_path {
        Some(path) if status.loaded => info!("Loaded environment from {}", path.display()),
        Some(_) => {}
        None => info!(
            "No .env file found from {}; using the process environment",
            start_dir.display()
        ),
    }
    status
}

/// State for the local variant, backed by Ollama.
pub fn local_state(config: &MuseConfig) -> Result<AppState> {
    let gateway = OllamaGateway::with_config(config.ollama_config())?;
    let stylist = Stylist::new(Arc::new(gateway)).with_jpeg_quality(config.jpeg_quality);
    Ok(AppState::new(stylist))
}

/// State for the cloud variant, backed by Gemini.
///
/// Fails with [`crate::MuseError::MissingCredential`] before any gateway exists when
/// the key is absent.
pub fn cloud_state<F>(config: &MuseConfig, lookup: F) -> Result<AppState>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = require_api_key(lookup)?;
    let gateway = GeminiGateway::with_config(config.gemini_config(api_key))?;
    let stylist = Stylist::new(Arc::new(gateway)).with_jpeg_quality(config.jpeg_quality);
    Ok(AppState::new(stylist))
}
