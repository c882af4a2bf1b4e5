use serde::{Deserialize, Serialize};
use std::fmt;

/// Which model backend a stylist talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Self-hosted Ollama vision model
    Local,
    /// Hosted Gemini multimodal model
    Cloud,
}

impl BackendKind {
    /// Human-facing name of the model family, shown in page titles
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Local => "LLaVA",
            BackendKind::Cloud => "Gemini",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Cloud => write!(f, "cloud"),
        }
    }
}
