//! Error types and result aliases for the Muse stylist.
//!
//! This module defines the core error type [`MuseError`] and the [`Result`] type alias
//! used throughout the crate. Failures that reach the page are turned into user-facing
//! text by [`crate::stylist::describe_failure`]; only startup failures end the process.

use thiserror::Error;

/// A form submission that lacks the wardrobe image, the occasion text, or both.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Please upload an image and describe the occasion.")]
pub struct MissingInput {
    pub image: bool,
    pub occasion: bool,
}

#[derive(Error, Debug)]
pub enum MuseError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Could not connect to Ollama at {endpoint} (model {model})")]
    BackendUnreachable { endpoint: String, model: String },

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("{0} environment variable not found")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskError(String),
}

pub type Result<T> = std::result::Result<T, MuseError>;
