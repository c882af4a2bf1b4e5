pub mod app;
pub mod config;
pub mod credentials;
pub mod error;
pub mod imaging;
pub mod llm;
pub mod stylist;
pub mod web;

pub use error::{MissingInput, MuseError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::MuseConfig;
    pub use crate::error::{MissingInput, MuseError, Result};
    pub use crate::imaging::WardrobeImage;
    pub use crate::llm::gateways::{GeminiGateway, OllamaGateway};
    pub use crate::llm::{BackendKind, StylistGateway, StylistPrompt};
    pub use crate::stylist::{Stylist, Submission, Suggestion};
    pub use crate::web::AppState;
}
