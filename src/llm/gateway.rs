use crate::error::Result;
use crate::imaging::WardrobeImage;
use crate::llm::models::BackendKind;
use crate::llm::prompt::StylistPrompt;
use async_trait::async_trait;

/// Abstract interface for the multimodal model behind a stylist
///
/// Implementations make exactly one outbound call per [`generate`](Self::generate)
/// and never retry.
#[async_trait]
pub trait StylistGateway: Send + Sync {
    /// Which backend family this gateway talks to
    fn kind(&self) -> BackendKind;

    /// Model identifier sent with every request
    fn model(&self) -> &str;

    /// URL the request is posted to
    fn endpoint(&self) -> String;

    /// Send the image and prompt, returning the model's text
    async fn generate(&self, image: &WardrobeImage, prompt: &StylistPrompt) -> Result<String>;
}
