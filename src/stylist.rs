//! Outfit suggestion pipeline.
//!
//! A [`Submission`] can only be built from a present image and a non-empty occasion,
//! so a [`Stylist`] never reaches its gateway with missing input. Every failure after
//! that point (decode, transport, backend) comes back as a [`Suggestion::Failed`]
//! carrying the message to show the user.

use crate::error::{MissingInput, MuseError, Result};
use crate::imaging::{WardrobeImage, DEFAULT_JPEG_QUALITY};
use crate::llm::gateway::StylistGateway;
use crate::llm::models::BackendKind;
use crate::llm::prompt::StylistPrompt;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{error, info};

/// A validated form submission
#[derive(Debug, Clone)]
pub struct Submission {
    image: Bytes,
    occasion: String,
}

impl Submission {
    pub fn new(image: Option<Bytes>, occasion: &str) -> std::result::Result<Self, MissingInput> {
        let image = image.filter(|bytes| !bytes.is_empty());
        let occasion_missing = occasion.is_empty();

        match image {
            Some(image) if !occasion_missing => Ok(Self {
                image,
                occasion: occasion.to_string(),
            }),
            image => Err(MissingInput {
                image: image.is_none(),
                occasion: occasion_missing,
            }),
        }
    }

    pub fn image(&self) -> &Bytes {
        &self.image
    }

    pub fn occasion(&self) -> &str {
        &self.occasion
    }
}

/// What the recommendation panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Ready(String),
    Failed(String),
}

impl Suggestion {
    pub fn text(&self) -> &str {
        match self {
            Suggestion::Ready(text) | Suggestion::Failed(text) => text,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Suggestion::Ready(_))
    }
}

/// Result of one consultation: the normalized image, if it decoded, and the suggestion
#[derive(Debug, Clone)]
pub struct Consultation {
    pub image: Option<WardrobeImage>,
    pub suggestion: Suggestion,
}

/// User-facing text for a failed consultation
pub fn describe_failure(kind: BackendKind, error: &MuseError) -> String {
    match (kind, error) {
        (_, MuseError::BackendUnreachable { endpoint, model }) => format!(
            "**Connection Error:** Could not connect to Ollama at {}.\n\n\
             Please ensure Ollama is installed, the {} model is pulled, \
             and the Ollama server is running.",
            endpoint, model
        ),
        (_, MuseError::ImageError(e)) => format!("Could not read the uploaded image: {}", e),
        (BackendKind::Local, e) => format!("An error occurred during the API call: {}", e),
        (BackendKind::Cloud, e) => {
            format!("An error occurred while generating the suggestion: {}", e)
        }
    }
}

/// Runs submissions through image normalization, prompt assembly and one gateway call
pub struct Stylist {
    gateway: Arc<dyn StylistGateway>,
    jpeg_quality: u8,
}

impl Stylist {
    pub fn new(gateway: Arc<dyn StylistGateway>) -> Self {
        Self {
            gateway,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn with_jpeg_quality(mut self, jpeg_quality: u8) -> Self {
        self.jpeg_quality = jpeg_quality;
        self
    }

    pub fn kind(&self) -> BackendKind {
        self.gateway.kind()
    }

    pub fn model(&self) -> &str {
        self.gateway.model()
    }

    pub fn endpoint(&self) -> String {
        self.gateway.endpoint()
    }

    /// Decode and normalize upload bytes off the async runtime
    pub async fn prepare_image(&self, bytes: Bytes) -> Result<WardrobeImage> {
        let quality = self.jpeg_quality;
        tokio::task::spawn_blocking(move || WardrobeImage::from_upload(&bytes, quality))
            .await
            .map_err(|e| MuseError::TaskError(e.to_string()))?
    }

    /// Ask the model for an outfit. Never fails; errors become display text.
    pub async fn consult(&self, submission: &Submission) -> Consultation {
        let image = match self.prepare_image(submission.image().clone()).await {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to prepare wardrobe image: {}", e);
                return Consultation {
                    image: None,
                    suggestion: Suggestion::Failed(describe_failure(self.kind(), &e)),
                };
            }
        };

        let suggestion = self.suggest(&image, submission.occasion()).await;

        Consultation {
            image: Some(image),
            suggestion,
        }
    }

    pub async fn suggest(&self, image: &WardrobeImage, occasion: &str) -> Suggestion {
        let prompt = StylistPrompt::for_backend(self.kind(), occasion);

        info!(backend = %self.kind(), model = self.model(), "Requesting outfit suggestion");

        match self.gateway.generate(image, &prompt).await {
            Ok(text) => Suggestion::Ready(text),
            Err(e) => {
                error!("Outfit suggestion failed: {}", e);
                Suggestion::Failed(describe_failure(self.kind(), &e))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::imaging::tests::png_bytes;
    use crate::llm::gateways::{OllamaConfig, OllamaGateway};
    use async_trait::async_trait;
    use image::DynamicImage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Gateway double that records calls and replays a canned reply
    pub(crate) struct RecordingGateway {
        pub kind: BackendKind,
        pub reply: std::result::Result<String, String>,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<StylistPrompt>>,
    }

    impl RecordingGateway {
        pub(crate) fn replying(kind: BackendKind, reply: &str) -> Self {
            Self {
                kind,
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(kind: BackendKind, message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                ..Self::replying(kind, "")
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StylistGateway for RecordingGateway {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn model(&self) -> &str {
            "recording-model"
        }

        fn endpoint(&self) -> String {
            "http://recording.test/generate".to_string()
        }

        async fn generate(&self, _image: &WardrobeImage, prompt: &StylistPrompt) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.clone());
            self.reply.clone().map_err(MuseError::GatewayError)
        }
    }

    fn upload() -> Bytes {
        Bytes::from(png_bytes(DynamicImage::new_rgba8(6, 4)))
    }

    #[test]
    fn test_submission_requires_image() {
        let err = Submission::new(None, "Dinner party").unwrap_err();
        assert!(err.image);
        assert!(!err.occasion);
    }

    #[test]
    fn test_submission_treats_empty_upload_as_missing() {
        let err = Submission::new(Some(Bytes::new()), "Dinner party").unwrap_err();
        assert!(err.image);
    }

    #[test]
    fn test_submission_requires_occasion() {
        let err = Submission::new(Some(upload()), "").unwrap_err();
        assert!(!err.image);
        assert!(err.occasion);
    }

    #[test]
    fn test_submission_accepts_whitespace_occasion() {
        let submission = Submission::new(Some(upload()), "   \n").unwrap();
        assert_eq!(submission.occasion(), "   \n");
    }

    #[test]
    fn test_submission_missing_both() {
        let err = Submission::new(None, "").unwrap_err();
        assert_eq!(
            err,
            MissingInput {
                image: true,
                occasion: true
            }
        );
    }

    #[test]
    fn test_submission_keeps_occasion_verbatim() {
        let submission = Submission::new(Some(upload()), "  Rooftop party  ").unwrap();
        assert_eq!(submission.occasion(), "  Rooftop party  ");
    }

    #[test]
    fn test_suggestion_text() {
        assert_eq!(Suggestion::Ready("X".to_string()).text(), "X");
        assert_eq!(Suggestion::Failed("oops".to_string()).text(), "oops");
        assert!(Suggestion::Ready("X".to_string()).is_ready());
        assert!(!Suggestion::Failed("oops".to_string()).is_ready());
    }

    #[test]
    fn test_describe_failure_connection() {
        let err = MuseError::BackendUnreachable {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "llava:7b".to_string(),
        };
        let message = describe_failure(BackendKind::Local, &err);
        assert!(message.starts_with("**Connection Error:** Could not connect to Ollama at "));
        assert!(message.contains("http://localhost:11434/api/generate"));
        assert!(message.contains("llava:7b"));
    }

    #[test]
    fn test_describe_failure_per_backend() {
        let err = MuseError::GatewayError("boom".to_string());
        assert_eq!(
            describe_failure(BackendKind::Local, &err),
            "An error occurred during the API call: LLM gateway error: boom"
        );
        assert_eq!(
            describe_failure(BackendKind::Cloud, &err),
            "An error occurred while generating the suggestion: LLM gateway error: boom"
        );
    }

    #[tokio::test]
    async fn test_consult_returns_gateway_text_exactly() {
        let gateway = Arc::new(RecordingGateway::replying(BackendKind::Local, "X"));
        let stylist = Stylist::new(gateway.clone());
        let submission = Submission::new(Some(upload()), "Dinner party").unwrap();

        let consultation = stylist.consult(&submission).await;

        assert_eq!(consultation.suggestion, Suggestion::Ready("X".to_string()));
        assert_eq!(consultation.image.unwrap().dimensions(), (6, 4));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_occasion_reaches_gateway() {
        let gateway = Arc::new(RecordingGateway::replying(BackendKind::Local, "ok"));
        let stylist = Stylist::new(gateway.clone());
        let submission = Submission::new(Some(upload()), "  ").unwrap();

        stylist.consult(&submission).await;

        assert_eq!(gateway.call_count(), 1);
        let prompts = gateway.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), &[StylistPrompt::local("  ")]);
    }

    #[tokio::test]
    async fn test_consult_uses_backend_prompt() {
        let gateway = Arc::new(RecordingGateway::replying(BackendKind::Cloud, "ok"));
        let stylist = Stylist::new(gateway.clone());
        let submission = Submission::new(Some(upload()), "Ski lodge weekend").unwrap();

        stylist.consult(&submission).await;

        let prompts = gateway.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), &[StylistPrompt::cloud("Ski lodge weekend")]);
    }

    #[tokio::test]
    async fn test_consult_gateway_failure_becomes_message() {
        let gateway = Arc::new(RecordingGateway::failing(BackendKind::Cloud, "quota exceeded"));
        let stylist = Stylist::new(gateway);
        let submission = Submission::new(Some(upload()), "Dinner party").unwrap();

        let consultation = stylist.consult(&submission).await;

        assert!(!consultation.suggestion.is_ready());
        assert!(consultation.suggestion.text().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_consult_undecodable_image_skips_gateway() {
        let gateway = Arc::new(RecordingGateway::replying(BackendKind::Local, "X"));
        let stylist = Stylist::new(gateway.clone());
        let submission =
            Submission::new(Some(Bytes::from_static(b"definitely not a photo")), "Dinner").unwrap();

        let consultation = stylist.consult(&submission).await;

        assert!(consultation.image.is_none());
        assert!(consultation
            .suggestion
            .text()
            .starts_with("Could not read the uploaded image"));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_consult_with_ollama_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":"X"}"#)
            .create();

        let gateway = OllamaGateway::with_config(OllamaConfig {
            host: server.url(),
            model: "llava:7b".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        let stylist = Stylist::new(Arc::new(gateway)).with_jpeg_quality(80);
        let submission = Submission::new(Some(upload()), "Dinner party").unwrap();

        let consultation = stylist.consult(&submission).await;

        mock.assert();
        assert_eq!(consultation.suggestion.text(), "X");
    }

    #[tokio::test]
    async fn test_consult_with_unreachable_ollama() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let host = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let gateway = OllamaGateway::with_config(OllamaConfig {
            host: host.clone(),
            model: "llava:7b".to_string(),
            timeout: Some(Duration::from_secs(5)),
        })
        .unwrap();
        let stylist = Stylist::new(Arc::new(gateway));
        let submission = Submission::new(Some(upload()), "Dinner party").unwrap();

        let consultation = stylist.consult(&submission).await;

        let text = consultation.suggestion.text();
        assert!(text.contains(&format!("{}/api/generate", host)));
        assert!(text.contains("llava:7b"));
    }
}
