//! Gemini implementation of the PromptClient trait.
//!
//! Downloads the image, sends it inline with the analysis instruction and
//! asks for JSON matching [`GeneratedPrompt`].
//!
//! # Example
//!
//! ```rust,ignore
//! use promptify::ai::GeminiPromptClient;
//!
//! let client = GeminiPromptClient::from_env();
//! let controller = PromptController::new(client);
//! ```

use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError, Part};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{PromptifyError, Result};
use crate::traits::client::{PromptClient, PromptRequest};
use crate::traits::probe::is_image_content_type;
use crate::types::outcome::GeneratedPrompt;

/// Instruction sent with every image.
pub const PROMPT_TEMPLATE: &str = "You are an expert AI image analyst and prompt generator. \
Your task is to analyze an image and provide a detailed art prompt, along with descriptive tags.

Analyze the attached image.

Based on your analysis, provide the following in the specified JSON format:
1.  **prompt**: A detailed and descriptive text prompt suitable for AI image generation models like DALL-E, Midjourney, or Stable Diffusion. This should capture the visual and stylistic essence of the image.
2.  **tags**: Generate a list of 5-7 relevant keywords or tags that describe the image's style, subject, content, and mood (e.g., \"photorealistic\", \"portrait\", \"dark lighting\", \"vibrant colors\", \"close-up\").
";

/// MIME type assumed when the image server does not send one.
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Gemini-backed prompt client.
///
/// A personal credential on the request replaces the default key for that
/// call only.
#[derive(Debug, Clone)]
pub struct GeminiPromptClient {
    gemini: GeminiClient,
    http: Client,
}

impl GeminiPromptClient {
    /// Wrap a configured Gemini client (keyed or keyless).
    pub fn new(gemini: GeminiClient) -> Self {
        Self {
            gemini,
            http: Client::new(),
        }
    }

    /// Default key from `GEMINI_API_KEY`/`GOOGLE_API_KEY` when set; keyless
    /// otherwise, so every request then needs a personal credential.
    pub fn from_env() -> Self {
        Self::new(GeminiClient::from_env().unwrap_or_else(|_| GeminiClient::keyless()))
    }

    /// Set the model (default: gemini-2.0-flash).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.gemini = self.gemini.with_model(model);
        self
    }

    /// Download an image and wrap it as an inline part.
    async fn image_part(&self, url: &str) -> Result<Part> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PromptifyError::ImageUnavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PromptifyError::ImageUnavailable {
                reason: format!("HTTP {} fetching {}", status, url),
            });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_image_content_type(v))
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PromptifyError::ImageUnavailable {
                reason: e.to_string(),
            })?;

        debug!(url, mime_type = %mime_type, size = bytes.len(), "Image downloaded");
        Ok(Part::inline_data(mime_type, &bytes))
    }
}

#[async_trait]
impl PromptClient for GeminiPromptClient {
    async fn generate(&self, request: &PromptRequest) -> Result<GeneratedPrompt> {
        let personal = request.credential.is_some();
        let gemini = match &request.credential {
            Some(key) => self.gemini.with_api_key(key.expose()),
            None if self.gemini.has_api_key() => self.gemini.clone(),
            None => {
                return Err(PromptifyError::Config(
                    "no API key: set a personal key or GEMINI_API_KEY".into(),
                ))
            }
        };

        let image = self.image_part(&request.image_url).await?;

        gemini
            .extract::<GeneratedPrompt>(vec![Part::text(PROMPT_TEMPLATE), image])
            .await
            .map_err(|e| {
                if e.is_rate_limited() {
                    warn!(personal_key = personal, "Gemini quota exhausted");
                }
                match e {
                    GeminiError::EmptyResponse if personal => PromptifyError::Remote(
                        "Failed to generate prompt with the provided API key.".into(),
                    ),
                    other => PromptifyError::remote(other),
                }
            })
    }
}
