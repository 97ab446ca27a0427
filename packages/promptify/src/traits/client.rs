//! Remote prompt client trait.
//!
//! The controller's only view of the prompt-generation service: one image URL
//! in, one prompt plus tags out. Implementations must not touch controller
//! state; reconciling the result is the caller's job. No timeout is imposed
//! here, a hung call stays pending until the implementation gives up.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::security::credentials::SecretString;
use crate::types::outcome::GeneratedPrompt;

/// Request sent to the prompt service.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// The image to describe
    pub image_url: String,

    /// Personal API key; `None` falls back to the service's default key
    pub credential: Option<SecretString>,
}

impl PromptRequest {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Option<SecretString>) -> Self {
        self.credential = credential;
        self
    }
}

/// Prompt-generation service.
///
/// Every failure is treated the same way by the controller, so
/// implementations only need to make the error message descriptive.
#[async_trait]
pub trait PromptClient: Send + Sync {
    /// Generate a prompt and tags for one image.
    async fn generate(&self, request: &PromptRequest) -> Result<GeneratedPrompt>;
}

#[async_trait]
impl<T: PromptClient + ?Sized> PromptClient for Arc<T> {
    async fn generate(&self, request: &PromptRequest) -> Result<GeneratedPrompt> {
        (**self).generate(request).await
    }
}
