//! Image probe trait for validity checks.
//!
//! Stands in for the "image failed to load" signal a rendering front end
//! would raise. A failed probe permanently invalidates the item.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{PromptifyError, Result};

#[async_trait]
pub trait ImageProbe: Send + Sync {
    /// `Ok(())` when `url` serves a loadable image.
    async fn check(&self, url: &str) -> Result<()>;
}

/// Probe that fetches the URL and requires a 2xx `image/*` response.
#[derive(Debug, Clone, Default)]
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing HTTP client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    async fn check(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PromptifyError::ImageUnavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PromptifyError::ImageUnavailable {
                reason: format!("HTTP {}", status),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !is_image_content_type(content_type) {
            return Err(PromptifyError::ImageUnavailable {
                reason: format!("not an image: {:?}", content_type),
            });
        }

        Ok(())
    }
}

pub(crate) fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}
