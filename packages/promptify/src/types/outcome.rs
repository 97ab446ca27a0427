//! Generation results and their mapping onto item state.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::item::{ItemId, ItemPatch};

/// Successful response of the remote prompt service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedPrompt {
    /// A detailed text prompt suitable for image generation models.
    pub prompt: String,

    /// Short labels for the image's style, subject, content and mood.
    pub tags: Vec<String>,
}

impl GeneratedPrompt {
    pub fn new(prompt: impl Into<String>, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prompt: prompt.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// How one generation attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeKind {
    Succeeded(GeneratedPrompt),
    Failed {
        /// Generic message stored on the item
        error: String,
        /// Full failure description for alerts and logs
        detail: String,
    },
}

/// Result of a completed generation attempt for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub id: ItemId,
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn succeeded(id: ItemId, generated: GeneratedPrompt) -> Self {
        Self {
            id,
            kind: OutcomeKind::Succeeded(generated),
        }
    }

    pub fn failed(id: ItemId, error: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id,
            kind: OutcomeKind::Failed {
                error: error.into(),
                detail: detail.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.kind, OutcomeKind::Succeeded(_))
    }

    /// Fields this outcome writes: always `generating`, then either
    /// `prompt`/`tags` or `error`. A failure leaves a prior prompt in place.
    pub fn to_patch(&self) -> ItemPatch {
        match &self.kind {
            OutcomeKind::Succeeded(generated) => ItemPatch {
                generating: Some(false),
                prompt: Some(generated.prompt.clone()),
                tags: Some(generated.tags.clone()),
                ..Default::default()
            },
            OutcomeKind::Failed { error, .. } => ItemPatch {
                generating: Some(false),
                error: Some(Some(error.clone())),
                ..Default::default()
            },
        }
    }
}
