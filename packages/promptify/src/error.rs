//! Typed errors for the prompt controller.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

use crate::types::item::ItemId;

/// Errors that can occur during controller operations.
#[derive(Debug, Error)]
pub enum PromptifyError {
    /// Blank URL input
    #[error("no URL provided")]
    EmptyUrl,

    /// URL already tracked by another item
    #[error("duplicate URL: {url}")]
    DuplicateUrl { url: String },

    /// No item with this id
    #[error("item not found: {id}")]
    ItemNotFound { id: ItemId },

    /// Item's image failed to load
    #[error("item has an invalid image: {id}")]
    InvalidItem { id: ItemId },

    /// A request for this item is already in flight
    #[error("generation already in progress for: {id}")]
    AlreadyGenerating { id: ItemId },

    /// A batch run holds the controller
    #[error("a batch run is already in progress")]
    BatchInProgress,

    /// No item has a prompt yet
    #[error("nothing to export")]
    NothingToExport,

    /// Remote prompt service failed
    #[error("prompt service error: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Image could not be loaded
    #[error("image unavailable: {reason}")]
    ImageUnavailable { reason: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptifyError {
    /// Wrap any error as a remote failure.
    pub fn remote(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Remote(Box::new(err))
    }
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, PromptifyError>;
