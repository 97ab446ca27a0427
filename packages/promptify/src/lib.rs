//! Batch Image Prompt Generation
//!
//! Tracks a list of image URLs, asks a remote vision service for a
//! descriptive art prompt and tags for each, and merges the results back
//! into the list as they arrive.
//!
//! # Behavior
//!
//! - Newest items first; URLs are unique within the list
//! - Single-item requests, or a batch run that walks every eligible item
//!   one at a time with a fixed pause between requests
//! - Failures are recorded on the item and never stop a batch
//! - A personal credential is read fresh for every request
//! - Late results for removed items are dropped
//!
//! # Usage
//!
//! ```rust,ignore
//! use promptify::{PromptController, MemoryCredentialStore};
//! use promptify::testing::MockPromptClient;
//!
//! let controller = PromptController::new(MockPromptClient::new())
//!     .with_credentials(MemoryCredentialStore::new());
//!
//! controller.add_urls("https://example.com/a.png\nhttps://example.com/b.png")?;
//! let report = controller.generate_all().await?;
//! let file = controller.export_prompts()?;
//! ```
//!
//! # Modules
//!
//! - [`controller`] - The controller: intake, generation, batch runs, export
//! - [`store`] - Ordered work item collection
//! - [`reconcile`] - Merging outcomes into the item list
//! - [`traits`] - Collaborator abstractions (PromptClient, Alerter, Clock, ImageProbe)
//! - [`types`] - Work items, outcomes, progress and configuration
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod controller;
pub mod error;
pub mod messages;
pub mod reconcile;
pub mod security;
pub mod store;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod ai;

// Re-export core types at crate root
pub use controller::{BatchReport, ExportFile, IntakeReport, PromptController};
pub use error::{PromptifyError, Result};
pub use reconcile::reconcile;
pub use security::{
    CredentialSource, EnvCredentialStore, MemoryCredentialStore, NoCredentials, SecretString,
};
pub use store::WorkItemStore;
pub use traits::{
    alerter::{Alert, AlertSeverity, Alerter, TracingAlerter},
    client::{PromptClient, PromptRequest},
    clock::{Clock, TokioClock},
    probe::{HttpImageProbe, ImageProbe},
};
pub use types::{
    config::{ControllerConfig, API_KEY_STORAGE_KEY},
    item::{ItemId, ItemPatch, Validity, WorkItem},
    outcome::{GeneratedPrompt, Outcome, OutcomeKind},
    progress::{ControllerEvent, Progress},
};

#[cfg(feature = "gemini")]
pub use ai::GeminiPromptClient;

// Re-export testing utilities
pub use testing::{MockImageProbe, MockPromptClient, RecordingAlerter, RecordingClock};
