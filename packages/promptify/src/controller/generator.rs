//! Single-item generation.

use tracing::{debug, info, warn};

use super::PromptController;
use crate::error::{PromptifyError, Result};
use crate::messages;
use crate::traits::alerter::Alert;
use crate::traits::client::PromptRequest;
use crate::types::item::{ItemId, ItemPatch};
use crate::types::outcome::{Outcome, OutcomeKind};
use crate::types::progress::ControllerEvent;

/// Releases a claimed item if the request future is dropped before its
/// outcome is reconciled.
struct ClaimGuard<'a> {
    controller: &'a PromptController,
    id: ItemId,
    armed: bool,
}

impl ClaimGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ClaimGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(item_id = %self.id, "Generation dropped before completion");
            self.controller.update_item(self.id, &ItemPatch::stop_generation());
        }
    }
}

impl PromptController {
    /// Generate a prompt for one item.
    ///
    /// Rejected while a batch run is active, when the item is missing or
    /// invalid, and when a request for it is already in flight. Otherwise the
    /// item is marked generating with its error cleared, the remote service
    /// is called, and the outcome is merged back. A remote failure is not an
    /// `Err`: it comes back as a failed [`Outcome`], is recorded on the item,
    /// and raises one alert with the full message.
    pub async fn generate_one(&self, id: ItemId) -> Result<Outcome> {
        let url = {
            let mut store = self.store_write();
            if self.is_batch_running() {
                return Err(PromptifyError::BatchInProgress);
            }
            let item = store.get(id).ok_or(PromptifyError::ItemNotFound { id })?;
            if !item.is_valid() {
                return Err(PromptifyError::InvalidItem { id });
            }
            if item.generating {
                return Err(PromptifyError::AlreadyGenerating { id });
            }
            store.update(id, &ItemPatch::start_generation());
            item.url.clone()
        };
        self.emit(ControllerEvent::ItemUpdated(id));
        let claim = ClaimGuard {
            controller: self,
            id,
            armed: true,
        };

        info!(item_id = %id, url = %url, "Generating prompt");
        let outcome = self.request_outcome(id, &url).await;

        let applied = self.reconcile_outcome(&outcome);
        claim.disarm();
        if let OutcomeKind::Failed { detail, .. } = &outcome.kind {
            // A removed item's failure is not surfaced
            if applied {
                self.alerter
                    .notify(Alert::destructive(messages::GENERATION_FAILED_TITLE, detail.clone()));
            }
        }

        Ok(outcome)
    }

    /// Call the remote service for one URL and turn the result into an outcome.
    pub(crate) async fn request_outcome(&self, id: ItemId, url: &str) -> Outcome {
        let request = PromptRequest::new(url).with_credential(self.current_credential());

        match self.client.generate(&request).await {
            Ok(generated) => {
                info!(item_id = %id, tags = generated.tags.len(), "Prompt generated");
                Outcome::succeeded(id, generated)
            }
            Err(e) => {
                warn!(item_id = %id, error = %e, "Prompt generation failed");
                Outcome::failed(id, messages::ITEM_FAILED, e.to_string())
            }
        }
    }

    /// Merge an outcome into the store. Returns false when the item is gone.
    pub(crate) fn reconcile_outcome(&self, outcome: &Outcome) -> bool {
        let applied = self.store_write().apply_outcome(outcome);
        if applied {
            self.emit(ControllerEvent::ItemUpdated(outcome.id));
        }
        applied
    }
}
