//! Sequential, paced batch generation.
//!
//! A run captures its targets at launch (valid items without a prompt that
//! are not already in flight) and walks them strictly one at a time. The next
//! request is not issued until the previous outcome has been reconciled and
//! the pacing interval has elapsed. Individual failures never stop the run.
//! There is no pause or cancel; the only early exit is an empty snapshot.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;

use serde::Serialize;
use tracing::{debug, info};

use super::PromptController;
use crate::error::{PromptifyError, Result};
use crate::messages;
use crate::traits::alerter::Alert;
use crate::types::item::{ItemId, ItemPatch};
use crate::types::progress::{ControllerEvent, Progress};

/// Summary of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Items captured at launch
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Removed or invalidated before their turn; no request was made
    pub skipped: usize,
}

impl BatchReport {
    pub fn had_errors(&self) -> bool {
        self.failed > 0
    }

    /// Remote calls issued during the run.
    pub fn requests(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Holds the batch flag for the lifetime of a run.
///
/// If the run future is dropped early, items that never got their turn are
/// released from `generating` so they can be retried, and progress goes back
/// to idle.
struct BatchGuard<'a> {
    controller: &'a PromptController,
    pending: VecDeque<ItemId>,
}

impl BatchGuard<'_> {
    /// Target currently being processed.
    fn current(&self) -> Option<ItemId> {
        self.pending.front().copied()
    }

    /// Mark the current target done.
    fn advance(&mut self) {
        self.pending.pop_front();
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            debug!(remaining = self.pending.len(), "Batch run dropped before completion");
            for id in self.pending.drain(..) {
                self.controller.update_item(id, &ItemPatch::stop_generation());
            }
            self.controller.set_progress(Progress::idle());
        }
        self.controller.batch_active.store(false, Ordering::Release);
    }
}

impl PromptController {
    /// Generate prompts for every valid item that lacks one.
    ///
    /// Fails with `BatchInProgress` if another run is active. Progress moves
    /// through `1/N .. N/N` and returns to idle after the configured reset
    /// delay. When any item failed, a single summary alert is raised.
    pub async fn generate_all(&self) -> Result<BatchReport> {
        let mut guard = {
            let mut store = self.store_write();
            if self
                .batch_active
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return Err(PromptifyError::BatchInProgress);
            }

            let targets = store.batch_targets();
            for id in &targets {
                store.update(*id, &ItemPatch::start_generation());
            }
            BatchGuard {
                controller: self,
                pending: targets.into(),
            }
        };

        let total = guard.pending.len();
        if total == 0 {
            debug!("Batch run has no eligible items");
            self.set_progress(Progress::idle());
            return Ok(BatchReport::default());
        }

        for id in &guard.pending {
            self.emit(ControllerEvent::ItemUpdated(*id));
        }
        info!(total, "Batch run started");

        let mut report = BatchReport {
            total,
            ..Default::default()
        };
        let mut completed = 0;

        while let Some(id) = guard.current() {
            match self.batch_url(id) {
                Some(url) => {
                    if report.requests() > 0 {
                        debug!(
                            delay_ms = self.config.pacing_interval.as_millis(),
                            "Pacing before next request"
                        );
                        self.clock.sleep(self.config.pacing_interval).await;
                    }

                    let outcome = self.request_outcome(id, &url).await;
                    if outcome.is_success() {
                        report.succeeded += 1;
                    } else {
                        report.failed += 1;
                    }
                    self.reconcile_outcome(&outcome);
                }
                None => {
                    debug!(item_id = %id, "Skipping item removed or invalidated since launch");
                    self.update_item(id, &ItemPatch::stop_generation());
                    report.skipped += 1;
                }
            }

            guard.advance();
            completed += 1;
            self.set_progress(Progress::new(completed, total));
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            "Batch run finished"
        );

        if report.had_errors() {
            self.alerter.notify(Alert::destructive(
                messages::BATCH_FAILED_TITLE,
                messages::BATCH_FAILED_DESCRIPTION,
            ));
        }

        self.clock.sleep(self.config.progress_reset_delay).await;
        self.set_progress(Progress::idle());
        drop(guard);

        Ok(report)
    }

    /// URL to request for a batch target, or `None` if it left the run.
    fn batch_url(&self, id: ItemId) -> Option<String> {
        self.store_read()
            .get(id)
            .filter(|item| item.is_valid())
            .map(|item| item.url.clone())
    }
}
