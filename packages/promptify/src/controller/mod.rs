//! Prompt controller: owns the work item store and drives generation.
//!
//! # Architecture
//!
//! ```text
//! add_url / add_urls ──► WorkItemStore
//!                             │
//! generate_one(id) ───────────┤
//! generate_all() ─► snapshot ─┤
//!                             ├─► PromptClient.generate (credential read per call)
//!                             ├─► reconcile outcome ─► ControllerEvent
//!                             └─► Alerter (failures, summaries)
//! ```
//!
//! The store sits behind a synchronous lock that is never held across an
//! `.await`. Mutual exclusion between a batch run and single-item requests
//! is decided under that lock, so there is no window between checking and
//! claiming an item.

mod export;
mod generator;
mod scheduler;

pub use export::ExportFile;
pub use scheduler::BatchReport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::{PromptifyError, Result};
use crate::messages;
use crate::security::credentials::{CredentialSource, NoCredentials, SecretString};
use crate::store::WorkItemStore;
use crate::traits::alerter::{Alert, Alerter, TracingAlerter};
use crate::traits::client::PromptClient;
use crate::traits::clock::{Clock, TokioClock};
use crate::traits::probe::ImageProbe;
use crate::types::config::ControllerConfig;
use crate::types::item::{ItemId, ItemPatch, WorkItem};
use crate::types::progress::{ControllerEvent, Progress};

/// Result of adding several URLs at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeReport {
    /// Ids of the new items, in input order
    pub added: Vec<ItemId>,

    /// Input lines rejected because the URL was already tracked
    pub duplicates: Vec<String>,
}

/// Batch prompt-generation controller.
///
/// Share it behind an `Arc` when the front end needs to trigger operations
/// from several tasks.
pub struct PromptController {
    store: RwLock<WorkItemStore>,
    client: Arc<dyn PromptClient>,
    credentials: Arc<dyn CredentialSource>,
    alerter: Arc<dyn Alerter>,
    clock: Arc<dyn Clock>,
    config: ControllerConfig,
    batch_active: AtomicBool,
    events: broadcast::Sender<ControllerEvent>,
    progress: watch::Sender<Progress>,
}

impl PromptController {
    /// Create a controller with default collaborators: no personal
    /// credentials, alerts to the log, real-time pacing.
    pub fn new(client: impl PromptClient + 'static) -> Self {
        let config = ControllerConfig::default();
        let (events, _) = broadcast::channel(config.event_capacity);
        let (progress, _) = watch::channel(Progress::idle());

        Self {
            store: RwLock::new(WorkItemStore::new()),
            client: Arc::new(client),
            credentials: Arc::new(NoCredentials),
            alerter: Arc::new(TracingAlerter),
            clock: Arc::new(TokioClock),
            config,
            batch_active: AtomicBool::new(false),
            events,
            progress,
        }
    }

    /// Set the credential source.
    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Set the alert sink.
    pub fn with_alerter(mut self, alerter: impl Alerter + 'static) -> Self {
        self.alerter = Arc::new(alerter);
        self
    }

    /// Set the pacing clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set the configuration.
    ///
    /// An event capacity of zero is raised to one.
    pub fn with_config(mut self, mut config: ControllerConfig) -> Self {
        config.event_capacity = config.event_capacity.max(1);
        if config.event_capacity != self.config.event_capacity {
            self.events = broadcast::channel(config.event_capacity).0;
        }
        self.config = config;
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Watch the latest batch progress.
    pub fn watch_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Current batch progress.
    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    /// Items in display order (newest first).
    pub fn items(&self) -> Vec<Arc<WorkItem>> {
        self.store_read().snapshot()
    }

    pub fn get(&self, id: ItemId) -> Option<Arc<WorkItem>> {
        self.store_read().get(id)
    }

    pub fn len(&self) -> usize {
        self.store_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store_read().is_empty()
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch_active.load(Ordering::Acquire)
    }

    // =========================================================================
    // Item management
    // =========================================================================

    /// Track one image URL.
    ///
    /// Blank and duplicate input are rejected with an error and an alert.
    pub fn add_url(&self, text: &str) -> Result<ItemId> {
        let result = self.store_write().add(text);
        match &result {
            Ok(id) => self.emit(ControllerEvent::ItemAdded(*id)),
            Err(PromptifyError::EmptyUrl) => self.alerter.notify(Alert::destructive(
                messages::NO_URLS_TITLE,
                messages::NO_URLS_DESCRIPTION,
            )),
            Err(PromptifyError::DuplicateUrl { url }) => self.alerter.notify(Alert::destructive(
                messages::DUPLICATE_URL_TITLE,
                messages::duplicate_url_description(url),
            )),
            Err(_) => {}
        }
        result
    }

    /// Track every non-blank line of `text`.
    ///
    /// Duplicates are skipped and reported together in one alert. Fails with
    /// `EmptyUrl` only when no line holds a URL.
    pub fn add_urls(&self, text: &str) -> Result<IntakeReport> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            self.alerter.notify(Alert::destructive(
                messages::NO_URLS_TITLE,
                messages::NO_URLS_DESCRIPTION,
            ));
            return Err(PromptifyError::EmptyUrl);
        }

        let mut report = IntakeReport::default();
        {
            let mut store = self.store_write();
            for line in lines {
                match store.add(line) {
                    Ok(id) => report.added.push(id),
                    Err(PromptifyError::DuplicateUrl { url }) => report.duplicates.push(url),
                    Err(e) => return Err(e),
                }
            }
        }

        for id in &report.added {
            self.emit(ControllerEvent::ItemAdded(*id));
        }
        if !report.duplicates.is_empty() {
            self.alerter.notify(Alert::info(
                messages::DUPLICATE_URL_TITLE,
                messages::duplicates_skipped_description(report.duplicates.len()),
            ));
        }

        info!(
            added = report.added.len(),
            duplicates = report.duplicates.len(),
            "URLs processed"
        );
        Ok(report)
    }

    /// Delete an item, even while a request for it is in flight.
    ///
    /// A late outcome for a removed item is dropped.
    pub fn remove_item(&self, id: ItemId) -> bool {
        let removed = self.store_write().remove(id).is_some();
        if removed {
            self.emit(ControllerEvent::ItemRemoved(id));
        }
        removed
    }

    /// Record that an item's image failed to load. Idempotent; there is no
    /// way back to valid.
    pub fn mark_invalid(&self, id: ItemId) -> bool {
        let changed = self.store_write().mark_invalid(id);
        if changed {
            debug!(item_id = %id, "Work item marked invalid");
            self.emit(ControllerEvent::ItemUpdated(id));
        }
        changed
    }

    /// Probe every valid, idle item and invalidate the ones whose image
    /// cannot be loaded. Returns the invalidated ids.
    pub async fn validate_images(&self, probe: &dyn ImageProbe) -> Vec<ItemId> {
        let candidates: Vec<(ItemId, String)> = self
            .store_read()
            .items()
            .iter()
            .filter(|item| item.is_valid() && !item.generating)
            .map(|item| (item.id, item.url.clone()))
            .collect();

        let mut invalidated = Vec::new();
        for (id, url) in candidates {
            if let Err(e) = probe.check(&url).await {
                warn!(item_id = %id, url = %url, error = %e, "Image failed to load");
                if self.mark_invalid(id) {
                    invalidated.push(id);
                }
            }
        }
        invalidated
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn store_read(&self) -> RwLockReadGuard<'_, WorkItemStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn store_write(&self) -> RwLockWriteGuard<'_, WorkItemStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn set_progress(&self, progress: Progress) {
        self.progress.send_replace(progress);
        self.emit(ControllerEvent::Progress(progress));
    }

    /// Patch one item and notify observers when it changed.
    fn update_item(&self, id: ItemId, patch: &ItemPatch) -> bool {
        let changed = self.store_write().update(id, patch);
        if changed {
            self.emit(ControllerEvent::ItemUpdated(id));
        }
        changed
    }

    /// Credential in effect right now, resolved per remote call.
    fn current_credential(&self) -> Option<SecretString> {
        self.credentials.read(&self.config.credential_key)
    }
}
