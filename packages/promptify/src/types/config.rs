//! Configuration types for the prompt controller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage key of the user's personal API key.
pub const API_KEY_STORAGE_KEY: &str = "promptify-api-key";

/// Spacing between batch requests.
///
/// The remote service allows 15 requests per minute (one per 4000 ms);
/// the extra 100 ms keeps clock skew from tripping the limit.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_millis(4100);

/// How long the final progress value stays visible before resetting.
pub const DEFAULT_PROGRESS_RESET_DELAY: Duration = Duration::from_millis(1000);

/// Configuration for the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Delay between consecutive requests in a batch run.
    ///
    /// Default: 4100 ms.
    pub pacing_interval: Duration,

    /// Delay before progress resets to idle after a batch run.
    ///
    /// Default: 1000 ms.
    pub progress_reset_delay: Duration,

    /// Key looked up in the credential source before each remote call.
    ///
    /// Default: `"promptify-api-key"`.
    pub credential_key: String,

    /// Capacity of the observer event channel.
    ///
    /// Default: 256.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pacing_interval: DEFAULT_PACING_INTERVAL,
            progress_reset_delay: DEFAULT_PROGRESS_RESET_DELAY,
            credential_key: API_KEY_STORAGE_KEY.to_string(),
            event_capacity: 256,
        }
    }
}

impl ControllerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pacing interval.
    pub fn with_pacing_interval(mut self, interval: Duration) -> Self {
        self.pacing_interval = interval;
        self
    }

    /// Set the progress reset delay.
    pub fn with_progress_reset_delay(mut self, delay: Duration) -> Self {
        self.progress_reset_delay = delay;
        self
    }

    /// Set the credential key.
    pub fn with_credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = key.into();
        self
    }

    /// Set the observer channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
