//! Testing utilities including mock implementations.
//!
//! These are useful for testing front ends built on the controller without
//! making real network calls or waiting on real pacing delays.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::{PromptifyError, Result};
use crate::traits::{
    alerter::{Alert, Alerter},
    client::{PromptClient, PromptRequest},
    clock::Clock,
    probe::ImageProbe,
};
use crate::types::outcome::GeneratedPrompt;

/// Ordered record of what the mocks saw, shared between them.
#[derive(Debug, Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<TimelineEntry>>>);

/// One step in a [`Timeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    RequestStarted(String),
    RequestFinished(String),
    Slept(Duration),
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: TimelineEntry) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<TimelineEntry> {
        self.0.lock().unwrap().clone()
    }
}

/// Record of a call made to the mock client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPromptCall {
    pub image_url: String,
    /// Exposed credential, for assertions
    pub credential: Option<String>,
}

/// A mock prompt client for testing.
///
/// Returns `"prompt for <url>"` with tag `"mock"` unless a response or a
/// failure is configured for the URL. A gated mock holds every call until
/// [`MockPromptClient::release`] hands out a permit.
#[derive(Default)]
pub struct MockPromptClient {
    responses: RwLock<HashMap<String, GeneratedPrompt>>,
    failures: RwLock<HashMap<String, String>>,
    calls: RwLock<Vec<MockPromptCall>>,
    gate: Option<Arc<Semaphore>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    timeline: Option<Timeline>,
}

impl MockPromptClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `response` for `url`.
    pub fn with_response(self, url: impl Into<String>, response: GeneratedPrompt) -> Self {
        self.responses.write().unwrap().insert(url.into(), response);
        self
    }

    /// Fail every call for `url` with `message`.
    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), message.into());
        self
    }

    /// Hold each call until a permit is released.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Log requests to a shared timeline.
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    /// Let `n` held calls complete.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Change the failure for `url` after construction (`None` clears it).
    pub fn set_failure(&self, url: &str, message: Option<&str>) {
        let mut failures = self.failures.write().unwrap();
        match message {
            Some(m) => {
                failures.insert(url.to_string(), m.to_string());
            }
            None => {
                failures.remove(url);
            }
        }
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockPromptCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Highest number of calls that were in flight at the same time.
    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Yield until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.call_count() < n {
            tokio::task::yield_now().await;
        }
    }

    fn record(&self, entry: TimelineEntry) {
        if let Some(timeline) = &self.timeline {
            timeline.push(entry);
        }
    }
}

#[async_trait]
impl PromptClient for MockPromptClient {
    async fn generate(&self, request: &PromptRequest) -> Result<GeneratedPrompt> {
        let url = request.image_url.clone();
        self.calls.write().unwrap().push(MockPromptCall {
            image_url: url.clone(),
            credential: request.credential.as_ref().map(|c| c.expose().to_string()),
        });
        self.record(TimelineEntry::RequestStarted(url.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record(TimelineEntry::RequestFinished(url.clone()));

        if let Some(message) = self.failures.read().unwrap().get(&url) {
            return Err(PromptifyError::Remote(message.clone().into()));
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| GeneratedPrompt::new(format!("prompt for {}", url), ["mock"])))
    }
}

/// Alert sink that keeps every alert.
#[derive(Debug, Default, Clone)]
pub struct RecordingAlerter {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn destructive(&self) -> Vec<Alert> {
        self.alerts()
            .into_iter()
            .filter(Alert::is_destructive)
            .collect()
    }
}

impl Alerter for RecordingAlerter {
    fn notify(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
    }
}

/// Clock that records requested sleeps and returns without waiting.
#[derive(Debug, Default, Clone)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    timeline: Option<Timeline>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log sleeps to a shared timeline.
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Sum of all requested sleeps.
    pub fn elapsed(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        if let Some(timeline) = &self.timeline {
            timeline.push(TimelineEntry::Slept(duration));
        }
        tokio::task::yield_now().await;
    }
}

/// Image probe that fails for configured URLs.
#[derive(Debug, Default)]
pub struct MockImageProbe {
    broken: HashSet<String>,
    checked: Mutex<Vec<String>>,
}

impl MockImageProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_broken(mut self, url: impl Into<String>) -> Self {
        self.broken.insert(url.into());
        self
    }

    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProbe for MockImageProbe {
    async fn check(&self, url: &str) -> Result<()> {
        self.checked.lock().unwrap().push(url.to_string());
        if self.broken.contains(url) {
            return Err(PromptifyError::ImageUnavailable {
                reason: "mock broken image".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let mock = MockPromptClient::new();
        let result = mock
            .generate(&PromptRequest::new("https://example.com/a.png"))
            .await
            .unwrap();

        assert_eq!(result.prompt, "prompt for https://example.com/a.png");
        assert_eq!(result.tags, vec!["mock".to_string()]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let mock = MockPromptClient::new().with_failure("https://example.com/a.png", "quota");
        let err = mock
            .generate(&PromptRequest::new("https://example.com/a.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_recording_clock() {
        let timeline = Timeline::new();
        let clock = RecordingClock::new().with_timeline(timeline.clone());
        clock.sleep(Duration::from_millis(4100)).await;

        assert_eq!(clock.sleeps(), vec![Duration::from_millis(4100)]);
        assert_eq!(
            timeline.entries(),
            vec![TimelineEntry::Slept(Duration::from_millis(4100))]
        );
    }
}
