//! Integration tests for paced batch runs.
//!
//! A recording clock stands in for real time, so the expected delays are
//! asserted without waiting for them.

use std::sync::Arc;
use std::time::Duration;

use promptify::{
    messages,
    testing::{MockPromptClient, RecordingAlerter, RecordingClock, Timeline, TimelineEntry},
    ControllerConfig, ControllerEvent, GeneratedPrompt, Progress, PromptController,
    PromptifyError,
};
use tokio::sync::broadcast::Receiver;

const PACING: Duration = Duration::from_millis(4100);
const RESET: Duration = Duration::from_millis(1000);

fn url(name: &str) -> String {
    format!("https://images.example.com/{}.png", name)
}

/// Drain progress values from an event receiver.
fn progress_values(events: &mut Receiver<ControllerEvent>) -> Vec<Progress> {
    let mut values = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ControllerEvent::Progress(p) = event {
            values.push(p);
        }
    }
    values
}

#[tokio::test]
async fn test_batch_issues_one_call_per_item_with_progress() {
    let client = Arc::new(MockPromptClient::new());
    let clock = RecordingClock::new();
    let controller = PromptController::new(client.clone())
        .with_alerter(RecordingAlerter::new())
        .with_clock(clock.clone());
    for name in ["one", "two", "three"] {
        controller.add_url(&url(name)).unwrap();
    }
    let mut events = controller.subscribe();

    let report = controller.generate_all().await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(client.call_count(), 3);
    assert_eq!(client.max_concurrency(), 1);

    assert_eq!(
        progress_values(&mut events),
        vec![
            Progress::new(1, 3),
            Progress::new(2, 3),
            Progress::new(3, 3),
            Progress::idle(),
        ]
    );
    assert!(controller.progress().is_idle());
    assert!(!controller.is_batch_running());
    assert!(controller.items().iter().all(|item| item.has_prompt() && !item.generating));

    // Pause between requests, then the reset delay
    assert_eq!(clock.sleeps(), vec![PACING, PACING, RESET]);
}

#[tokio::test]
async fn test_batch_waits_after_each_completion_before_next_request() {
    let timeline = Timeline::new();
    let client = MockPromptClient::new().with_timeline(timeline.clone());
    let clock = RecordingClock::new().with_timeline(timeline.clone());
    let controller = PromptController::new(client)
        .with_alerter(RecordingAlerter::new())
        .with_clock(clock);
    controller.add_url(&url("first")).unwrap();
    controller.add_url(&url("second")).unwrap();

    controller.generate_all().await.unwrap();

    // Newest first
    assert_eq!(
        timeline.entries(),
        vec![
            TimelineEntry::RequestStarted(url("second")),
            TimelineEntry::RequestFinished(url("second")),
            TimelineEntry::Slept(PACING),
            TimelineEntry::RequestStarted(url("first")),
            TimelineEntry::RequestFinished(url("first")),
            TimelineEntry::Slept(RESET),
        ]
    );
}

#[tokio::test]
async fn test_batch_with_no_eligible_items_makes_no_calls() {
    let client = Arc::new(MockPromptClient::new());
    let clock = RecordingClock::new();
    let controller = PromptController::new(client.clone())
        .with_alerter(RecordingAlerter::new())
        .with_clock(clock.clone());

    let report = controller.generate_all().await.unwrap();

    assert_eq!(report.total, 0);
    assert_eq!(client.call_count(), 0);
    assert!(clock.sleeps().is_empty());
    assert!(controller.progress().is_idle());
    assert!(!controller.is_batch_running());
}

#[tokio::test]
async fn test_batch_targets_only_valid_items_without_prompt() {
    let client = Arc::new(MockPromptClient::new());
    let controller = PromptController::new(client.clone())
        .with_alerter(RecordingAlerter::new())
        .with_clock(RecordingClock::new());

    let c = controller.add_url(&url("c")).unwrap();
    controller.generate_one(c).await.unwrap();
    let b = controller.add_url(&url("b")).unwrap();
    controller.mark_invalid(b);
    let a = controller.add_url(&url("a")).unwrap();

    let b_before = controller.get(b).unwrap();
    let c_before = controller.get(c).unwrap();
    let calls_before = client.call_count();

    let report = controller.generate_all().await.unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(client.call_count() - calls_before, 1);
    assert_eq!(client.calls().last().unwrap().image_url, url("a"));
    assert!(controller.get(a).unwrap().has_prompt());
    assert!(Arc::ptr_eq(&b_before, &controller.get(b).unwrap()));
    assert!(Arc::ptr_eq(&c_before, &controller.get(c).unwrap()));
}

#[tokio::test]
async fn test_batch_failure_does_not_stop_run_and_alerts_once() {
    let client = Arc::new(MockPromptClient::new().with_failure(url("x"), "safety filter"));
    let alerter = RecordingAlerter::new();
    let controller = PromptController::new(client.clone())
        .with_alerter(alerter.clone())
        .with_clock(RecordingClock::new());
    let y = controller.add_url(&url("y")).unwrap();
    let x = controller.add_url(&url("x")).unwrap();

    let report = controller.generate_all().await.unwrap();

    assert!(report.had_errors());
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 1);

    let x_item = controller.get(x).unwrap();
    assert_eq!(x_item.error.as_deref(), Some(messages::ITEM_FAILED));
    assert!(x_item.prompt.is_none());
    assert!(!x_item.generating);
    assert!(controller.get(y).unwrap().has_prompt());

    let alerts = alerter.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].title, messages::BATCH_FAILED_TITLE);
    assert!(alerts[0].is_destructive());
}

#[tokio::test]
async fn test_batch_blocks_single_requests_and_second_batch() {
    let client = Arc::new(MockPromptClient::new().gated());
    let controller = Arc::new(
        PromptController::new(client.clone())
            .with_alerter(RecordingAlerter::new())
            .with_clock(RecordingClock::new()),
    );
    let a = controller.add_url(&url("a")).unwrap();
    controller.add_url(&url("b")).unwrap();

    let run = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate_all().await })
    };
    client.wait_for_calls(1).await;
    assert!(controller.is_batch_running());

    let err = controller.generate_one(a).await.unwrap_err();
    assert!(matches!(err, PromptifyError::BatchInProgress));
    let err = controller.generate_all().await.unwrap_err();
    assert!(matches!(err, PromptifyError::BatchInProgress));

    client.release(2);
    let report = run.await.unwrap().unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(client.call_count(), 2);
    assert!(!controller.is_batch_running());
}

#[tokio::test]
async fn test_items_added_during_run_are_excluded() {
    let client = Arc::new(MockPromptClient::new().gated());
    let controller = Arc::new(
        PromptController::new(client.clone())
            .with_alerter(RecordingAlerter::new())
            .with_clock(RecordingClock::new()),
    );
    controller.add_url(&url("a")).unwrap();

    let run = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate_all().await })
    };
    client.wait_for_calls(1).await;
    let late = controller.add_url(&url("late")).unwrap();

    client.release(5);
    let report = run.await.unwrap().unwrap();

    assert_eq!(report.total, 1);
    assert_eq!(client.call_count(), 1);
    assert!(controller.get(late).unwrap().prompt.is_none());
}

#[tokio::test]
async fn test_items_removed_or_invalidated_during_run_are_skipped() {
    let client = Arc::new(MockPromptClient::new().gated());
    let clock = RecordingClock::new();
    let controller = Arc::new(
        PromptController::new(client.clone())
            .with_alerter(RecordingAlerter::new())
            .with_clock(clock.clone()),
    );
    let c = controller.add_url(&url("c")).unwrap();
    let b = controller.add_url(&url("b")).unwrap();
    let a = controller.add_url(&url("a")).unwrap();
    let mut events = controller.subscribe();

    let run = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate_all().await })
    };
    client.wait_for_calls(1).await;
    assert_eq!(client.calls()[0].image_url, url("a"));
    controller.remove_item(b);
    controller.mark_invalid(c);

    client.release(5);
    let report = run.await.unwrap().unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(client.call_count(), 1);
    assert!(controller.get(a).unwrap().has_prompt());

    let c_item = controller.get(c).unwrap();
    assert!(!c_item.generating);
    assert!(c_item.prompt.is_none());

    // Skipped items still advance progress
    assert_eq!(
        progress_values(&mut events),
        vec![
            Progress::new(1, 3),
            Progress::new(2, 3),
            Progress::new(3, 3),
            Progress::idle(),
        ]
    );
    // Only one request went out, so no pacing pause
    assert_eq!(clock.sleeps(), vec![RESET]);
}

#[tokio::test]
async fn test_batch_skips_item_already_generating() {
    let client = Arc::new(MockPromptClient::new().gated());
    let controller = Arc::new(
        PromptController::new(client.clone())
            .with_alerter(RecordingAlerter::new())
            .with_clock(RecordingClock::new()),
    );
    let a = controller.add_url(&url("a")).unwrap();

    let single = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.generate_one(a).await })
    };
    client.wait_for_calls(1).await;

    let report = controller.generate_all().await.unwrap();
    assert_eq!(report.total, 0);

    client.release(1);
    single.await.unwrap().unwrap();
    assert_eq!(client.call_count(), 1);
    assert!(controller.get(a).unwrap().has_prompt());
}

#[tokio::test]
async fn test_batch_uses_configured_delays() {
    let clock = RecordingClock::new();
    let config = ControllerConfig::new()
        .with_pacing_interval(Duration::from_millis(50))
        .with_progress_reset_delay(Duration::ZERO);
    let controller = PromptController::new(
        MockPromptClient::new().with_response(url("a"), GeneratedPrompt::new("p", ["t"])),
    )
    .with_alerter(RecordingAlerter::new())
    .with_clock(clock.clone())
    .with_config(config);
    controller.add_url(&url("a")).unwrap();
    controller.add_url(&url("b")).unwrap();

    controller.generate_all().await.unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(50), Duration::ZERO]);
}

#[tokio::test(start_paused = true)]
async fn test_batch_paces_in_real_time() {
    let controller =
        PromptController::new(MockPromptClient::new()).with_alerter(RecordingAlerter::new());
    for name in ["a", "b", "c"] {
        controller.add_url(&url(name)).unwrap();
    }

    let start = tokio::time::Instant::now();
    controller.generate_all().await.unwrap();

    assert!(start.elapsed() >= PACING * 2 + RESET);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_batch_releases_remaining_targets() {
    let client = Arc::new(MockPromptClient::new().gated());
    let controller = PromptController::new(client.clone())
        .with_alerter(RecordingAlerter::new())
        .with_clock(RecordingClock::new());
    let c = controller.add_url(&url("c")).unwrap();
    let b = controller.add_url(&url("b")).unwrap();
    let a = controller.add_url(&url("a")).unwrap();

    // First request completes, the second stays pending until the run is dropped
    client.release(1);
    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), controller.generate_all()).await;
    assert!(timed_out.is_err());

    assert_eq!(client.call_count(), 2);
    assert!(controller.get(a).unwrap().has_prompt());
    for id in [b, c] {
        let item = controller.get(id).unwrap();
        assert!(!item.generating);
        assert!(item.prompt.is_none());
    }
    assert!(!controller.is_batch_running());
    assert!(controller.progress().is_idle());

    // A new run picks up what the dropped one left behind
    client.release(2);
    let report = controller.generate_all().await.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert!(controller.items().iter().all(|item| item.has_prompt()));
}

#[tokio::test(start_paused = true)]
async fn test_dropped_batch_resets_progress_for_observers() {
    let client = Arc::new(MockPromptClient::new().gated());
    let controller = PromptController::new(client.clone())
        .with_alerter(RecordingAlerter::new())
        .with_clock(RecordingClock::new());
    controller.add_url(&url("a")).unwrap();
    controller.add_url(&url("b")).unwrap();
    let mut events = controller.subscribe();

    client.release(1);
    let _ = tokio::time::timeout(Duration::from_millis(20), controller.generate_all()).await;

    assert_eq!(
        progress_values(&mut events),
        vec![Progress::new(1, 2), Progress::idle()]
    );
}
