// Poll driver tests
// Run on a paused tokio clock: sleeping in the test advances time deterministically,
// so fetch instants can be asserted to the millisecond.

mod common;
use common::{contents, message, setup_logging, FakeChatService, FetchStep};

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use socialnetwork::poll::{self, PollConfig};

fn every_second() -> PollConfig {
    PollConfig::default()
}

#[tokio::test(start_paused = true)]
async fn test_fetches_immediately_then_every_interval() {
    setup_logging();
    let service = Arc::new(FakeChatService::new());
    let start = Instant::now();

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(3500)).await;

    assert_eq!(service.fetch_offsets_ms(start), vec![0, 1000, 2000, 3000]);
    assert_eq!(handle.stats().issued, 4);
    assert!(handle.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stop_means_no_further_fetches() {
    setup_logging();
    let service = Arc::new(FakeChatService::new());

    let mut handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(service.find_calls(), 2);

    handle.stop();
    assert!(!handle.is_running());
    sleep(Duration::from_millis(10_000)).await;
    assert_eq!(service.find_calls(), 2);

    // Stopping twice is harmless
    handle.stop();
    assert_eq!(service.find_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_handle_stops_polling() {
    setup_logging();
    let service = Arc::new(FakeChatService::new());

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(500)).await;
    drop(handle);

    sleep(Duration::from_millis(5000)).await;
    assert_eq!(service.find_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_aborts_fetch_in_flight() {
    setup_logging();
    let service = Arc::new(FakeChatService::with_script(vec![FetchStep::Delayed(
        Duration::from_millis(5000),
        vec![message(1, "alice", "late")],
    )]));

    let mut handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(100)).await;
    handle.stop();

    sleep(Duration::from_millis(6000)).await;
    assert!(handle.messages().is_none());
    assert_eq!(handle.stats().applied, 0);
}

#[tokio::test(start_paused = true)]
async fn test_null_messages_leave_the_value_empty() {
    setup_logging();
    let service = Arc::new(FakeChatService::with_script(vec![FetchStep::NullMessages]));

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(10)).await;

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.seq, 1);
    assert!(snapshot.messages.is_none());
    assert_eq!(handle.stats().applied, 1);
}

#[tokio::test(start_paused = true)]
async fn test_errors_do_not_end_the_loop() {
    setup_logging();
    let service = Arc::new(FakeChatService::with_script(vec![
        FetchStep::Fail,
        FetchStep::Fail,
        FetchStep::Messages(vec![message(1, "alice", "finally")]),
    ]));

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(2500)).await;

    assert_eq!(service.find_calls(), 3);
    let stats = handle.stats();
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.applied, 1);
    assert_eq!(contents(&handle.messages().unwrap_or_default()), vec!["finally"]);
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_previous_messages() {
    setup_logging();
    let service = Arc::new(FakeChatService::with_script(vec![
        FetchStep::Messages(vec![message(1, "alice", "hi")]),
        FetchStep::Fail,
    ]));

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(handle.stats().failed, 1);
    assert_eq!(contents(&handle.messages().unwrap_or_default()), vec!["hi"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    setup_logging();
    // Tick 1 answers at 1500 ms, after tick 2 answered at 1000 ms
    let service = Arc::new(FakeChatService::with_script(vec![
        FetchStep::Delayed(Duration::from_millis(1500), vec![message(1, "alice", "old")]),
        FetchStep::Messages(vec![message(1, "alice", "old"), message(2, "bob", "new")]),
    ]));

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(1700)).await;

    assert_eq!(contents(&handle.messages().unwrap_or_default()), vec!["old", "new"]);
    let stats = handle.stats();
    assert_eq!(stats.discarded, 1);
    assert_eq!(handle.snapshot().seq, 2);
}

#[tokio::test(start_paused = true)]
async fn test_last_write_wins_without_sequencing() {
    setup_logging();
    let service = Arc::new(FakeChatService::with_script(vec![
        FetchStep::Delayed(Duration::from_millis(1500), vec![message(1, "alice", "old")]),
        FetchStep::Messages(vec![message(1, "alice", "old"), message(2, "bob", "new")]),
    ]));
    let config = PollConfig {
        discard_stale: false,
        ..PollConfig::default()
    };

    let handle = poll::start(service.clone(), 42, config);
    sleep(Duration::from_millis(1700)).await;

    assert_eq!(contents(&handle.messages().unwrap_or_default()), vec!["old"]);
    assert_eq!(handle.stats().discarded, 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetches_overlap() {
    setup_logging();
    // Each of the first three fetches takes 2.5 s; ticks keep coming regardless
    let slow = |text: &str| FetchStep::Delayed(Duration::from_millis(2500), vec![message(1, "alice", text)]);
    let service = Arc::new(FakeChatService::with_script(vec![slow("a"), slow("b"), slow("c")]));
    let start = Instant::now();

    let handle = poll::start(service.clone(), 42, every_second());
    sleep(Duration::from_millis(2200)).await;

    assert_eq!(service.fetch_offsets_ms(start), vec![0, 1000, 2000]);
    assert_eq!(handle.stats().applied, 0);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_updates() {
    setup_logging();
    let service = Arc::new(FakeChatService::new());
    service.set_default_messages(vec![message(1, "alice", "hello")]);

    let handle = poll::start(service.clone(), 42, every_second());
    let mut updates = handle.subscribe();
    updates.changed().await.unwrap();

    let snapshot = updates.borrow().clone();
    assert_eq!(snapshot.seq, 1);
    assert_eq!(contents(&snapshot.messages.unwrap_or_default()), vec!["hello"]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_interval() {
    setup_logging();
    let service = Arc::new(FakeChatService::new());
    let start = Instant::now();
    let config = PollConfig {
        interval: Duration::from_millis(250),
        ..PollConfig::default()
    };

    let _handle = poll::start(service.clone(), 42, config);
    sleep(Duration::from_millis(800)).await;

    assert_eq!(service.fetch_offsets_ms(start), vec![0, 250, 500, 750]);
}
