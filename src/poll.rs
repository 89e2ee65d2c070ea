// Poll driver for live chat refresh
// Keeps a chat's message list approximately in sync with the server by fetching the
// whole chat right away and then once per interval, until the handle is stopped.
//
// Ticks are not serialised against in-flight requests: a slow server can have several
// fetches outstanding. Each fetch carries the sequence number it was issued with so a
// response that arrives after a newer one can be dropped instead of overwriting it.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};

use crate::api::ChatService;
use crate::models::{EntityId, Message};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

// tokio::time::interval panics on a zero period
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollConfig {
    /// Time between two consecutive fetches
    pub interval: Duration,
    /// Drop responses that were issued before the currently displayed one
    pub discard_stale: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: DEFAULT_POLL_INTERVAL,
            discard_stale: true,
        }
    }
}

/// The single "current messages" value shared between the driver and the view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesSnapshot {
    /// Sequence number of the fetch that produced this value (0 = nothing fetched yet)
    pub seq: u64,
    /// The chat's messages as last reported by the server; `None` when the server sent none
    pub messages: Option<Vec<Message>>,
}

#[derive(Debug, Default)]
struct PollCounters {
    issued: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

/// Point-in-time copy of the driver's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub issued: u64,
    pub applied: u64,
    pub failed: u64,
    pub discarded: u64,
}

/// Handle to a running poll loop.
///
/// Stopping the handle (or dropping it) aborts the loop and every fetch still in
/// flight; no request is issued afterwards.
pub struct PollHandle {
    chat_id: EntityId,
    task: Option<JoinHandle<()>>,
    snapshot: watch::Receiver<MessagesSnapshot>,
    counters: Arc<PollCounters>,
    // Checked by the loop before every fetch; aborting the task alone is not immediate
    stopped: Arc<AtomicBool>,
}

/// Start polling `chat_id` on the current tokio runtime
pub fn start(service: Arc<dyn ChatService>, chat_id: EntityId, config: PollConfig) -> PollHandle {
    let (slot, snapshot) = watch::channel(MessagesSnapshot::default());
    let counters = Arc::new(PollCounters::default());
    let stopped = Arc::new(AtomicBool::new(false));

    info!(
        "Starting poll loop for chat {} every {:?}",
        chat_id, config.interval
    );
    let task = tokio::spawn(run(
        service,
        chat_id,
        config,
        Arc::new(slot),
        counters.clone(),
        stopped.clone(),
    ));

    PollHandle {
        chat_id,
        task: Some(task),
        snapshot,
        counters,
        stopped,
    }
}

async fn run(
    service: Arc<dyn ChatService>,
    chat_id: EntityId,
    config: PollConfig,
    slot: Arc<watch::Sender<MessagesSnapshot>>,
    counters: Arc<PollCounters>,
    stopped: Arc<AtomicBool>,
) {
    let mut ticker = time::interval(config.interval.max(MIN_POLL_INTERVAL));
    // A late tick is fired once, not as a burst of catch-up ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Owned by this task: aborting the loop drops the set, which aborts the fetches
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if stopped.load(Ordering::SeqCst) {
                    debug!("Poll loop for chat {} stopped, no further fetches", chat_id);
                    break;
                }
                let seq = counters.issued.fetch_add(1, Ordering::SeqCst) + 1;
                debug!("Poll tick {} for chat {} ({} in flight)", seq, chat_id, in_flight.len());
                in_flight.spawn(fetch_once(
                    service.clone(),
                    chat_id,
                    seq,
                    config.discard_stale,
                    slot.clone(),
                    counters.clone(),
                    stopped.clone(),
                ));
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        warn!("Poll fetch for chat {} panicked: {}", chat_id, e);
                    }
                }
            }
        }
    }
}

async fn fetch_once(
    service: Arc<dyn ChatService>,
    chat_id: EntityId,
    seq: u64,
    discard_stale: bool,
    slot: Arc<watch::Sender<MessagesSnapshot>>,
    counters: Arc<PollCounters>,
    stopped: Arc<AtomicBool>,
) {
    // Spawned just before a stop on another worker
    if stopped.load(Ordering::SeqCst) {
        return;
    }
    let chat = match service.find_chat(chat_id).await {
        Ok(chat) => chat,
        Err(e) => {
            // Best effort: the next tick is the retry
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!("Polling chat {} failed (tick {}): {}", chat_id, seq, e);
            return;
        }
    };

    let messages = chat.messages;
    let count = messages.as_ref().map(Vec::len);
    let applied = slot.send_if_modified(|current| {
        if discard_stale && seq < current.seq {
            return false;
        }
        current.seq = seq;
        current.messages = messages;
        true
    });

    if applied {
        counters.applied.fetch_add(1, Ordering::SeqCst);
        debug!("Chat {} refreshed by tick {}: {:?} messages", chat_id, seq, count);
    } else {
        counters.discarded.fetch_add(1, Ordering::SeqCst);
        debug!("Discarded stale response of tick {} for chat {}", seq, chat_id);
    }
}

impl PollHandle {
    pub fn chat_id(&self) -> EntityId {
        self.chat_id
    }

    /// Current messages; `None` until the first successful fetch or when the server sent none
    pub fn messages(&self) -> Option<Vec<Message>> {
        self.snapshot.borrow().messages.clone()
    }

    pub fn snapshot(&self) -> MessagesSnapshot {
        self.snapshot.borrow().clone()
    }

    /// A receiver that is notified every time the messages are replaced
    pub fn subscribe(&self) -> watch::Receiver<MessagesSnapshot> {
        self.snapshot.clone()
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            issued: self.counters.issued.load(Ordering::SeqCst),
            applied: self.counters.applied.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            discarded: self.counters.discarded.load(Ordering::SeqCst),
        }
    }

    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Stop the loop; idempotent
    pub fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            info!(
                "Stopped poll loop for chat {} after {} fetches",
                self.chat_id,
                self.counters.issued.load(Ordering::SeqCst)
            );
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResult;
    use crate::models::{Chat, Profile};
    use async_trait::async_trait;

    #[derive(Default)]
    struct CountingService {
        finds: AtomicU64,
    }

    #[async_trait]
    impl ChatService for CountingService {
        async fn find_chat(&self, id: EntityId) -> ApiResult<Chat> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            Ok(Chat {
                id: Some(id),
                messages: Some(Vec::new()),
                ..Default::default()
            })
        }

        async fn send_message(&self, _id: EntityId, content: &str) -> ApiResult<Message> {
            Ok(Message {
                content: Some(content.to_string()),
                ..Default::default()
            })
        }

        async fn accept_chat(&self, _id: EntityId) -> ApiResult<Profile> {
            Ok(Profile::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_loop_issues_no_fetch() {
        let service = Arc::new(CountingService::default());
        let (slot, _snapshot) = watch::channel(MessagesSnapshot::default());
        let counters = Arc::new(PollCounters::default());

        // A tick that races a stop finds the flag set and ends the loop
        run(
            service.clone(),
            1,
            PollConfig::default(),
            Arc::new(slot),
            counters.clone(),
            Arc::new(AtomicBool::new(true)),
        )
        .await;

        assert_eq!(service.finds.load(Ordering::SeqCst), 0);
        assert_eq!(counters.issued.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_raises_flag_before_abort() {
        let service = Arc::new(CountingService::default());
        let mut handle = start(service.clone(), 2, PollConfig::default());
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(service.finds.load(Ordering::SeqCst), 1);

        handle.stop();
        assert!(handle.stopped.load(Ordering::SeqCst));
        handle.stop();

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(service.finds.load(Ordering::SeqCst), 1);
        assert!(!handle.is_running());
    }
}
