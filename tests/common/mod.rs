// Common test utilities for integration tests
// Logging setup, a scripted in-memory ChatService and a few fixtures.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use log::LevelFilter;
use tokio::time::Instant;

use socialnetwork::{
    Account, AccountContext, ApiClient, ApiError, ApiResult, Chat, ChatService, EntityId, Message,
    Profile,
};

// Initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Set up the logger for the tests
pub fn setup_logging() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .init();
    });
}

/// How the fake answers one `find_chat` call
#[derive(Debug, Clone)]
pub enum FetchStep {
    Messages(Vec<Message>),
    NullMessages,
    Fail,
    Delayed(Duration, Vec<Message>),
}

/// In-memory ChatService. `find_chat` answers from a script, then falls back to
/// the default messages once the script runs out.
pub struct FakeChatService {
    script: Mutex<VecDeque<FetchStep>>,
    default_messages: Mutex<Vec<Message>>,
    fetch_times: Mutex<Vec<Instant>>,
    find_calls: AtomicUsize,
    sent: Mutex<Vec<(EntityId, String)>>,
    accepted: Mutex<Vec<EntityId>>,
    fail_send: AtomicBool,
    fail_accept: AtomicBool,
}

impl FakeChatService {
    pub fn new() -> Self {
        FakeChatService {
            script: Mutex::new(VecDeque::new()),
            default_messages: Mutex::new(Vec::new()),
            fetch_times: Mutex::new(Vec::new()),
            find_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            accepted: Mutex::new(Vec::new()),
            fail_send: AtomicBool::new(false),
            fail_accept: AtomicBool::new(false),
        }
    }

    pub fn with_script(steps: Vec<FetchStep>) -> Self {
        let fake = Self::new();
        *fake.script.lock().unwrap() = steps.into();
        fake
    }

    pub fn set_default_messages(&self, messages: Vec<Message>) {
        *self.default_messages.lock().unwrap() = messages;
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_send.store(fail, Ordering::SeqCst);
    }

    pub fn fail_accepts(&self, fail: bool) {
        self.fail_accept.store(fail, Ordering::SeqCst);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    /// Milliseconds since `start` at which each fetch was issued
    pub fn fetch_offsets_ms(&self, start: Instant) -> Vec<u128> {
        self.fetch_times
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.duration_since(start).as_millis())
            .collect()
    }

    pub fn sent(&self) -> Vec<(EntityId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> Vec<EntityId> {
        self.accepted.lock().unwrap().clone()
    }
}

fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

#[async_trait]
impl ChatService for FakeChatService {
    async fn find_chat(&self, id: EntityId) -> ApiResult<Chat> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_times.lock().unwrap().push(Instant::now());

        let step = self.script.lock().unwrap().pop_front();
        let messages = match step {
            Some(FetchStep::Messages(messages)) => Some(messages),
            Some(FetchStep::NullMessages) => None,
            Some(FetchStep::Fail) => return Err(server_error()),
            Some(FetchStep::Delayed(delay, messages)) => {
                tokio::time::sleep(delay).await;
                Some(messages)
            }
            None => Some(self.default_messages.lock().unwrap().clone()),
        };

        Ok(Chat {
            id: Some(id),
            messages,
            ..Default::default()
        })
    }

    async fn send_message(&self, id: EntityId, content: &str) -> ApiResult<Message> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.sent.lock().unwrap().push((id, content.to_string()));
        Ok(Message::with_content(content))
    }

    async fn accept_chat(&self, id: EntityId) -> ApiResult<Profile> {
        if self.fail_accept.load(Ordering::SeqCst) {
            return Err(server_error());
        }
        self.accepted.lock().unwrap().push(id);
        Ok(Profile::default())
    }
}

/// Context for `login`; the client points nowhere, so nothing may use it
pub fn context_for(login: &str) -> AccountContext {
    let account = Account {
        id: Some(1),
        login: login.to_string(),
        authorities: vec!["ROLE_USER".to_string()],
        ..Default::default()
    };
    AccountContext::new(account, ApiClient::new("http://127.0.0.1:9"))
}

pub fn message(id: EntityId, sender: &str, content: &str) -> Message {
    Message {
        id: Some(id),
        sender_name: Some(sender.to_string()),
        content: Some(content.to_string()),
        ..Default::default()
    }
}

pub fn chat(id: EntityId, initiator: &str, accepted: bool) -> Chat {
    Chat {
        id: Some(id),
        initiator_name: Some(initiator.to_string()),
        accepted: Some(accepted),
        ..Default::default()
    }
}

pub fn contents(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| m.content.clone())
        .collect()
}
