// Chat detail screen state
// Owns the poll driver for the open chat: opening the view starts it, closing or
// dropping the view stops it. Sending and accepting are one-shot calls whose
// failures are logged and otherwise leave the view untouched.

use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use crate::account::AccountContext;
use crate::api::ChatService;
use crate::models::{Chat, EntityId, Message};
use crate::poll::{self, MessagesSnapshot, PollConfig, PollHandle, PollStats};

pub struct ChatView {
    context: AccountContext,
    chat: Chat,
    service: Arc<dyn ChatService>,
    poll: PollHandle,
    input: String,
}

impl ChatView {
    /// Open a persisted chat and start refreshing its messages; must run inside a tokio runtime
    pub fn open(
        context: AccountContext,
        chat: Chat,
        service: Arc<dyn ChatService>,
        config: PollConfig,
    ) -> Option<Self> {
        let Some(chat_id) = chat.id else {
            warn!("Cannot open a chat that has not been saved yet");
            return None;
        };
        info!("Opening chat {} as {}", chat_id, context.login());

        let poll = poll::start(service.clone(), chat_id, config);
        Some(ChatView {
            context,
            chat,
            service,
            poll,
            input: String::new(),
        })
    }

    pub fn chat_id(&self) -> EntityId {
        self.poll.chat_id()
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    /// Messages from the latest applied poll; empty before the first one or when the chat has none
    pub fn messages(&self) -> Vec<Message> {
        self.poll.messages().unwrap_or_default()
    }

    pub fn snapshot(&self) -> MessagesSnapshot {
        self.poll.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<MessagesSnapshot> {
        self.poll.subscribe()
    }

    pub fn poll_stats(&self) -> PollStats {
        self.poll.stats()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_running()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Send the input into the chat. Clears the input and returns true on success;
    /// on failure the input is kept.
    pub async fn send_message(&mut self) -> bool {
        if self.input.trim().is_empty() {
            return false;
        }

        let chat_id = self.chat_id();
        match self.service.send_message(chat_id, &self.input).await {
            Ok(_) => {
                self.input.clear();
                true
            }
            Err(e) => {
                warn!("Sending message to chat {} failed: {}", chat_id, e);
                false
            }
        }
    }

    /// Accept the chat request; the local chat is marked accepted on success
    pub async fn accept(&mut self) -> bool {
        let chat_id = self.chat_id();
        match self.service.accept_chat(chat_id).await {
            Ok(_) => {
                self.chat.accepted = Some(true);
                true
            }
            Err(e) => {
                warn!("Accepting chat {} failed: {}", chat_id, e);
                false
            }
        }
    }

    /// Only the invited side of a pending chat can accept it
    pub fn can_accept(&self) -> bool {
        !self.chat.is_accepted() && self.chat.initiator_name.as_deref() != Some(self.context.login())
    }

    pub fn is_own_message(&self, message: &Message) -> bool {
        self.context.is_own_message(message)
    }

    /// Stop refreshing; the last messages stay readable
    pub fn close(&mut self) {
        self.poll.stop();
    }
}
