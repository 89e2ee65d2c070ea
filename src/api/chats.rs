// Chat-specific REST calls: the chat list, messaging inside a chat,
// accepting a chat request and requesting a chat with another profile.

use async_trait::async_trait;
use log::info;
use reqwest::Method;

use super::{ApiClient, ApiResult};
use crate::models::{Chat, EntityId, Message, Profile};

/// The calls a chat screen needs from the backend.
///
/// `ApiClient` is the real implementation; views and the poll driver only see
/// this trait so they can run against a fake.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// GET the full chat, including its messages
    async fn find_chat(&self, id: EntityId) -> ApiResult<Chat>;

    /// Post a new message into the chat
    async fn send_message(&self, id: EntityId, content: &str) -> ApiResult<Message>;

    /// Accept a pending chat request; returns the caller's updated profile
    async fn accept_chat(&self, id: EntityId) -> ApiResult<Profile>;
}

#[async_trait]
impl ChatService for ApiClient {
    async fn find_chat(&self, id: EntityId) -> ApiResult<Chat> {
        self.find::<Chat>(id).await
    }

    async fn send_message(&self, id: EntityId, content: &str) -> ApiResult<Message> {
        let message = Message::with_content(content);
        let sent: Message = self
            .send_json(Method::POST, &format!("chats/{}/message", id), Some(&message))
            .await?;
        info!("Sent message {:?} into chat {}", sent.id, id);
        Ok(sent)
    }

    async fn accept_chat(&self, id: EntityId) -> ApiResult<Profile> {
        let profile: Profile = self
            .send_json::<(), _>(Method::POST, &format!("chats/{}/accept", id), None)
            .await?;
        info!("Accepted chat {}", id);
        Ok(profile)
    }
}

impl ApiClient {
    /// Chats of the current account, optionally sorted ("predicate,asc|desc")
    pub async fn query_chats(&self, sort: Option<&str>) -> ApiResult<Vec<Chat>> {
        let params: Vec<(&str, String)> = sort
            .map(|s| vec![("sort", s.to_string())])
            .unwrap_or_default();
        self.query::<Chat>(&params).await
    }

    /// Open a chat request towards another profile
    pub async fn request_chat_with_profile(&self, profile_id: EntityId) -> ApiResult<Chat> {
        let chat: Chat = self
            .send_json::<(), _>(
                Method::POST,
                &format!("chats/request-chat-with-profile/{}", profile_id),
                None,
            )
            .await?;
        info!("Requested chat {:?} with profile {}", chat.id, profile_id);
        Ok(chat)
    }
}
