// Data model for the social network REST resources
// Every entity mirrors the JSON the backend sends: camelCase fields, nullable everywhere,
// and an `id` that is only present once the entity has been persisted.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier type used by every backend entity
pub type EntityId = i64;

/// Anything that carries a (possibly not yet assigned) backend id
pub trait Identified {
    fn id(&self) -> Option<EntityId>;
}

/// Reference to the owning account, as embedded in every entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

impl UserRef {
    pub fn with_id(id: EntityId) -> Self {
        UserRef { id: Some(id), login: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<Profile>>,
    // The backend names the message collection of a chat "chats"
    #[serde(rename = "chats", alias = "messages", default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl Chat {
    pub fn is_accepted(&self) -> bool {
        self.accepted.unwrap_or(false)
    }

    /// Short label used by list views: initiator plus the chat id
    pub fn label(&self) -> String {
        let initiator = self.initiator_name.as_deref().unwrap_or("unknown");
        match self.id {
            Some(id) => format!("#{} {}", id, initiator),
            None => format!("(new) {}", initiator),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat: Option<Box<Chat>>,
}

impl Message {
    /// A not-yet-persisted message holding only text, as sent into a chat or as a comment
    pub fn with_content(content: &str) -> Self {
        Message {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub others: Option<Vec<Profile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<Profile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chats: Option<Vec<Chat>>,
}

impl Profile {
    pub fn picture(&self) -> Option<Attachment> {
        Attachment::from_parts(self.picture.as_deref(), self.picture_content_type.as_deref())
    }

    pub fn set_picture(&mut self, attachment: Option<&Attachment>) {
        self.picture = attachment.map(Attachment::encoded);
        self.picture_content_type = attachment.map(|a| a.content_type.clone());
    }

    /// True if `other` appears on either side of this profile's friendship edges
    pub fn is_friend_of(&self, other: EntityId) -> bool {
        let contains = |set: &Option<Vec<Profile>>| {
            set.as_ref()
                .map(|profiles| profiles.iter().any(|p| p.id == Some(other)))
                .unwrap_or(false)
        };
        contains(&self.others) || contains(&self.profiles)
    }

    pub fn display_name(&self) -> String {
        let login = self.user.as_ref().and_then(|u| u.login.as_deref());
        match (login, self.id) {
            (Some(login), _) => login.to_string(),
            (None, Some(id)) => format!("profile #{}", id),
            (None, None) => "new profile".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Box<Profile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl Post {
    pub fn image(&self) -> Option<Attachment> {
        Attachment::from_parts(self.image.as_deref(), self.image_content_type.as_deref())
    }

    pub fn set_image(&mut self, attachment: Option<&Attachment>) {
        self.image = attachment.map(Attachment::encoded);
        self.image_content_type = attachment.map(|a| a.content_type.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Box<Post>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Box<Profile>>,
}

/// Decoded binary payload (profile picture, post image) plus its content type
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl Attachment {
    pub fn new(data: Vec<u8>, content_type: &str) -> Self {
        Attachment {
            data,
            content_type: content_type.to_string(),
        }
    }

    // Both halves must be present and the payload must be valid base64
    fn from_parts(encoded: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let (encoded, content_type) = (encoded?, content_type?);
        match BASE64.decode(encoded) {
            Ok(data) => Some(Attachment::new(data, content_type)),
            Err(e) => {
                log::warn!("Ignoring attachment with invalid base64 payload: {}", e);
                None
            }
        }
    }

    pub fn encoded(&self) -> String {
        BASE64.encode(&self.data)
    }
}

macro_rules! identified {
    ($($T:ty),*) => {
        $(
            impl Identified for $T {
                fn id(&self) -> Option<EntityId> {
                    self.id
                }
            }
        )*
    };
}

identified!(UserRef, Chat, Message, Profile, Post, Comment);
