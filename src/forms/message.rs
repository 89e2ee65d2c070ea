use chrono::{DateTime, Utc};

use super::{non_blank, EntityForm, FormError};
use crate::models::{Chat, EntityId, Message, UserRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageForm {
    pub id: Option<EntityId>,
    pub sender_name: Option<String>,
    pub content: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub user: Option<UserRef>,
    pub chat: Option<Chat>,
}

impl EntityForm for MessageForm {
    type Entity = Message;

    fn from_entity(message: &Message) -> Self {
        MessageForm {
            id: message.id,
            sender_name: message.sender_name.clone(),
            content: message.content.clone(),
            time: message.time,
            user: message.user.clone(),
            chat: message.chat.as_deref().cloned(),
        }
    }

    fn to_entity(&self) -> Message {
        Message {
            id: self.id,
            sender_name: self.sender_name.clone(),
            content: self.content.clone(),
            time: self.time,
            user: self.user.clone(),
            chat: self.chat.clone().map(Box::new),
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn validate(&self) -> Result<(), FormError> {
        if non_blank(&self.content).is_none() {
            return Err(FormError::invalid("content", "a message needs some text"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_form() {
        let mut form = MessageForm::default();
        assert!(form.validate().is_err());

        form.content = Some("hello".into());
        form.chat = Some(Chat {
            id: Some(12),
            ..Default::default()
        });
        assert!(form.validate().is_ok());

        let message = form.to_entity();
        assert_eq!(message.chat.as_ref().and_then(|c| c.id), Some(12));
        assert_eq!(MessageForm::from_entity(&message), form);
    }
}
