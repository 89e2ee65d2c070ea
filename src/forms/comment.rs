use super::{EntityForm, FormError};
use crate::models::{Comment, EntityId, Message, Post, Profile, UserRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentForm {
    pub id: Option<EntityId>,
    /// The message holding the comment text
    pub parent: Option<Message>,
    pub user: Option<UserRef>,
    pub post: Option<Post>,
    pub profile: Option<Profile>,
}

impl EntityForm for CommentForm {
    type Entity = Comment;

    fn from_entity(comment: &Comment) -> Self {
        CommentForm {
            id: comment.id,
            parent: comment.parent.clone(),
            user: comment.user.clone(),
            post: comment.post.as_deref().cloned(),
            profile: comment.profile.as_deref().cloned(),
        }
    }

    fn to_entity(&self) -> Comment {
        Comment {
            id: self.id,
            parent: self.parent.clone(),
            user: self.user.clone(),
            post: self.post.clone().map(Box::new),
            profile: self.profile.clone().map(Box::new),
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn validate(&self) -> Result<(), FormError> {
        if self.post.is_none() {
            return Err(FormError::invalid("post", "a comment belongs to a post"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_form_requires_post() {
        let mut form = CommentForm {
            parent: Some(Message::with_content("nice")),
            ..Default::default()
        };
        assert!(form.validate().is_err());

        form.post = Some(Post {
            id: Some(4),
            ..Default::default()
        });
        assert!(form.validate().is_ok());
        assert_eq!(CommentForm::from_entity(&form.to_entity()), form);
    }
}
