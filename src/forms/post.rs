use chrono::{DateTime, Utc};

use super::{check_attachment, non_blank, EntityForm, FormError};
use crate::models::{Attachment, EntityId, Post, Profile, UserRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostForm {
    pub id: Option<EntityId>,
    pub image: Option<String>,
    pub image_content_type: Option<String>,
    pub description: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub user: Option<UserRef>,
    pub profile: Option<Profile>,
}

impl PostForm {
    pub fn set_image(&mut self, attachment: Option<&Attachment>) {
        self.image = attachment.map(Attachment::encoded);
        self.image_content_type = attachment.map(|a| a.content_type.clone());
    }
}

impl EntityForm for PostForm {
    type Entity = Post;

    fn from_entity(post: &Post) -> Self {
        PostForm {
            id: post.id,
            image: post.image.clone(),
            image_content_type: post.image_content_type.clone(),
            description: post.description.clone(),
            time: post.time,
            user: post.user.clone(),
            profile: post.profile.as_deref().cloned(),
        }
    }

    // Comments are managed through the comment endpoint, never through the post
    fn to_entity(&self) -> Post {
        Post {
            id: self.id,
            image: self.image.clone(),
            image_content_type: self.image_content_type.clone(),
            description: self.description.clone(),
            time: self.time,
            user: self.user.clone(),
            profile: self.profile.clone().map(Box::new),
            comments: None,
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn validate(&self) -> Result<(), FormError> {
        check_attachment("image", &self.image, &self.image_content_type)?;
        if self.image.is_none() && non_blank(&self.description).is_none() {
            return Err(FormError::invalid("description", "an empty post needs an image or text"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_form_validation() {
        let mut form = PostForm::default();
        assert!(form.validate().is_err());

        form.set_image(Some(&Attachment::new(vec![0xff, 0xd8], "image/jpeg")));
        assert!(form.validate().is_ok());

        form.set_image(None);
        form.description = Some("sunset".into());
        assert!(form.validate().is_ok());
        assert!(form.to_entity().comments.is_none());
    }
}
