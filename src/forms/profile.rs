use super::{check_attachment, EntityForm, FormError};
use crate::models::{Attachment, Chat, EntityId, Profile, UserRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub id: Option<EntityId>,
    pub status: Option<String>,
    pub picture: Option<String>,
    pub picture_content_type: Option<String>,
    pub user: Option<UserRef>,
    pub others: Vec<Profile>,
    pub profiles: Vec<Profile>,
    pub chats: Vec<Chat>,
}

impl ProfileForm {
    pub fn set_picture(&mut self, attachment: Option<&Attachment>) {
        self.picture = attachment.map(Attachment::encoded);
        self.picture_content_type = attachment.map(|a| a.content_type.clone());
    }
}

impl EntityForm for ProfileForm {
    type Entity = Profile;

    fn from_entity(profile: &Profile) -> Self {
        ProfileForm {
            id: profile.id,
            status: profile.status.clone(),
            picture: profile.picture.clone(),
            picture_content_type: profile.picture_content_type.clone(),
            user: profile.user.clone(),
            others: profile.others.clone().unwrap_or_default(),
            profiles: profile.profiles.clone().unwrap_or_default(),
            chats: profile.chats.clone().unwrap_or_default(),
        }
    }

    fn to_entity(&self) -> Profile {
        Profile {
            id: self.id,
            status: self.status.clone(),
            picture: self.picture.clone(),
            picture_content_type: self.picture_content_type.clone(),
            user: self.user.clone(),
            others: Some(self.others.clone()),
            profiles: Some(self.profiles.clone()),
            posts: None,
            chats: Some(self.chats.clone()),
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn validate(&self) -> Result<(), FormError> {
        check_attachment("picture", &self.picture, &self.picture_content_type)
    }
}
