// Chat form and the chat editor with its relationship options

use log::debug;

use super::{save_form, EntityForm, FormError};
use crate::api::{ApiClient, ApiResult};
use crate::merge::{add_to_collection_if_missing, same_entity};
use crate::models::{Chat, EntityId, Profile, UserRef};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatForm {
    pub id: Option<EntityId>,
    pub initiator_name: Option<String>,
    pub accepted: bool,
    pub user: Option<UserRef>,
    pub profiles: Vec<Profile>,
}

impl EntityForm for ChatForm {
    type Entity = Chat;

    fn from_entity(chat: &Chat) -> Self {
        ChatForm {
            id: chat.id,
            initiator_name: chat.initiator_name.clone(),
            accepted: chat.is_accepted(),
            user: chat.user.clone(),
            profiles: chat.profiles.clone().unwrap_or_default(),
        }
    }

    fn to_entity(&self) -> Chat {
        Chat {
            id: self.id,
            initiator_name: self.initiator_name.clone(),
            accepted: Some(self.accepted),
            user: self.user.clone(),
            profiles: Some(self.profiles.clone()),
            messages: None,
        }
    }

    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

/// Chat form plus the option lists its user and profile selectors offer
#[derive(Debug, Clone, Default)]
pub struct ChatEditor {
    pub form: ChatForm,
    pub user_options: Vec<UserRef>,
    pub profile_options: Vec<Profile>,
}

impl ChatEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edit(chat: &Chat) -> Self {
        let mut editor = ChatEditor {
            form: ChatForm::from_entity(chat),
            ..Default::default()
        };
        // Until the server lists arrive, the current selections are the only options
        editor.seed_options(Vec::new(), Vec::new());
        editor
    }

    /// Fetch users and profiles and make sure the current selections are among them
    pub async fn load_relationship_options(&mut self, api: &ApiClient) -> ApiResult<()> {
        let users = api.query_users().await?;
        let profiles = api.query_profiles(false).await?;
        self.seed_options(users, profiles);
        debug!(
            "Chat editor options: {} users, {} profiles",
            self.user_options.len(),
            self.profile_options.len()
        );
        Ok(())
    }

    /// Replace the option lists, prepending selections the server lists lack
    pub fn seed_options(&mut self, users: Vec<UserRef>, profiles: Vec<Profile>) {
        self.user_options = add_to_collection_if_missing(users, [self.form.user.clone()]);
        self.profile_options = add_to_collection_if_missing(
            profiles,
            self.form.profiles.iter().cloned().map(Some),
        );
    }

    pub fn is_profile_selected(&self, profile: &Profile) -> bool {
        self.form
            .profiles
            .iter()
            .any(|p| same_entity(Some(p), Some(profile)))
    }

    pub fn toggle_profile(&mut self, profile: &Profile) {
        if self.is_profile_selected(profile) {
            self.form
                .profiles
                .retain(|p| !same_entity(Some(p), Some(profile)));
        } else {
            self.form.profiles.push(profile.clone());
        }
    }

    pub fn select_user(&mut self, user: Option<&UserRef>) {
        self.form.user = user.cloned();
    }

    pub async fn save(&self, api: &ApiClient) -> Result<Chat, FormError> {
        save_form(api, &self.form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ids_of;

    fn profile(id: EntityId) -> Profile {
        Profile {
            id: Some(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_form_defaults() {
        let form = ChatForm::default();
        assert!(form.is_new());
        assert!(!form.accepted);
        assert!(form.profiles.is_empty());

        let chat = form.to_entity();
        assert_eq!(chat.accepted, Some(false));
        assert_eq!(chat.profiles, Some(Vec::new()));
        assert!(chat.messages.is_none());
    }

    #[test]
    fn test_from_entity_and_reset() {
        let chat = Chat {
            id: Some(3),
            initiator_name: Some("alice".into()),
            accepted: None,
            profiles: Some(vec![profile(1)]),
            messages: Some(Vec::new()),
            ..Default::default()
        };

        let mut form = ChatForm::from_entity(&chat);
        assert!(!form.is_new());
        assert!(!form.accepted);
        // Messages are never part of the edited entity
        assert!(form.to_entity().messages.is_none());

        form.reset(None);
        assert_eq!(form, ChatForm::default());
        form.reset(Some(&chat));
        assert_eq!(form.id, Some(3));
    }

    #[test]
    fn test_seed_options_keeps_current_selections() {
        let chat = Chat {
            id: Some(3),
            user: Some(UserRef::with_id(9)),
            profiles: Some(vec![profile(1), profile(7)]),
            ..Default::default()
        };
        let mut editor = ChatEditor::edit(&chat);
        assert_eq!(ids_of(&editor.profile_options), vec![1, 7]);

        editor.seed_options(
            vec![UserRef::with_id(1), UserRef::with_id(2)],
            vec![profile(1), profile(2)],
        );
        assert_eq!(ids_of(&editor.user_options), vec![9, 1, 2]);
        assert_eq!(ids_of(&editor.profile_options), vec![7, 1, 2]);
    }

    #[test]
    fn test_toggle_profile() {
        let mut editor = ChatEditor::new();
        editor.toggle_profile(&profile(4));
        assert!(editor.is_profile_selected(&profile(4)));
        editor.toggle_profile(&profile(4));
        assert!(editor.form.profiles.is_empty());
    }
}
