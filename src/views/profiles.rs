// Profile directory: every other profile, with a way to ask one of them for a chat

use log::info;

use crate::api::{ApiClient, ApiResult};
use crate::models::{Chat, Profile};

pub struct ProfileDirectory {
    api: ApiClient,
    own: Option<Profile>,
    profiles: Vec<Profile>,
    selected: usize,
}

impl ProfileDirectory {
    pub fn new(api: ApiClient) -> Self {
        ProfileDirectory {
            api,
            own: None,
            profiles: Vec::new(),
            selected: 0,
        }
    }

    /// Load the caller's own profile and the others (with their relations)
    pub async fn load(&mut self) -> ApiResult<()> {
        let own = self.api.find_current_profile().await?;
        let all = self.api.query_profiles(true).await?;
        self.set_profiles(Some(own), all);
        info!("Profile directory holds {} profiles", self.profiles.len());
        Ok(())
    }

    fn set_profiles(&mut self, own: Option<Profile>, all: Vec<Profile>) {
        let own_id = own.as_ref().and_then(|p| p.id);
        self.profiles = all.into_iter().filter(|p| p.id != own_id || own_id.is_none()).collect();
        self.own = own;
        self.selected = self.selected.min(self.profiles.len().saturating_sub(1));
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_profile(&self) -> Option<&Profile> {
        self.profiles.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.profiles.is_empty() {
            self.selected = (self.selected + 1) % self.profiles.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.profiles.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.profiles.len() - 1);
        }
    }

    pub fn is_friend(&self, profile: &Profile) -> bool {
        match (&self.own, profile.id) {
            (Some(own), Some(id)) => own.is_friend_of(id),
            _ => false,
        }
    }

    /// Ask the selected profile for a chat; the new chat starts out pending
    pub async fn request_chat(&self) -> ApiResult<Option<Chat>> {
        let Some(id) = self.selected_profile().and_then(|p| p.id) else {
            return Ok(None);
        };
        let chat = self.api.request_chat_with_profile(id).await?;
        Ok(Some(chat))
    }
}
