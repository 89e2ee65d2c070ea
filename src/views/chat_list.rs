// Chat list screen state: the account's chats, their sort order and the selection

use log::{info, warn};
use std::fmt;

use crate::api::{ApiClient, ApiResult, ChatService};
use crate::models::{Chat, EntityId};

pub const DEFAULT_SORT_PREDICATE: &str = "id";

/// Sort order as the backend's `sort` parameter spells it: "predicate,asc|desc"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub predicate: String,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            predicate: DEFAULT_SORT_PREDICATE.to_string(),
            ascending: true,
        }
    }
}

impl SortState {
    /// Parse "predicate,asc|desc"; a missing or unknown order means ascending
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ',');
        let predicate = parts
            .next()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_SORT_PREDICATE);
        let ascending = !matches!(parts.next().map(str::trim), Some("desc"));
        SortState {
            predicate: predicate.to_string(),
            ascending,
        }
    }

    /// Same column flips the order, a new column starts ascending
    pub fn toggle(&mut self, predicate: &str) {
        if self.predicate == predicate {
            self.ascending = !self.ascending;
        } else {
            self.predicate = predicate.to_string();
            self.ascending = true;
        }
    }

    pub fn sort(&self, chats: &mut [Chat]) {
        chats.sort_by(|a, b| {
            let ordering = match self.predicate.as_str() {
                "initiatorName" => a.initiator_name.cmp(&b.initiator_name),
                "accepted" => a.is_accepted().cmp(&b.is_accepted()),
                _ => a.id.cmp(&b.id),
            };
            // Stable tie-break so equal keys don't shuffle between reloads
            let ordering = ordering.then_with(|| a.id.cmp(&b.id));
            if self.ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = if self.ascending { "asc" } else { "desc" };
        write!(f, "{},{}", self.predicate, order)
    }
}

pub struct ChatListView {
    api: ApiClient,
    chats: Vec<Chat>,
    sort: SortState,
    selected: usize,
}

impl ChatListView {
    pub fn new(api: ApiClient) -> Self {
        ChatListView {
            api,
            chats: Vec::new(),
            sort: SortState::default(),
            selected: 0,
        }
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Fetch the chats in the current sort order, keeping the selection on the same chat if possible
    pub async fn load(&mut self) -> ApiResult<()> {
        let previous = self.selected_chat().and_then(|c| c.id);
        let mut chats = self.api.query_chats(Some(&self.sort.to_string())).await?;
        self.sort.sort(&mut chats);
        info!("Loaded {} chats", chats.len());
        self.set_chats(chats, previous);
        Ok(())
    }

    /// Change the sort locally without another round trip
    pub fn refine(&mut self, predicate: &str) {
        let previous = self.selected_chat().and_then(|c| c.id);
        self.sort.toggle(predicate);
        let mut chats = std::mem::take(&mut self.chats);
        self.sort.sort(&mut chats);
        self.set_chats(chats, previous);
    }

    fn set_chats(&mut self, chats: Vec<Chat>, keep: Option<EntityId>) {
        self.chats = chats;
        self.selected = keep
            .and_then(|id| self.chats.iter().position(|c| c.id == Some(id)))
            .unwrap_or(0)
            .min(self.chats.len().saturating_sub(1));
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_chat(&self) -> Option<&Chat> {
        self.chats.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if !self.chats.is_empty() {
            self.selected = (self.selected + 1) % self.chats.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.chats.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.chats.len() - 1);
        }
    }

    /// Accept the selected chat; the row is updated in place on success
    pub async fn accept_selected(&mut self) -> bool {
        let Some(id) = self.selected_chat().and_then(|c| c.id) else {
            return false;
        };
        match self.api.accept_chat(id).await {
            Ok(_) => {
                if let Some(chat) = self.chats.iter_mut().find(|c| c.id == Some(id)) {
                    chat.accepted = Some(true);
                }
                true
            }
            Err(e) => {
                warn!("Accepting chat {} failed: {}", id, e);
                false
            }
        }
    }

    /// Delete the selected chat and reload the list.
    ///
    /// Once the DELETE went through the result is `Ok(Some(id))`; a failed reload
    /// only leaves the local list (without the deleted row) in place.
    pub async fn delete_selected(&mut self) -> ApiResult<Option<EntityId>> {
        let Some(id) = self.selected_chat().and_then(|c| c.id) else {
            return Ok(None);
        };
        self.api.delete::<Chat>(id).await?;
        info!("Deleted chat {}", id);

        let next = self.chats.get(self.selected + 1).and_then(|c| c.id);
        let mut chats = std::mem::take(&mut self.chats);
        chats.retain(|c| c.id != Some(id));
        self.set_chats(chats, next);

        if let Err(e) = self.load().await {
            warn!("Reloading chats after deleting chat {} failed: {}", id, e);
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(id: EntityId, initiator: &str, accepted: bool) -> Chat {
        Chat {
            id: Some(id),
            initiator_name: Some(initiator.to_string()),
            accepted: Some(accepted),
            ..Default::default()
        }
    }

    fn ids(chats: &[Chat]) -> Vec<EntityId> {
        chats.iter().filter_map(|c| c.id).collect()
    }

    #[test]
    fn test_sort_state_parse_and_display() {
        assert_eq!(SortState::parse("id,desc").to_string(), "id,desc");
        assert_eq!(SortState::parse("initiatorName").to_string(), "initiatorName,asc");
        assert_eq!(SortState::parse(""), SortState::default());
        assert!(SortState::parse("accepted,sideways").ascending);
    }

    #[test]
    fn test_sort_toggle() {
        let mut sort = SortState::default();
        sort.toggle("id");
        assert_eq!(sort.to_string(), "id,desc");
        sort.toggle("accepted");
        assert_eq!(sort.to_string(), "accepted,asc");
    }

    #[test]
    fn test_sort_chats() {
        let mut chats = vec![chat(2, "bob", true), chat(3, "alice", false), chat(1, "carol", false)];

        SortState::parse("id,asc").sort(&mut chats);
        assert_eq!(ids(&chats), vec![1, 2, 3]);

        SortState::parse("initiatorName,desc").sort(&mut chats);
        assert_eq!(ids(&chats), vec![1, 2, 3]);

        SortState::parse("accepted,asc").sort(&mut chats);
        assert_eq!(ids(&chats), vec![1, 3, 2]);
    }

    #[test]
    fn test_refine_keeps_selection_and_wraps() {
        let mut view = ChatListView::new(ApiClient::new("http://localhost:8080"));
        view.set_chats(vec![chat(1, "a", false), chat(2, "b", false), chat(3, "c", false)], None);

        view.select_next();
        assert_eq!(view.selected_chat().and_then(|c| c.id), Some(2));

        view.refine("id");
        assert_eq!(ids(view.chats()), vec![3, 2, 1]);
        assert_eq!(view.selected_chat().and_then(|c| c.id), Some(2));

        view.select_previous();
        view.select_previous();
        assert_eq!(view.selected_chat().and_then(|c| c.id), Some(1));
    }
}
