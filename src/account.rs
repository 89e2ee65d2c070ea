// The logged-in account, passed explicitly to every view that needs to know
// who "me" is.

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::models::{EntityId, Message};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub login: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

/// Who is logged in, plus the client authenticated as them
#[derive(Debug, Clone)]
pub struct AccountContext {
    pub account: Account,
    pub api: ApiClient,
}

impl AccountContext {
    pub fn new(account: Account, api: ApiClient) -> Self {
        AccountContext { account, api }
    }

    pub fn login(&self) -> &str {
        &self.account.login
    }

    /// Messages carry the sender's login as `senderName`
    pub fn is_own_message(&self, message: &Message) -> bool {
        message.sender_name.as_deref() == Some(self.login())
    }
}
