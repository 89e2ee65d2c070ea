// Login and account lookup

use log::info;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiResult};
use crate::account::{Account, AccountContext};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    remember_me: bool,
}

#[derive(Deserialize)]
struct TokenResponse {
    id_token: String,
}

impl ApiClient {
    /// Exchange username and password for a JWT; does not change this client's token
    pub async fn authenticate(&self, username: &str, password: &str, remember_me: bool) -> ApiResult<String> {
        let request = LoginRequest {
            username,
            password,
            remember_me,
        };
        let response: TokenResponse = self
            .send_json(Method::POST, "authenticate", Some(&request))
            .await?;
        info!("Authenticated as {}", username);
        Ok(response.id_token)
    }

    pub async fn get_account(&self) -> ApiResult<Account> {
        self.get_json("account", &[]).await
    }

    /// Log in and build the context the views need: an authenticated client plus the account
    pub async fn login(&self, username: &str, password: &str, remember_me: bool) -> ApiResult<AccountContext> {
        let token = self.authenticate(username, password, remember_me).await?;
        self.clone().with_token(&token).resume_session().await
    }

    /// Build the context for a client that already carries a token
    pub async fn resume_session(self) -> ApiResult<AccountContext> {
        let account = self.get_account().await?;
        info!("Session active for {}", account.login);
        Ok(AccountContext::new(account, self))
    }
}
