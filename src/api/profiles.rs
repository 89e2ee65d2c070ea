// Profile-specific REST calls

use super::{ApiClient, ApiResult};
use crate::models::Profile;

impl ApiClient {
    /// The profile that belongs to the logged-in account
    pub async fn find_current_profile(&self) -> ApiResult<Profile> {
        self.get_json("profiles/current-user", &[]).await
    }

    /// List profiles; with `eagerload` the friendship and chat relations are filled in
    pub async fn query_profiles(&self, eagerload: bool) -> ApiResult<Vec<Profile>> {
        self.query::<Profile>(&[("eagerload", eagerload.to_string())])
            .await
    }
}
