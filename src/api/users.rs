// Account references for relationship selection lists

use super::{ApiClient, ApiResult};
use crate::models::UserRef;

impl ApiClient {
    pub async fn query_users(&self) -> ApiResult<Vec<UserRef>> {
        let users: Option<Vec<UserRef>> = self.get_json("users", &[]).await?;
        Ok(users.unwrap_or_default())
    }
}
