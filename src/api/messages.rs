// Message listing
// Messages are mostly created through a chat (see chats.rs); the plain collection is
// used by the message and comment editors to fill their selection lists.

use super::{ApiClient, ApiResult};
use crate::models::Message;

impl ApiClient {
    /// List messages; `filter` is passed to the backend's `?filter=` parameter
    /// (e.g. "comment-is-null" for messages not yet used as a comment)
    pub async fn query_messages(&self, filter: Option<&str>) -> ApiResult<Vec<Message>> {
        let params: Vec<(&str, String)> = filter
            .map(|f| vec![("filter", f.to_string())])
            .unwrap_or_default();
        self.query::<Message>(&params).await
    }
}
