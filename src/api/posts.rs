// Post-specific REST calls

use log::info;
use reqwest::Method;

use super::{ApiClient, ApiResult};
use crate::models::{EntityId, Message, Post};

impl ApiClient {
    /// Comment on a post; the server wraps the text into a comment owned by the
    /// current profile and returns the updated post
    pub async fn comment_on_post(&self, post_id: EntityId, content: &str) -> ApiResult<Post> {
        let message = Message::with_content(content);
        let post: Post = self
            .send_json(Method::PATCH, &format!("posts/{}/comment", post_id), Some(&message))
            .await?;
        info!("Commented on post {}", post_id);
        Ok(post)
    }
}
