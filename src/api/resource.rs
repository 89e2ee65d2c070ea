// Generic CRUD over the backend's entity resources
// Every entity is exposed the same way: POST /api/<path>, PUT|PATCH|GET|DELETE /api/<path>/{id}
// and GET /api/<path> for listing.

use log::info;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use super::{ApiClient, ApiError, ApiResult};
use crate::models::{Chat, Comment, EntityId, Identified, Message, Post, Profile};

/// An entity that maps onto one REST collection
pub trait Resource: Identified + Serialize + DeserializeOwned + Send + Sync {
    /// Collection path below `/api`
    const PATH: &'static str;
    /// Entity name used in log lines and errors
    const NAME: &'static str;
}

impl Resource for Chat {
    const PATH: &'static str = "chats";
    const NAME: &'static str = "chat";
}

impl Resource for Message {
    const PATH: &'static str = "messages";
    const NAME: &'static str = "message";
}

impl Resource for Profile {
    const PATH: &'static str = "profiles";
    const NAME: &'static str = "profile";
}

impl Resource for Post {
    const PATH: &'static str = "posts";
    const NAME: &'static str = "post";
}

impl Resource for Comment {
    const PATH: &'static str = "comments";
    const NAME: &'static str = "comment";
}

impl ApiClient {
    /// POST a new entity; the server assigns the id
    pub async fn create<R: Resource>(&self, entity: &R) -> ApiResult<R> {
        if entity.id().is_some() {
            return Err(ApiError::IdExists(R::NAME));
        }
        let created: R = self.send_json(Method::POST, R::PATH, Some(entity)).await?;
        info!("Created {} {:?}", R::NAME, created.id());
        Ok(created)
    }

    /// PUT the full entity over the persisted one
    pub async fn update<R: Resource>(&self, entity: &R) -> ApiResult<R> {
        let id = entity.id().ok_or(ApiError::MissingId(R::NAME))?;
        self.send_json(Method::PUT, &format!("{}/{}", R::PATH, id), Some(entity))
            .await
    }

    /// PATCH only the non-null fields of `entity`
    pub async fn partial_update<R: Resource>(&self, entity: &R) -> ApiResult<R> {
        let id = entity.id().ok_or(ApiError::MissingId(R::NAME))?;
        self.send_json(Method::PATCH, &format!("{}/{}", R::PATH, id), Some(entity))
            .await
    }

    pub async fn find<R: Resource>(&self, id: EntityId) -> ApiResult<R> {
        self.get_json(&format!("{}/{}", R::PATH, id), &[]).await
    }

    /// List the collection; `params` are passed through as query parameters
    pub async fn query<R: Resource>(&self, params: &[(&str, String)]) -> ApiResult<Vec<R>> {
        // A null body is treated as an empty list
        let items: Option<Vec<R>> = self.get_json(R::PATH, params).await?;
        Ok(items.unwrap_or_default())
    }

    pub async fn delete<R: Resource>(&self, id: EntityId) -> ApiResult<()> {
        self.send_empty(Method::DELETE, &format!("{}/{}", R::PATH, id))
            .await?;
        info!("Deleted {} {}", R::NAME, id);
        Ok(())
    }
}
