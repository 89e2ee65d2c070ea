// REST client for the social network backend
// This file holds the shared client, the error type and the request helpers.
// Resource-specific calls live in the submodules, each adding an `impl ApiClient` block.

use log::{debug, warn};
use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod account;
pub mod chats;
pub mod messages;
pub mod posts;
pub mod profiles;
pub mod resource;
pub mod users;

pub use chats::ChatService;
pub use resource::Resource;

/// Content type the backend expects for partial updates
pub const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 401/403
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The server answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded into the expected type
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An update was requested for an entity that was never persisted
    #[error("A {0} without an id cannot be updated")]
    MissingId(&'static str),

    /// A create was requested for an entity that already has an id
    #[error("A new {0} cannot already have an id")]
    IdExists(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP client bound to one backend and (optionally) one bearer token
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Same backend, authenticated with the given JWT
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below `/api`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!("REST {} {}", method, url);
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // Turn a response into a typed body, mapping error statuses onto ApiError
    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!("REST call to {} failed with {}", url, status);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(url),
            StatusCode::NOT_FOUND => ApiError::NotFound(url),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut builder = self.request(method.clone(), path);
        // Must be set before json(), which only fills in a missing content type
        if method == Method::PATCH {
            builder = builder.header(header::CONTENT_TYPE, MERGE_PATCH_JSON);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;
        Self::read_json(response).await
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> ApiResult<()> {
        let response = self.request(method, path).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
