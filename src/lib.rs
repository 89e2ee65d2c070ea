// Library side of the socialnetwork client, shared by the binary and the integration tests
pub mod account;
pub mod api;
pub mod config;
pub mod format;
pub mod forms;
pub mod merge;
pub mod models;
pub mod poll;
pub mod views;

// Re-export main types for convenience
pub use account::{Account, AccountContext};
pub use api::{ApiClient, ApiError, ApiResult, ChatService};
pub use config::ClientConfig;
pub use models::*;
pub use poll::{PollConfig, PollHandle};
pub use views::{ChatListView, ChatView};
