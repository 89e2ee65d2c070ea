// Screen state for the terminal client, independent of any rendering

use log::warn;
use std::future::Future;
use std::time::Duration;

pub mod chat_detail;
pub mod chat_list;
pub mod profiles;

pub use chat_detail::ChatView;
pub use chat_list::{ChatListView, SortState};
pub use profiles::ProfileDirectory;

/// How long the UI waits for a one-shot request (send, accept, delete, reload...)
pub const UI_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a one-shot request with a deadline. `None` means it gave up; the request
/// future is dropped and the view keeps its previous state.
pub async fn bounded<F: Future>(limit: Duration, request: F) -> Option<F::Output> {
    match tokio::time::timeout(limit, request).await {
        Ok(output) => Some(output),
        Err(_) => {
            warn!("Request gave up after {:?}", limit);
            None
        }
    }
}
