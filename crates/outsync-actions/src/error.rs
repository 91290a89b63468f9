//! Action error types.

use thiserror::Error;

use outsync_graph::GraphError;
use outsync_sync::SyncError;

/// Failure of an event action.
///
/// A mutation that reaches the server but is rejected surfaces the
/// HTTP status and status text through the [`GraphError`]; a mutation
/// that succeeds but whose follow-up re-sync fails comes back as
/// [`Resync`](Self::Resync): the event exists but the local store is
/// stale.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Event mutation failed: {0}")]
    Graph(#[from] GraphError),

    #[error("Event saved but re-sync failed: {0}")]
    Resync(#[from] SyncError),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
}

impl ActionError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Graph(source) => source.user_message(),
            Self::Resync(source) => format!(
                "The event was saved, but refreshing local data failed: {}",
                source.user_message()
            ),
            Self::InvalidParams(msg) => format!("Invalid parameters: {}", msg),
        }
    }

    /// Whether retrying the whole action could help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Graph(source) => source.is_retryable(),
            Self::Resync(source) => source.is_retryable(),
            Self::InvalidParams(_) => false,
        }
    }
}
