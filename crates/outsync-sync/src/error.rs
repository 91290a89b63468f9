//! Sync engine error types.

use thiserror::Error;

use outsync_graph::GraphError;

/// Failure of one sync run, naming the phase that broke.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Directory sync failed: {source}")]
    Directory { source: GraphError },

    #[error("Calendar view sync failed for {user_id}: {source}")]
    CalendarView { user_id: String, source: GraphError },

    #[error("Event sync failed for {user_id}: {source}")]
    Events { user_id: String, source: GraphError },

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl SyncError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Directory { source } => {
                format!("Could not sync the user directory: {}", source.user_message())
            }
            Self::CalendarView { user_id, source } => {
                format!("Calendar sync failed for {}: {}", user_id, source.user_message())
            }
            Self::Events { user_id, source } => {
                format!("Event sync failed for {}: {}", user_id, source.user_message())
            }
            Self::Store(_) => "Local store error".to_string(),
        }
    }

    /// Whether the underlying failure is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Directory { source }
            | Self::CalendarView { source, .. }
            | Self::Events { source, .. } => source.is_retryable(),
            Self::Store(_) => false,
        }
    }
}
