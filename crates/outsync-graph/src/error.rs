//! Graph-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Access forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("Unusable continuation link: {0}")]
    InvalidNextLink(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl GraphError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::TokenExpired => "Your access token has expired. Sign in again.".to_string(),
            Self::Forbidden => "You do not have permission to access this resource.".to_string(),
            Self::NotFound(_) => "Resource not found".to_string(),
            Self::RateLimited(secs) => format!("Too many requests. Please wait {} seconds.", secs),
            Self::Api(msg) => format!("Graph error: {}", msg),
            Self::InvalidNextLink(_) => "The server returned an unusable paging link".to_string(),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
        }
    }

    /// Whether this error should trigger a token refresh.
    pub fn should_refresh_token(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }

    /// Whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Network(_))
    }

    /// Whether this is the 404 case the fetchers tolerate as an empty result.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
