//! Graph API client.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::GraphError;
use crate::payload::EventPayload;
use crate::types::{ApiEvent, ApiUser, ListPage};
use crate::window::SyncWindow;

const DEFAULT_PAGE_SIZE: u32 = 100;

pub struct GraphClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    page_size: u32,
}

impl GraphClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build a client with an explicit page size and request timeout.
    pub fn with_options(
        base_url: &str,
        access_token: &str,
        page_size: u32,
        timeout: Duration,
    ) -> Result<Self, GraphError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List every user in the directory.
    #[instrument(skip(self), level = "info")]
    pub async fn list_users(&self) -> Result<Vec<ApiUser>, GraphError> {
        self.get_paged("/users", "").await
    }

    /// Calendar view of one user within a window.
    #[instrument(skip(self), level = "info")]
    pub async fn calendar_view(
        &self,
        user_id: &str,
        window: &SyncWindow,
    ) -> Result<Vec<ApiEvent>, GraphError> {
        let path = format!("/users/{}/calendarView", urlencoding::encode(user_id));
        let query = format!(
            "startDateTime={}&endDateTime={}",
            urlencoding::encode(&window.start.to_rfc3339()),
            urlencoding::encode(&window.end.to_rfc3339()),
        );
        self.get_paged(&path, &query).await
    }

    /// Events on one user's default calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(&self, user_id: &str) -> Result<Vec<ApiEvent>, GraphError> {
        let path = format!("/users/{}/calendar/events", urlencoding::encode(user_id));
        self.get_paged(&path, "").await
    }

    /// Create an event on the signed-in user's default calendar.
    #[instrument(skip(self, payload), level = "info")]
    pub async fn create_event(&self, payload: &EventPayload) -> Result<ApiEvent, GraphError> {
        let url = format!("{}/me/events", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(payload)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Update an existing event on the signed-in user's default calendar.
    #[instrument(skip(self, payload), level = "info")]
    pub async fn update_event(
        &self,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<ApiEvent, GraphError> {
        let url = format!(
            "{}/me/events/{}",
            self.base_url,
            urlencoding::encode(event_id),
        );

        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .json(payload)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// GET a paged collection, draining continuation links.
    ///
    /// Only the query string of a continuation link is honored; it is
    /// re-applied to `path` against the configured base URL, so a link
    /// pointing at another host cannot redirect the sync.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
    ) -> Result<Vec<T>, GraphError> {
        let mut items = Vec::new();
        let mut query = if query.is_empty() {
            format!("$top={}", self.page_size)
        } else {
            format!("{}&$top={}", query, self.page_size)
        };

        loop {
            let url = format!("{}{}?{}", self.base_url, path, query);

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let page: ListPage<T> = self.handle_response(response).await?;
            tracing::debug!("fetched {} records from {}", page.value.len(), path);
            items.extend(page.value);

            match page.next_link {
                Some(link) => query = next_link_query(&link)?,
                None => break,
            }
        }

        Ok(items)
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GraphError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| GraphError::Api(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(GraphError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(GraphError::Forbidden)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(GraphError::NotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(GraphError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(GraphError::Api(format!("{}: {}", status, text)))
        }
    }
}

/// Extract the query string of a continuation link.
///
/// Absolute links are parsed and only their query kept; relative links
/// fall back to splitting on `?`. A link with no query at all cannot
/// advance pagination and is rejected.
fn next_link_query(link: &str) -> Result<String, GraphError> {
    let query = match url::Url::parse(link) {
        Ok(parsed) => parsed.query().map(str::to_string),
        Err(_) => link.split_once('?').map(|(_, q)| q.to_string()),
    };

    match query {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(GraphError::InvalidNextLink(link.to_string())),
    }
}
