//! Google Calendar API client.

use chrono::{DateTime, Utc};
use datesync_core::retry::{with_retry, RetryConfig, REQUEST_TIMEOUT};
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::*;

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    retry: RetryConfig,
}

impl CalendarClient {
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List one page of events in a time range, recurring events expanded
    /// into single instances.
    #[instrument(skip(self), level = "info")]
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        event_type: &str,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, CalendarError> {
        let mut url = format!(
            "{}/calendars/{}/events?eventTypes={}&singleEvents=true\
             &timeMin={}&timeMax={}&maxResults=250",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_type),
            urlencoding::encode(&time_min.to_rfc3339()),
            urlencoding::encode(&time_max.to_rfc3339()),
        );

        if let Some(pt) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(pt)));
        }

        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
        })
        .await?;

        self.handle_response(response).await
    }

    /// Create a yearly birthday-type event. Never retried.
    #[instrument(skip(self, event), fields(summary = %event.summary), level = "info")]
    pub async fn create_event(
        &self,
        calendar_id: &str,
        event: &NewBirthdayEvent,
    ) -> Result<ApiEvent, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id),
        );

        // Inserts are not idempotent: a retry after a lost response could
        // create the event twice, so this is sent exactly once.
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(event)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::InvalidEventData(text))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::NotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
