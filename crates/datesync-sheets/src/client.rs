//! Google Sheets API client.

use datesync_core::retry::{with_retry, RetryConfig, REQUEST_TIMEOUT};
use tracing::instrument;

use crate::error::SheetsError;
use crate::types::*;

pub struct SheetsClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    retry: RetryConfig,
}

impl SheetsClient {
    pub fn with_base_url(access_token: &str, base_url: &str) -> Result<Self, SheetsError> {
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

    fn spreadsheet_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id)
        )
    }

    /// Properties of every sheet in the spreadsheet.
    #[instrument(skip(self), level = "info")]
    pub async fn list_sheets(
        &self,
        spreadsheet_id: &str,
    ) -> Result<Vec<SheetProperties>, SheetsError> {
        let url = format!("{}?fields=sheets.properties", self.spreadsheet_url(spreadsheet_id));

        let response = with_retry(&self.retry, || {
            self.client.get(&url).bearer_auth(&self.access_token).send()
        })
        .await?;

        let resp: SpreadsheetResponse = self.handle_response(response).await?;
        Ok(resp.sheets.into_iter().map(|s| s.properties).collect())
    }

    /// Properties of the sheet titled `title`, if there is one.
    pub async fn find_sheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
    ) -> Result<Option<SheetProperties>, SheetsError> {
        let sheets = self.list_sheets(spreadsheet_id).await?;
        Ok(sheets.into_iter().find(|s| s.title == title))
    }

    /// Sort a sheet in place by its first column.
    #[instrument(skip(self), level = "info")]
    pub async fn sort_by_first_column(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
    ) -> Result<(), SheetsError> {
        let url = format!("{}:batchUpdate", self.spreadsheet_url(spreadsheet_id));
        let body = BatchUpdateRequest::sort_by_first_column(sheet_id);

        let response = with_retry(&self.retry, || {
            self.client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&body)
                .send()
        })
        .await?;

        let _: serde_json::Value = self.handle_response(response).await?;
        Ok(())
    }

    /// Raw cell values of an A1 range, row by row.
    #[instrument(skip(self), level = "info")]
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<serde_json::Value>>, SheetsError> {
        let url = format!(
            "{}/values/{}?majorDimension=ROWS&valueRenderOption=FORMATTED_VALUE",
            self.spreadsheet_url(spreadsheet_id),
            urlencoding::encode(range),
        );

        let response = with_retry(&self.retry, || {
            self.client.get(&url).bearer_auth(&self.access_token).send()
        })
        .await?;

        let resp: ValueRange = self.handle_response(response).await?;
        Ok(resp.values)
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SheetsError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| SheetsError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 400 {
            let text = response.text().await.unwrap_or_default();
            Err(SheetsError::BadRequest(text))
        } else if status.as_u16() == 401 {
            Err(SheetsError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(SheetsError::AuthRequired)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(SheetsError::SpreadsheetNotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(SheetsError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(SheetsError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
