use crate::errors::AppError;
use chrono::NaiveDate;
use std::time::Duration;

/// Client for the survey API `report/answer` endpoint.
#[derive(Clone)]
pub struct SurveyClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl SurveyClient {
    /// Creates a new `SurveyClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the survey API (e.g. `https://api.tracksale.co/v2`).
    /// * `token` - The bearer token for authentication.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to create survey client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Fetches answers for an inclusive date range and returns the raw body.
    ///
    /// # Arguments
    ///
    /// * `start` - First calendar date of the report.
    /// * `end` - Last calendar date of the report.
    /// * `limit` - Maximum number of answers; `None` asks for all of them.
    pub async fn fetch_answers(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: Option<i64>,
    ) -> Result<String, AppError> {
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        // The API reads a negative limit as "no limit".
        let limit = limit.unwrap_or(-1).to_string();

        let url = reqwest::Url::parse_with_params(
            &format!("{}/report/answer", self.base_url),
            &[
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("limit", limit.as_str()),
            ],
        )
        .map_err(|e| AppError::Fetch(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Fetching answers from {} to {}...", start, end);

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("bearer {}", self.token))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Survey API request failed: {}", e);
                AppError::Fetch(format!("Survey API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Survey API returned error {}: {}", status, error_text);
            return Err(AppError::Fetch(format!(
                "Survey API returned {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| {
            AppError::Fetch(format!("Failed to read survey API response: {}", e))
        })?;

        tracing::debug!("Survey API returned {} bytes", body.len());
        Ok(body)
    }
}
