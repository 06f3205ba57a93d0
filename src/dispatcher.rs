use crate::errors::AppError;
use crate::models::WebhookMessage;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;

/// Posts notifications to the messaging webhook, one at a time.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
    delay: Duration,
}

impl WebhookDispatcher {
    /// Creates a new `WebhookDispatcher`.
    ///
    /// # Arguments
    ///
    /// * `url` - The webhook endpoint.
    /// * `headers` - Extra headers sent with every post.
    /// * `delay` - Pause between consecutive posts.
    pub fn new(
        url: String,
        headers: &HashMap<String, String>,
        delay: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Delivery(format!("Failed to create webhook client: {}", e)))?;

        Ok(Self {
            client,
            url,
            headers: build_header_map(headers)?,
            delay,
        })
    }

    /// Posts a single `{"text": message}` body.
    pub async fn send(&self, message: &str) -> Result<(), AppError> {
        let body = WebhookMessage {
            text: message.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Webhook request failed: {}", e);
                AppError::Delivery(format!("Webhook request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("The request failed with status code: {}", status);
            return Err(AppError::Delivery(format!(
                "Webhook returned {}: {}",
                status, error_text
            )));
        }

        Ok(())
    }

    /// Sends every message in order, pausing between posts.
    ///
    /// Stops at the first failure; messages already sent are not retried and
    /// the remaining ones are never sent. Returns how many were delivered.
    pub async fn dispatch_all<I>(&self, messages: I) -> Result<usize, AppError>
    where
        I: IntoIterator<Item = String>,
    {
        tracing::info!("Sending message data to webhook");
        let mut request_counter = 0usize;

        for message in messages {
            if request_counter > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.send(&message).await.map_err(|e| {
                tracing::error!(
                    "Delivery aborted after {} {}",
                    request_counter,
                    plural(request_counter, "message", "messages")
                );
                e
            })?;
            request_counter += 1;
        }

        tracing::info!(
            "{} {} were sent to the webhook!",
            request_counter,
            plural(request_counter, "message", "messages")
        );
        Ok(request_counter)
    }
}

/// Converts configured header pairs into a `HeaderMap`.
pub fn build_header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, AppError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Config(format!("Invalid value for header {}: {}", name, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub(crate) fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}
