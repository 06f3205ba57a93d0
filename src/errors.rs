use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Survey API transport failure or non-2xx response.
    Fetch(String),
    /// Survey API payload could not be decoded into answers.
    Decode(String),
    /// Checkpoint backend unreachable, or the stored value is missing/malformed.
    CheckpointRead(String),
    /// Checkpoint backend rejected the upsert.
    CheckpointWrite(String),
    /// Webhook transport failure or non-2xx response.
    Delivery(String),
    /// Invalid runtime configuration (headers, time zone, table name).
    Config(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Returns the innermost error, skipping any context layers.
    pub fn root_cause(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Fetch(msg) => write!(f, "Fetch error: {}", msg),
            AppError::Decode(msg) => write!(f, "Decode error: {}", msg),
            AppError::CheckpointRead(msg) => write!(f, "Checkpoint read error: {}", msg),
            AppError::CheckpointWrite(msg) => write!(f, "Checkpoint write error: {}", msg),
            AppError::Delivery(msg) => write!(f, "Delivery error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Upstream failures (survey API, webhook) map to 502, local failures
    /// (checkpoint backend, configuration) to 500.
    fn into_response(self) -> Response {
        let status = match self.root_cause() {
            AppError::Fetch(_) | AppError::Decode(_) | AppError::Delivery(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::CheckpointRead(_) | AppError::CheckpointWrite(_) | AppError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::WithContext { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Run failed: {}", self);

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
