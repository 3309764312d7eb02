use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// The scrape/trailer variants exist for internal diagnostics; at the HTTP
/// boundary they all collapse into one opaque lookup failure (see the
/// `IntoResponse` impl below).
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Navigation timed out: {0}")]
    NavigationTimeout(String),

    #[error("No results found for: {0}")]
    NoResultsFound(String),

    #[error("No trailer found: {0}")]
    TrailerNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            // Every pipeline failure surfaces as the same generic message;
            // the variant only matters for the logs.
            _ => {
                tracing::error!(error = %self, "movie lookup failed");
                (StatusCode::BAD_GATEWAY, "movie lookup failed".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
