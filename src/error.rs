use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The channel feed could not be fetched or parsed. The detail is logged, not returned.
    #[error("Could not read channel feed.")]
    FeedUnreadable(String),

    #[error("Listing backend unavailable: {0}")]
    ListingUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::FeedUnreadable(detail) => {
                tracing::warn!(%detail, "channel feed unreadable");
                StatusCode::BAD_REQUEST
            }
            AppError::ListingUnavailable(detail) => {
                tracing::error!(%detail, "listing backend failed");
                StatusCode::BAD_GATEWAY
            }
            AppError::ConfigError(detail) => {
                tracing::error!(%detail, "configuration error while serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
