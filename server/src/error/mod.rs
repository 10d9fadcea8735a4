use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures inside the metadata extractor.
///
/// These never reach an HTTP caller: `MetadataExtractor::extract` logs them and
/// answers with a degraded result instead.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid selector {0:?}")]
    Selector(String),

    #[error("could not resolve image URL: {0}")]
    ImageUrl(#[from] url::ParseError),
}
