use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

/// Error surfaced by every handler in the API.
///
/// `Internal` carries a detail string for the logs only; clients always get a
/// generic message for it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(ValidationErrors),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Internal(format!("{}: {}", context, err))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) | Self::Conflict(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::InvalidPayload(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid request payload", "errors": errors })),
            )
                .into_response(),
            Self::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            Self::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": message }))).into_response()
            }
            Self::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            Self::Internal(detail) => {
                tracing::error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Sorry an error occurred" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        tracing::warn!("Failed to validate payload: {errors}");
        Self::InvalidPayload(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_kind_to_its_status() {
        let cases = [
            (Error::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (Error::Conflict("taken".into()), StatusCode::BAD_REQUEST),
            (Error::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (Error::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (Error::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                Error::Internal("db down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
