use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::domain::error::{DomainError, FieldErrors};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("Authentication credentials were not provided.")]
    Unauthorized,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<FieldErrors>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fields: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Domain(err) => match err {
                DomainError::Validation(fields) => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: "validation failed".to_string(),
                        fields: Some(fields),
                    },
                ),
                DomainError::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::message(AppError::Unauthorized.to_string()),
                ),
                DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, ErrorBody::message(err.to_string()))
                }
                DomainError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string()))
                }
                DomainError::AlreadyExists(_) | DomainError::Conflict(_) => {
                    (StatusCode::CONFLICT, ErrorBody::message(err.to_string()))
                }
                DomainError::Unexpected(detail) => {
                    error!(error = %detail, "request failed with unexpected error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ErrorBody::message("internal error"),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::message(msg)),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::message(AppError::Unauthorized.to_string()),
            ),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
        }
        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{StatusCode, header},
        response::IntoResponse,
    };

    use super::AppError;
    use crate::domain::error::DomainError;

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::validation("title", "bad"), StatusCode::BAD_REQUEST),
            (DomainError::NotFound("book".to_string()), StatusCode::NOT_FOUND),
            (DomainError::AlreadyExists("author".to_string()), StatusCode::CONFLICT),
            (DomainError::Conflict("author".to_string()), StatusCode::CONFLICT),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                DomainError::Unexpected("db down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn unauthorized_responses_carry_token_challenge() {
        for err in [
            AppError::Unauthorized,
            AppError::Domain(DomainError::Unauthenticated),
            AppError::Domain(DomainError::InvalidCredentials),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                response
                    .headers()
                    .get(header::WWW_AUTHENTICATE)
                    .and_then(|value| value.to_str().ok()),
                Some("Token")
            );
        }
    }
}
