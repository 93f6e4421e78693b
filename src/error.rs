//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the error type every HTTP handler returns.
//! `AppError` implements `actix_web::error::ResponseError` so that failures are
//! rendered as JSON `{"error": ...}` bodies with the matching status code.
//!
//! Domain errors (`AuthError` from the session core, `StoreError` from the
//! persistence layer, `validator::ValidationErrors`) convert into `AppError`
//! through `From`, so handlers can use the `?` operator throughout. Server-side
//! failures keep their detail in `Display` for logging but are rendered to the
//! client with a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Malformed or invalid request (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The caller is authenticated but may not touch the resource (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Requested resource was not found (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Input validation failed (HTTP 422 Unprocessable Entity).
    #[error("Validation Error: {0}")]
    ValidationError(String),
    /// Unexpected server-side error (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    /// Error originating from the store (HTTP 500).
    #[error("Database Error: {0}")]
    DatabaseError(String),
    /// The identity provider failed or could not be reached (HTTP 502).
    #[error("Bad Gateway: {0}")]
    BadGateway(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
            // Server-side details stay in the logs.
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                log::error!("{}", self);
                "Internal error"
            }
            AppError::BadGateway(msg) => {
                log::error!("{}", self);
                msg.as_str()
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Maps the session core's taxonomy onto HTTP status categories: client errors
/// for bad state or credentials, server errors for provider and store failures.
impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::InvalidState => AppError::BadRequest("Invalid state parameter".into()),
            AuthError::ProviderUnavailable(_) => {
                AppError::BadGateway("Failed to exchange token".into())
            }
            AuthError::ProfileFetchFailed(_) => {
                AppError::BadGateway("Failed to get user info".into())
            }
            AuthError::InvalidRefreshToken => {
                AppError::Unauthorized("Invalid refresh token".into())
            }
            AuthError::Expired => AppError::Unauthorized("Token has expired".into()),
            AuthError::Unauthorized => {
                AppError::Unauthorized("Invalid or expired token".into())
            }
            AuthError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::DatabaseError(error.to_string())
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Forbidden("Not yours".into());
        assert_eq!(error.error_response().status(), 403);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::BadGateway("Provider down".into());
        assert_eq!(error.error_response().status(), 502);
    }

    #[test]
    fn test_auth_error_status_categories() {
        let cases = [
            (AuthError::InvalidState, 400),
            (AuthError::ProviderUnavailable("timeout".into()), 502),
            (AuthError::ProfileFetchFailed("500".into()), 502),
            (AuthError::InvalidRefreshToken, 401),
            (AuthError::Expired, 401),
            (AuthError::Unauthorized, 401),
            (AuthError::Internal("db".into()), 500),
        ];

        for (auth_error, expected) in cases {
            let app_error: AppError = auth_error.into();
            assert_eq!(app_error.error_response().status().as_u16(), expected);
        }
    }

    #[actix_rt::test]
    async fn test_server_errors_hide_details() {
        let error = AppError::DatabaseError("connection refused on 10.0.0.3".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal error");
    }
}
