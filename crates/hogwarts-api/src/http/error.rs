//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use hogwarts_types::error::{AuthError, CharacterError, RelayError, UserError};

#[derive(Debug)]
pub enum AppError {
    Relay(RelayError),
    User(UserError),
    Character(CharacterError),
    Auth(AuthError),
    /// Request body or parameters could not be understood.
    Validation(String),
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        AppError::Relay(e)
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        AppError::User(e)
    }
}

impl From<CharacterError> for AppError {
    fn from(e: CharacterError) -> Self {
        AppError::Character(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Relay(RelayError::Validation(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Relay(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),

            AppError::User(UserError::InvalidInput(msg)) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::User(e @ UserError::UsernameTaken(_)) => (StatusCode::CONFLICT, e.to_string()),
            AppError::User(e @ UserError::InvalidCredentials) => {
                (StatusCode::UNAUTHORIZED, e.to_string())
            }
            AppError::User(e @ UserError::NotFound) => (StatusCode::NOT_FOUND, e.to_string()),
            AppError::User(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),

            AppError::Character(e @ CharacterError::NotFound) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            AppError::Character(CharacterError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Character(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),

            AppError::Auth(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Relay(RelayError::Validation("x".into())), StatusCode::BAD_REQUEST),
            (
                AppError::Relay(RelayError::UpstreamStatus {
                    status: 503,
                    body: String::new(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::User(UserError::UsernameTaken("a".into())), StatusCode::CONFLICT),
            (AppError::User(UserError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (AppError::Character(CharacterError::NotFound), StatusCode::NOT_FOUND),
            (AppError::Auth(AuthError::Expired), StatusCode::UNAUTHORIZED),
        ];
        for (error, expected) in cases {
            assert_eq!(error.status_and_message().0, expected);
        }
    }
}
