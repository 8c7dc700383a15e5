// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Covers both the login exchange and bearer-session checks. The `Display`
/// text is what clients see in the `error` field.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Address, message or signature absent or empty
    #[error("Missing parameters")]
    MissingParameters,
    /// Request body is not valid JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    /// Claimed address is not a 20-byte hex address
    #[error("Invalid address")]
    InvalidAddress,
    /// Signature undecodable or signed by a different address
    #[error("Invalid signature")]
    InvalidSignature,
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingSession,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <session_id>')")]
    InvalidAuthHeader,
    /// Session token unknown or overwritten by a later login
    #[error("Invalid session")]
    InvalidSession,
    /// Reading the user row failed
    #[error("Database lookup failed")]
    DatabaseLookup,
    /// Inserting the user row failed
    #[error("Failed to create new user")]
    UserCreation,
    /// Writing the session token failed
    #[error("Session update error")]
    SessionUpdate,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingParameters => "missing_parameters",
            AuthError::MalformedBody(_) => "malformed_body",
            AuthError::InvalidAddress => "invalid_address",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::MissingSession => "missing_session",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidSession => "invalid_session",
            AuthError::DatabaseLookup => "database_lookup_failed",
            AuthError::UserCreation => "user_creation_failed",
            AuthError::SessionUpdate => "session_update_failed",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingParameters
            | AuthError::MalformedBody(_)
            | AuthError::InvalidAddress => StatusCode::BAD_REQUEST,
            AuthError::InvalidSignature
            | AuthError::MissingSession
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidSession => StatusCode::UNAUTHORIZED,
            AuthError::DatabaseLookup | AuthError::UserCreation | AuthError::SessionUpdate => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_parameters_returns_400() {
        let (status, body) = body_of(AuthError::MissingParameters).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing parameters");
        assert_eq!(body["error_code"], "missing_parameters");
    }

    #[tokio::test]
    async fn invalid_signature_returns_401() {
        let (status, body) = body_of(AuthError::InvalidSignature).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid signature");
    }

    #[tokio::test]
    async fn storage_failures_return_500() {
        for error in [
            AuthError::DatabaseLookup,
            AuthError::UserCreation,
            AuthError::SessionUpdate,
        ] {
            assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        let (_, body) = body_of(AuthError::SessionUpdate).await;
        assert_eq!(body["error"], "Session update error");
    }
}
