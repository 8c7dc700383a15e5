// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for session-authenticated users.
//!
//! Use the `SessionAuth` extractor in handlers to require a session:
//!
//! ```rust,ignore
//! async fn my_handler(SessionAuth(user): SessionAuth) -> impl IntoResponse {
//!     // user is UserRecord
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AuthError;
use crate::state::AppState;
use crate::storage::UserRecord;

/// Extractor for the user holding the bearer session token.
///
/// Sessions never expire; a token stops working only when the same user
/// logs in again.
pub struct SessionAuth(pub UserRecord);

impl FromRequestParts<AppState> for SessionAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_id = bearer_token(parts)?;

        let user = state
            .users
            .get_user_by_session(session_id)
            .map_err(|e| {
                tracing::error!(error = %e, "Session lookup failed");
                AuthError::DatabaseLookup
            })?
            .ok_or(AuthError::InvalidSession)?;

        Ok(SessionAuth(user))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingSession)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}
