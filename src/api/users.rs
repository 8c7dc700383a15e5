// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::Json;

use crate::{auth::SessionAuth, models::UserProfile};

/// Get the profile of the user holding the session.
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("session" = [])),
    responses(
        (status = 200, description = "User information", body = UserProfile),
        (status = 401, description = "Missing, malformed or replaced session token"),
    )
)]
pub async fn get_current_user(SessionAuth(user): SessionAuth) -> Json<UserProfile> {
    Json(user.into())
}
