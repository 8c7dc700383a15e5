// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    auth::{generate_message, login as run_login, AuthError, LoginCredentials},
    models::{LoginRequest, LoginResponse, MessageResponse},
    state::AppState,
};

/// Get a message for the wallet to sign.
///
/// Every call returns a new random message. The server keeps no record of it.
#[utoipa::path(
    get,
    path = "/auth/message",
    tag = "Auth",
    responses(
        (status = 200, description = "Message to sign", body = MessageResponse)
    )
)]
pub async fn get_message() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: generate_message(),
    })
}

/// Sign in with a wallet signature.
///
/// Recovers the signer of `message`, checks it against `metamask_address`,
/// creates the user on first sign-in and returns a fresh session id. The
/// previous session of the user stops working.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Missing parameters or malformed address"),
        (status = 401, description = "Invalid signature"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(request) = payload.map_err(|e| AuthError::MalformedBody(e.body_text()))?;
    let credentials = LoginCredentials::try_from(request)?;

    let outcome = run_login(&state.users, &credentials)?;

    Ok(Json(LoginResponse {
        session_id: outcome.session_id,
    }))
}
