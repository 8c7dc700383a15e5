// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the sign-in API.
//!
//! Plays the part of the browser wallet connector: fetch a message, have the
//! wallet sign it, exchange the signature for a session id.

use alloy::primitives::Address;
use alloy::signers::Signer;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::models::{LoginRequest, LoginResponse, MessageResponse, UserProfile};

/// Default server location used by the wallet connector.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("wallet signing failed: {0}")]
    Signing(#[from] alloy::signers::Error),

    #[error("server rejected request ({status}): {error}")]
    Rejected { status: StatusCode, error: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Session obtained by [`AuthClient::sign_in`].
#[derive(Debug, Clone)]
pub struct SignedInSession {
    pub address: Address,
    pub message: String,
    pub session_id: String,
}

/// Client for the sign-in endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// `GET /auth/message`
    pub async fn fetch_message(&self) -> Result<String, ClientError> {
        let response = self.http.get(self.endpoint("/auth/message")?).send().await?;
        let body: MessageResponse = read_json(response).await?;
        Ok(body.message)
    }

    /// `POST /auth/login`
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.endpoint("/auth/login")?)
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    /// `GET /users/me`
    pub async fn current_user(&self, session_id: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .get(self.endpoint("/users/me")?)
            .bearer_auth(session_id)
            .send()
            .await?;
        read_json(response).await
    }

    /// Full sign-in: fetch a message, sign it with `signer`, log in.
    pub async fn sign_in<S>(
        &self,
        signer: &S,
        user_name: Option<&str>,
    ) -> Result<SignedInSession, ClientError>
    where
        S: Signer + Sync,
    {
        let message = self.fetch_message().await?;
        let address = signer.address();
        let signature = signer.sign_message(message.as_bytes()).await?;

        let mut request = LoginRequest::new(
            address.to_checksum(None),
            message.clone(),
            alloy::hex::encode_prefixed(signature.as_bytes()),
        );
        if let Some(name) = user_name {
            request = request.with_user_name(name);
        }

        let LoginResponse { session_id } = self.login(&request).await?;
        tracing::debug!(address = %address, "Signed in");

        Ok(SignedInSession {
            address,
            message,
            session_id,
        })
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let error = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.error)
        .unwrap_or(text);
    Err(ClientError::Rejected { status, error })
}

/// Shorten an address for display: `0x1234...abcd`.
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
