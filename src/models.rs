// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies shared by the HTTP handlers and the
//! `AuthClient`. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for JSON handling and OpenAPI documentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::UserRecord;

// =============================================================================
// Sign-in Models
// =============================================================================

/// Message the wallet is asked to sign.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    /// Random opaque token (UUID v4).
    pub message: String,
}

/// Login request.
///
/// Fields are optional on the wire so that a missing field yields the
/// `Missing parameters` error instead of a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Address the client claims to control (`0x` + 40 hex, any case).
    #[serde(default)]
    pub metamask_address: Option<String>,
    /// The message that was signed.
    #[serde(default)]
    pub message: Option<String>,
    /// 65-byte `r || s || v` signature, hex encoded.
    #[serde(default)]
    pub signature: Option<String>,
    /// Optional display name chosen by the user.
    #[serde(default, rename = "userName", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl LoginRequest {
    pub fn new(
        metamask_address: impl Into<String>,
        message: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            metamask_address: Some(metamask_address.into()),
            message: Some(message.into()),
            signature: Some(signature.into()),
            user_name: None,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    /// Opaque session token; send as `Authorization: Bearer <session_id>`.
    pub session_id: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of a user (never includes the session token).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub metamask_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub signup_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl From<UserRecord> for UserProfile {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            metamask_address: user.metamask_address,
            email: user.email,
            signup_timestamp: user.signup_timestamp,
            display_name: user.display_name,
        }
    }
}
