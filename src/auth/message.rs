// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-in message generation.
//!
//! The message is a random UUID the wallet signs to prove address ownership.
//! It is not stored, so the login step accepts any signed message.

use uuid::Uuid;

/// Generate a fresh message for the wallet to sign.
pub fn generate_message() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a fresh opaque session token.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
