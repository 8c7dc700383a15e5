// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet sign-in for the API.
//!
//! ## Auth Flow
//!
//! 1. Client calls `GET /auth/message` and receives a random message
//! 2. The wallet signs it (`personal_sign`, EIP-191)
//! 3. Client posts `{metamask_address, message, signature}` to `/auth/login`
//! 4. Server:
//!    - Recovers the signer from the signature
//!    - Compares it with the claimed address (case-insensitive)
//!    - Looks up or creates the user keyed by address
//!    - Writes a new session id to the user row and returns it
//! 5. Client sends `Authorization: Bearer <session_id>` afterwards
//!
//! ## Limits
//!
//! - Messages are not stored; any signed message is accepted
//! - One session per user, replaced on each login, no expiry

pub mod error;
pub mod extractor;
pub mod login;
pub mod message;
pub mod signature;

pub use error::AuthError;
pub use extractor::SessionAuth;
pub use login::{login, LoginCredentials, LoginOutcome};
pub use message::{generate_message, generate_session_id};
pub use signature::{addresses_match, recover_address, SignatureError};
