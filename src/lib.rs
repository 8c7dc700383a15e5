// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Sign-In - EVM signature authentication service
//!
//! Issues random messages, verifies wallet signatures over them (EIP-191),
//! and hands out opaque session tokens stored on the user row.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Message issuance, signature recovery, login, sessions
//! - `client` - HTTP client performing the wallet sign-in
//! - `storage` - Embedded user database (redb)

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
