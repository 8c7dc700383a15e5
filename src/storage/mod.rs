// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent user storage in an embedded redb database under `DATA_DIR`.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users.redb      # users, address index, session index
//! ```

pub mod users;

pub use users::{address_key, UserDatabase, UserDbError, UserDbResult, UserRecord};
