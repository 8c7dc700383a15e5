// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded user database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized UserRecord
//! - `address_user_map`: lowercase `0x` address → user_id
//! - `session_user_map`: session_id → user_id
//!
//! A user holds at most one session. Writing a new session removes the
//! previous session mapping in the same transaction, so an overwritten token
//! stops resolving immediately.

use std::path::Path;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: user_id → serialized UserRecord (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: lowercase address → user_id.
const ADDRESS_USER_MAP: TableDefinition<&str, &str> = TableDefinition::new("address_user_map");

/// Session index: session_id → user_id.
const SESSION_USER_MAP: TableDefinition<&str, &str> = TableDefinition::new("session_user_map");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum UserDbError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),
}

pub type UserDbResult<T> = Result<T, UserDbError>;

// =============================================================================
// Records
// =============================================================================

/// A user row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Wallet address in EIP-55 checksummed form
    pub metamask_address: String,
    /// Contact email, never set by the sign-in flow
    pub email: Option<String>,
    /// When the user first signed in
    pub signup_timestamp: DateTime<Utc>,
    /// Current session token (overwritten on every login)
    pub session_id: Option<String>,
    /// Display name supplied by the client at login
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserRecord {
    /// New user with no session and no email.
    pub fn new(address: &Address, display_name: Option<&str>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metamask_address: address.to_checksum(None),
            email: None,
            signup_timestamp: Utc::now(),
            session_id: None,
            display_name: display_name.map(str::to_string),
        }
    }
}

/// Index key for an address: `0x` + 40 lowercase hex characters.
pub fn address_key(address: &Address) -> String {
    alloy::hex::encode_prefixed(address.as_slice())
}

// =============================================================================
// UserDatabase
// =============================================================================

/// Embedded ACID user database.
pub struct UserDatabase {
    db: Database,
}

impl UserDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> UserDbResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(ADDRESS_USER_MAP)?;
            let _ = write_txn.open_table(SESSION_USER_MAP)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Verify the database can serve a read transaction.
    pub fn health_check(&self) -> UserDbResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }

    /// Look up a user by ID.
    pub fn get_user(&self, user_id: &str) -> UserDbResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        let user = match table.get(user_id)? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };
        Ok(user)
    }

    /// Look up a user by wallet address (case-insensitive).
    pub fn get_user_by_address(&self, address: &Address) -> UserDbResult<Option<UserRecord>> {
        let key = address_key(address);
        let read_txn = self.db.begin_read()?;
        let addr_table = read_txn.open_table(ADDRESS_USER_MAP)?;
        let users = read_txn.open_table(USERS)?;

        let Some(user_id) = addr_table.get(key.as_str())?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };

        let user = match users.get(user_id.as_str())? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => {
                return Err(UserDbError::NotFound(format!(
                    "User {user_id} indexed for {key}"
                )))
            }
        };
        Ok(Some(user))
    }

    /// Look up the user currently holding a session token.
    pub fn get_user_by_session(&self, session_id: &str) -> UserDbResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let sessions = read_txn.open_table(SESSION_USER_MAP)?;
        let users = read_txn.open_table(USERS)?;

        let Some(user_id) = sessions.get(session_id)?.map(|v| v.value().to_string()) else {
            return Ok(None);
        };

        let user: Option<UserRecord> = match users.get(user_id.as_str())? {
            Some(value) => Some(serde_json::from_slice(value.value())?),
            None => None,
        };

        // Guard against a stale index entry
        Ok(user.filter(|u| u.session_id.as_deref() == Some(session_id)))
    }

    /// Create a user for an address.
    ///
    /// Returns `AlreadyExists` if the address is already registered.
    pub fn create_user(
        &self,
        address: &Address,
        display_name: Option<&str>,
    ) -> UserDbResult<UserRecord> {
        let key = address_key(address);
        let user = UserRecord::new(address, display_name);
        let json = serde_json::to_vec(&user)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut addr_table = write_txn.open_table(ADDRESS_USER_MAP)?;
            if addr_table.get(key.as_str())?.is_some() {
                return Err(UserDbError::AlreadyExists(format!("User for {key}")));
            }
            addr_table.insert(key.as_str(), user.id.as_str())?;

            let mut users = write_txn.open_table(USERS)?;
            users.insert(user.id.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(user)
    }

    /// Replace the user's session token.
    ///
    /// Drops the previous session mapping, records the new one and, when a
    /// non-empty `display_name` is given, stores it on the row.
    pub fn replace_session(
        &self,
        user_id: &str,
        session_id: &str,
        display_name: Option<&str>,
    ) -> UserDbResult<UserRecord> {
        let write_txn = self.db.begin_write()?;
        let user = {
            let mut users = write_txn.open_table(USERS)?;
            let existing = users
                .get(user_id)?
                .map(|v| v.value().to_vec())
                .ok_or_else(|| UserDbError::NotFound(format!("User {user_id}")))?;
            let mut user: UserRecord = serde_json::from_slice(&existing)?;

            let mut sessions = write_txn.open_table(SESSION_USER_MAP)?;
            if let Some(previous) = user.session_id.take() {
                sessions.remove(previous.as_str())?;
            }
            sessions.insert(session_id, user_id)?;

            user.session_id = Some(session_id.to_string());
            if let Some(name) = display_name.filter(|n| !n.trim().is_empty()) {
                user.display_name = Some(name.trim().to_string());
            }

            let json = serde_json::to_vec(&user)?;
            users.insert(user_id, json.as_slice())?;
            user
        };
        write_txn.commit()?;

        Ok(user)
    }
}

// =============================================================================
// Tests
// =============================================================================
