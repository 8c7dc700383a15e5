// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::Path;
use std::sync::Arc;

use crate::storage::{UserDatabase, UserDbResult};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserDatabase>,
}

impl AppState {
    pub fn new(users: UserDatabase) -> Self {
        Self {
            users: Arc::new(users),
        }
    }

    /// Open the user database at `path` and wrap it in state.
    pub fn open(path: &Path) -> UserDbResult<Self> {
        Ok(Self::new(UserDatabase::open(path)?))
    }
}
