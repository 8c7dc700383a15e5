// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The login exchange.
//!
//! 1. Recover the signer of `message` and compare it with the claimed address
//! 2. Look up the user by address, creating one on first sign-in
//! 3. Write a fresh session token to the user row and return it

use std::str::FromStr;

use alloy::primitives::Address;

use super::message::generate_session_id;
use super::signature::{addresses_match, recover_address};
use super::AuthError;
use crate::models::LoginRequest;
use crate::storage::{UserDatabase, UserDbError, UserRecord};

/// Validated login input.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub address: Address,
    pub message: String,
    pub signature: String,
    pub user_name: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = AuthError;

    fn try_from(request: LoginRequest) -> Result<Self, Self::Error> {
        let (Some(address), Some(message), Some(signature)) = (
            non_empty(request.metamask_address),
            request.message.filter(|m| !m.is_empty()),
            non_empty(request.signature),
        ) else {
            return Err(AuthError::MissingParameters);
        };

        let address = Address::from_str(address.trim()).map_err(|_| AuthError::InvalidAddress)?;

        Ok(Self {
            address,
            message,
            signature,
            user_name: non_empty(request.user_name).map(|n| n.trim().to_string()),
        })
    }
}

/// Blank counts as missing. Not used for `message`, which is signed verbatim.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: UserRecord,
    pub session_id: String,
    pub created: bool,
}

/// Verify the signature, then find-or-create the user and issue a session.
pub fn login(users: &UserDatabase, credentials: &LoginCredentials) -> Result<LoginOutcome, AuthError> {
    let signer = recover_address(&credentials.message, &credentials.signature).map_err(|e| {
        tracing::warn!(
            error = %e,
            claimed = %credentials.address,
            "Signature could not be recovered"
        );
        AuthError::InvalidSignature
    })?;

    if !addresses_match(&signer, &credentials.address) {
        tracing::warn!(
            recovered = %signer,
            claimed = %credentials.address,
            "Signature does not match claimed address"
        );
        return Err(AuthError::InvalidSignature);
    }

    let user_name = credentials.user_name.as_deref();
    let (user, created) = find_or_create_user(users, &credentials.address, user_name)?;

    let session_id = generate_session_id();
    let user = users
        .replace_session(&user.id, &session_id, user_name)
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user.id, "Session update failed");
            AuthError::SessionUpdate
        })?;

    tracing::info!(
        user_id = %user.id,
        address = %user.metamask_address,
        new_user = created,
        "User signed in"
    );

    Ok(LoginOutcome {
        user,
        session_id,
        created,
    })
}

fn find_or_create_user(
    users: &UserDatabase,
    address: &Address,
    user_name: Option<&str>,
) -> Result<(UserRecord, bool), AuthError> {
    let lookup_failed = |e: UserDbError| {
        tracing::error!(error = %e, address = %address, "User lookup failed");
        AuthError::DatabaseLookup
    };

    if let Some(user) = users.get_user_by_address(address).map_err(lookup_failed)? {
        return Ok((user, false));
    }

    create_or_reread_user(users, address, user_name)
}

/// Create the user, or return the record a concurrent login just created.
fn create_or_reread_user(
    users: &UserDatabase,
    address: &Address,
    user_name: Option<&str>,
) -> Result<(UserRecord, bool), AuthError> {
    match users.create_user(address, user_name) {
        Ok(user) => Ok((user, true)),
        Err(UserDbError::AlreadyExists(_)) => {
            tracing::debug!(address = %address, "User created by a concurrent login");
            let user = users.get_user_by_address(address).map_err(|e| {
                tracing::error!(error = %e, address = %address, "User lookup failed");
                AuthError::DatabaseLookup
            })?;
            user.map(|user| (user, false)).ok_or(AuthError::UserCreation)
        }
        Err(e) => {
            tracing::error!(error = %e, address = %address, "User creation failed");
            Err(AuthError::UserCreation)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const OTHER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn temp_db() -> (UserDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = UserDatabase::open(&dir.path().join("users.redb")).unwrap();
        (db, dir)
    }

    fn signed_request(key: &str, message: &str) -> LoginRequest {
        let signer = PrivateKeySigner::from_str(key).unwrap();
        let signature = signer.sign_message_sync(message.as_bytes()).unwrap();
        LoginRequest::new(
            signer.address().to_checksum(None),
            message,
            alloy::hex::encode_prefixed(signature.as_bytes()),
        )
    }

    fn credentials(request: LoginRequest) -> LoginCredentials {
        LoginCredentials::try_from(request).unwrap()
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut request = signed_request(TEST_KEY, "m");
        request.signature = None;
        assert!(matches!(
            LoginCredentials::try_from(request),
            Err(AuthError::MissingParameters)
        ));

        let mut request = signed_request(TEST_KEY, "m");
        request.metamask_address = Some("   ".to_string());
        assert!(matches!(
            LoginCredentials::try_from(request),
            Err(AuthError::MissingParameters)
        ));
    }

    #[test]
    fn malformed_address_is_rejected() {
        let mut request = signed_request(TEST_KEY, "m");
        request.metamask_address = Some("0x1234".to_string());
        assert!(matches!(
            LoginCredentials::try_from(request),
            Err(AuthError::InvalidAddress)
        ));
    }

    #[test]
    fn first_login_creates_user_and_session() {
        let (db, _dir) = temp_db();
        let request = signed_request(TEST_KEY, "nonce-1").with_user_name("alice");

        let outcome = login(&db, &credentials(request)).unwrap();
        assert!(outcome.created);
        assert_eq!(outcome.user.session_id.as_deref(), Some(outcome.session_id.as_str()));
        assert_eq!(outcome.user.display_name.as_deref(), Some("alice"));
        assert_eq!(
            outcome.user.metamask_address,
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );

        let stored = db.get_user_by_session(&outcome.session_id).unwrap().unwrap();
        assert_eq!(stored.id, outcome.user.id);
    }

    #[test]
    fn second_login_reuses_user_and_overwrites_session() {
        let (db, _dir) = temp_db();

        let first = login(&db, &credentials(signed_request(TEST_KEY, "nonce-1"))).unwrap();
        let second = login(&db, &credentials(signed_request(TEST_KEY, "nonce-2"))).unwrap();

        assert!(!second.created);
        assert_eq!(first.user.id, second.user.id);
        assert_ne!(first.session_id, second.session_id);
        assert!(db.get_user_by_session(&first.session_id).unwrap().is_none());
    }

    #[test]
    fn claimed_address_case_is_ignored() {
        let (db, _dir) = temp_db();
        let mut request = signed_request(TEST_KEY, "nonce");
        request.metamask_address = request.metamask_address.map(|a| a.to_lowercase());

        assert!(login(&db, &credentials(request)).is_ok());
    }

    #[test]
    fn signature_from_other_wallet_is_rejected() {
        let (db, _dir) = temp_db();
        let mut request = signed_request(OTHER_KEY, "nonce");
        request.metamask_address =
            Some("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".to_string());

        let result = login(&db, &credentials(request));
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
        assert!(db
            .get_user_by_address(
                &Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
            )
            .unwrap()
            .is_none());
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let (db, _dir) = temp_db();
        let mut request = signed_request(TEST_KEY, "nonce");
        request.signature = Some("0xdeadbeef".to_string());

        let result = login(&db, &credentials(request));
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn blank_message_is_signed_as_is() {
        let (db, _dir) = temp_db();
        let outcome = login(&db, &credentials(signed_request(TEST_KEY, "  "))).unwrap();
        assert!(outcome.created);

        let mut request = signed_request(TEST_KEY, "m");
        request.message = Some(String::new());
        assert!(matches!(
            LoginCredentials::try_from(request),
            Err(AuthError::MissingParameters)
        ));
    }

    #[test]
    fn existing_user_is_reread_when_creation_loses() {
        let (db, _dir) = temp_db();
        let address = PrivateKeySigner::from_str(TEST_KEY).unwrap().address();
        let winner = db.create_user(&address, Some("first")).unwrap();

        let (user, created) = create_or_reread_user(&db, &address, Some("second")).unwrap();
        assert!(!created);
        assert_eq!(user.id, winner.id);
        assert_eq!(user.display_name.as_deref(), Some("first"));
    }

    #[test]
    fn concurrent_first_logins_share_one_user() {
        let (db, _dir) = temp_db();
        let barrier = std::sync::Barrier::new(8);

        let outcomes: Vec<LoginOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let (db, barrier) = (&db, &barrier);
                    scope.spawn(move || {
                        let creds = credentials(signed_request(TEST_KEY, &format!("nonce-{i}")));
                        barrier.wait();
                        login(db, &creds).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let user_id = &outcomes[0].user.id;
        assert!(outcomes.iter().all(|o| &o.user.id == user_id));
        assert_eq!(outcomes.iter().filter(|o| o.created).count(), 1);
    }

    #[test]
    fn any_signed_message_is_accepted() {
        // Messages are not tracked server-side
        let (db, _dir) = temp_db();
        let request = signed_request(TEST_KEY, "not-issued-by-the-server");
        assert!(login(&db, &credentials(request)).is_ok());
    }
}
