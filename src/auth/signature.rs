// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-191 signature recovery.
//!
//! Wallets sign login messages with `personal_sign`, which hashes:
//!
//! ```text
//! keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)
//! ```
//!
//! The 65-byte signature is `r || s || v`. The signer's address is the last
//! 20 bytes of the keccak256 hash of the recovered uncompressed public key
//! (without the `0x04` prefix).

use alloy::primitives::{eip191_hash_message, keccak256, Address};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// Length of an `r || s || v` signature in bytes.
pub const SIGNATURE_LENGTH: usize = 65;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is not valid hex: {0}")]
    InvalidHex(String),

    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("signature recovery failed: {0}")]
    Ecdsa(#[from] k256::ecdsa::Error),
}

/// Recover the address that signed `message` (EIP-191 personal message).
pub fn recover_address(message: &str, signature: &str) -> Result<Address, SignatureError> {
    let bytes = alloy::hex::decode(signature.trim())
        .map_err(|e| SignatureError::InvalidHex(e.to_string()))?;

    if bytes.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength(bytes.len()));
    }

    let (rs, v) = bytes.split_at(64);
    let mut signature = Signature::from_slice(rs)?;
    let mut recovery_id = parse_recovery_id(v[0])?;

    // k256 only accepts low-s; flipping s also flips the y parity
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let digest = eip191_hash_message(message);
    let verifying_key =
        VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)?;

    Ok(address_from_verifying_key(&verifying_key))
}

/// Case-insensitive address comparison.
///
/// Parsed addresses are raw bytes, so equality already ignores hex case.
pub fn addresses_match(recovered: &Address, claimed: &Address) -> bool {
    recovered == claimed
}

/// Derive the Ethereum address of a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Accepts `27/28` (wallet form) and `0/1` (raw parity).
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let parity = match v {
        0 | 1 => v,
        27 | 28 => v - 27,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(parity).ok_or(SignatureError::InvalidRecoveryId(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;
    use alloy::signers::{local::PrivateKeySigner, SignerSync};
    use std::str::FromStr;

    // Well-known development key (Hardhat/Anvil account #0)
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn signer() -> PrivateKeySigner {
        PrivateKeySigner::from_str(TEST_KEY).unwrap()
    }

    fn sign(message: &str) -> [u8; 65] {
        signer().sign_message_sync(message.as_bytes()).unwrap().as_bytes()
    }

    #[test]
    fn test_key_matches_known_address() {
        assert_eq!(signer().address(), Address::from_str(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn recovers_wallet_signature() {
        let message = "6b1f3a52-8f0e-4c1b-9d0a-3f8e2b7c4d51";
        let signature = alloy::hex::encode_prefixed(sign(message));

        let recovered = recover_address(message, &signature).unwrap();
        assert_eq!(recovered, Address::from_str(TEST_ADDRESS).unwrap());
    }

    #[test]
    fn accepts_signature_without_prefix() {
        let message = "hello";
        let signature = alloy::hex::encode(sign(message));

        let recovered = recover_address(message, &signature).unwrap();
        assert_eq!(recovered, signer().address());
    }

    #[test]
    fn accepts_raw_parity_recovery_id() {
        let message = "hello";
        let mut bytes = sign(message);
        bytes[64] -= 27;

        let recovered = recover_address(message, &alloy::hex::encode(bytes)).unwrap();
        assert_eq!(recovered, signer().address());
    }

    #[test]
    fn different_message_recovers_different_address() {
        let signature = alloy::hex::encode(sign("original"));

        if let Ok(recovered) = recover_address("tampered", &signature) {
            assert_ne!(recovered, signer().address());
        }
    }

    #[test]
    fn high_s_signature_recovers_signer() {
        // secp256k1 group order
        let n = U256::from_str_radix(
            "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141",
            16,
        )
        .unwrap();

        let mut bytes = sign("hello");
        let s = U256::from_be_slice(&bytes[32..64]);
        bytes[32..64].copy_from_slice(&(n - s).to_be_bytes::<32>());
        bytes[64] = if bytes[64] == 27 { 28 } else { 27 };

        let high_s = Signature::from_slice(&bytes[..64]).unwrap();
        assert!(high_s.normalize_s().is_some());

        let recovered = recover_address("hello", &alloy::hex::encode(bytes)).unwrap();
        assert_eq!(recovered, signer().address());
    }

    #[test]
    fn rejects_bad_hex() {
        let result = recover_address("hello", "0xnothex");
        assert!(matches!(result, Err(SignatureError::InvalidHex(_))));
    }

    #[test]
    fn rejects_wrong_length() {
        let result = recover_address("hello", "0xdeadbeef");
        assert!(matches!(result, Err(SignatureError::InvalidLength(4))));
    }

    #[test]
    fn rejects_unknown_recovery_id() {
        let mut bytes = sign("hello");
        bytes[64] = 5;

        let result = recover_address("hello", &alloy::hex::encode(bytes));
        assert!(matches!(result, Err(SignatureError::InvalidRecoveryId(5))));
    }

    #[test]
    fn addresses_match_ignores_case() {
        let checksummed = Address::from_str(TEST_ADDRESS).unwrap();
        let lower = Address::from_str(&TEST_ADDRESS.to_lowercase()).unwrap();
        assert!(addresses_match(&checksummed, &lower));
        assert!(!addresses_match(&checksummed, &Address::ZERO));
    }
}
