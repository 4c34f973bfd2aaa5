//! PIN validation and hashing.
//!
//! PINs never reach the store in plain text. The stored form is
//! `hex(sha256(account_id ":" pin))`, salted by the account id so equal PINs
//! on different accounts hash differently.

use crate::error::{AuthError, AuthResult};
use paybank_core::AccountId;
use sha2::{Digest, Sha256};

pub const MIN_PIN_LEN: usize = 4;
pub const MAX_PIN_LEN: usize = 8;

/// Check PIN shape: 4 to 8 ASCII digits
pub fn validate_pin(pin: &str) -> AuthResult<()> {
    if !(MIN_PIN_LEN..=MAX_PIN_LEN).contains(&pin.len()) {
        return Err(AuthError::InvalidPin(format!(
            "must be {MIN_PIN_LEN} to {MAX_PIN_LEN} digits"
        )));
    }
    if !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AuthError::InvalidPin("must contain digits only".to_string()));
    }
    Ok(())
}

pub fn hash_pin(account_id: AccountId, pin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(pin.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_pin(account_id: AccountId, pin: &str, stored_hash: &str) -> bool {
    hash_pin(account_id, pin) == stored_hash
}
