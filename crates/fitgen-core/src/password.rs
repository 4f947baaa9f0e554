//! Salted password hashing for stored credentials.
//!
//! Stored format: `<salt_hex>$<mac_hex>` where the MAC is HMAC-SHA256 of the
//! password keyed by a random 16-byte salt.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Errors from hashing or verifying a password.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("malformed password hash: {0}")]
    InvalidFormat(String),

    #[error("invalid HMAC key: {0}")]
    InvalidKey(String),
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    let mac = compute_mac(&salt, password.as_bytes())?;
    Ok(format!("{}${}", hex::encode(salt), hex::encode(mac)))
}

/// Check `password` against a stored hash using a constant-time comparison.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored value is
/// not in the expected format.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let (salt_hex, mac_hex) = stored
        .split_once('$')
        .ok_or_else(|| PasswordError::InvalidFormat("missing '$' separator".to_string()))?;
    let salt = hex::decode(salt_hex)
        .map_err(|e| PasswordError::InvalidFormat(format!("invalid salt hex: {e}")))?;
    let expected = hex::decode(mac_hex)
        .map_err(|e| PasswordError::InvalidFormat(format!("invalid digest hex: {e}")))?;

    let mut mac = <HmacSha256 as Mac>::new_from_slice(&salt)
        .map_err(|e| PasswordError::InvalidKey(e.to_string()))?;
    mac.update(password.as_bytes());
    Ok(mac.verify_slice(&expected).is_ok())
}

fn compute_mac(key: &[u8], message: &[u8]) -> Result<Vec<u8>, PasswordError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| PasswordError::InvalidKey(e.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
