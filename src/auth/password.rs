//! Password hashing: HMAC-SHA256 with the server salt, then Argon2 with a per-hash salt.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn peppered(password: &str, salt: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init: {}", e)))?;
    mac.update(password.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn hash_password(password: &str, salt: &str) -> AppResult<String> {
    let input = peppered(password, salt)?;
    let per_hash_salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(input.as_bytes(), &per_hash_salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
        .to_string();
    Ok(hash)
}

/// False for a wrong password and for a hash that cannot be parsed.
pub fn verify_password(password: &str, hash: &str, salt: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    let Ok(input) = peppered(password, salt) else {
        return false;
    };
    Argon2::default()
        .verify_password(input.as_bytes(), &parsed)
        .is_ok()
}
