//! # Stored Credentials
//!
//! Passwords are stored as argon2 PHC strings (`$argon2id$v=19$...`).
//!
//! Accounts imported from the browser store carry their password in plain
//! text. Those still verify, reported as [`CredentialCheck::ValidLegacy`]
//! so the caller can re-hash on the spot.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{DbError, DbResult};

/// PHC prefix of every hash this module produces.
const PHC_PREFIX: &str = "$argon2";

/// Outcome of checking a password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialCheck {
    Valid,
    /// Matched a plaintext credential; it should be re-hashed.
    ValidLegacy,
    Invalid,
}

impl CredentialCheck {
    pub fn is_valid(&self) -> bool {
        !matches!(self, CredentialCheck::Invalid)
    }
}

/// Hashes a password for storage.
pub fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Credential(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// True if the stored value is a hash rather than legacy plaintext.
pub fn is_hashed(stored: &str) -> bool {
    stored.starts_with(PHC_PREFIX)
}

/// Checks a password against a stored credential.
pub fn verify_password(password: &str, stored: &str) -> CredentialCheck {
    if !is_hashed(stored) {
        return if stored == password {
            CredentialCheck::ValidLegacy
        } else {
            CredentialCheck::Invalid
        };
    }

    let parsed = match PasswordHash::new(stored) {
        Ok(h) => h,
        Err(_) => return CredentialCheck::Invalid,
    };

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
    {
        CredentialCheck::Valid
    } else {
        CredentialCheck::Invalid
    }
}
