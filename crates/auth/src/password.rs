use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

use crate::error::{AuthError, Result};

// Argon2id v19 with the crate's recommended cost parameters
fn hasher() -> Argon2<'static> {
    Argon2::default()
}

/// Hash a password into a PHC string carrying its own random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| AuthError::HashingError(e.to_string()))
}

/// Check a password against a stored PHC digest
///
/// A wrong password is `Ok(false)`. A digest that cannot be parsed is
/// `MalformedDigest`; any other verifier failure is a hashing error.
pub fn verify_password(password: &str, digest: &str) -> Result<bool> {
    let parsed = PasswordHash::new(digest).map_err(|_| AuthError::MalformedDigest)?;

    match hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::HashingError(e.to_string())),
    }
}
