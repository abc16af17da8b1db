//! Password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::debug;

/// Well-formed PHC hash with default Argon2 parameters that no password
/// matches. Verified against when a login names no known user so that both
/// rejection paths cost one full Argon2 run.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hash a password with Argon2 and a fresh random salt, returning a PHC string
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check `supplied` against a stored PHC hash.
///
/// A hash that cannot be parsed counts as a mismatch.
pub fn verify_password(hash: &str, supplied: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(%error, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(supplied.as_bytes(), &parsed)
        .is_ok()
}

/// Spend the same work as a real verification and discard the result.
pub fn verify_against_dummy(supplied: &str) {
    let _ = verify_password(DUMMY_HASH, supplied);
}
