// Password hashing utilities
// Uses bcrypt for secure password hashing

use bcrypt::{hash, verify, DEFAULT_COST};

use super::AuthError;
use crate::domain::user::user::UNUSABLE_PASSWORD_PREFIX;

/// Hashes a password using bcrypt
///
/// # Example
/// ```
/// use polls_api::auth::password::hash_password;
///
/// let hash = hash_password("my_password").expect("valid hash");
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Hash stored for accounts created without a password
///
/// Never verifies against any input.
pub fn unusable_password() -> String {
    UNUSABLE_PASSWORD_PREFIX.to_string()
}

/// Verifies a password against a stored hash
///
/// Unusable hashes always yield `Ok(false)`.
///
/// # Example
/// ```
/// use polls_api::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("my_password").unwrap();
/// assert!(verify_password("my_password", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return Ok(false);
    }
    Ok(verify(password, hash)?)
}
