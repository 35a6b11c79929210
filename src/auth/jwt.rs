// JWT token creation and verification
// Handles authentication tokens with 8-hour expiry

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Lifetime of an issued token
pub const TOKEN_TTL_HOURS: i64 = 8;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (decimal user ID; JWT subjects are strings)
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    /// Expiry timestamp (seconds since epoch)
    pub exp: usize,
}

impl Claims {
    /// The user ID carried in `sub`, if it is one
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Creates a JWT token for a user
///
/// # Token Properties
/// - Expires after 8 hours
/// - Signed with HS256 algorithm
/// - Contains the user ID in the 'sub' claim
///
/// # Example
/// ```
/// use polls_api::auth::jwt::create_token;
///
/// let token = create_token(42, "your-secret-key").expect("valid token");
/// assert!(!token.is_empty());
/// ```
pub fn create_token(user_id: i64, secret: &str) -> Result<String, AuthError> {
    let expiry = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

/// Verifies and decodes a JWT token
///
/// Fails on a bad signature, a malformed token or an expired one.
///
/// # Example
/// ```
/// use polls_api::auth::jwt::{create_token, verify_token};
///
/// let token = create_token(7, "your-secret-key").unwrap();
/// let claims = verify_token(&token, "your-secret-key").expect("valid token");
/// assert_eq!(claims.user_id(), Some(7));
/// ```
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::InvalidToken(e.to_string()))
}
