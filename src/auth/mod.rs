// Authentication primitives
// Password hashing and bearer token handling, independent of HTTP

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Errors raised while hashing passwords or handling tokens
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("token creation failed: {0}")]
    TokenCreation(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}
