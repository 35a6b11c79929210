use chrono::{DateTime, Utc};

use super::value_objects::{Email, Username};

/// Prefix marking a password hash that can never match
///
/// Users created without a password get this instead of a bcrypt hash.
pub const UNUSABLE_PASSWORD_PREFIX: &str = "!";

/// User data for persistence
///
/// Simple struct for user CRUD operations. `groups` holds the IDs of the
/// groups the user belongs to, in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: Username,
    pub email: Option<Email>,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub groups: Vec<i64>,
}

impl User {
    /// Whether the stored hash can ever verify a password
    pub fn has_usable_password(&self) -> bool {
        !self.password_hash.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }
}

/// Data for a user that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: Username,
    pub email: Option<Email>,
    /// Already hashed; see [`UNUSABLE_PASSWORD_PREFIX`]
    pub password_hash: String,
    pub groups: Vec<i64>,
}

/// Fields to overwrite on an existing user
///
/// `email: Some(None)` clears the address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<Username>,
    pub email: Option<Option<Email>>,
    pub password_hash: Option<String>,
    pub groups: Option<Vec<i64>>,
}
