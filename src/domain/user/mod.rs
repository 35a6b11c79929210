// User domain module
// Accounts and the groups they belong to

#![allow(clippy::module_inception)]

pub mod group;
pub mod user;
pub mod value_objects;

// Re-export main types for convenience
pub use group::{Group, NewGroup};
pub use user::{NewUser, User, UserChanges};
pub use value_objects::{Email, GroupName, Username};
