use async_trait::async_trait;

use super::{Page, PageRequest, RepositoryResult};
use crate::domain::user::{NewUser, User, UserChanges};

/// Repository trait for users and their group memberships
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken username is a `Conflict`
    async fn create(&self, user: &NewUser) -> RepositoryResult<User>;

    /// Find a user by ID, without group memberships
    ///
    /// Used on every authenticated request, so it is a single query.
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;

    /// Find a user by ID, with group memberships
    async fn find_with_groups(&self, id: i64) -> RepositoryResult<Option<User>>;

    /// Find a user by username, without group memberships
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;

    /// One page of users, most recently joined first
    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<User>>;

    /// Apply changes to a user; `groups` replaces the whole membership set
    async fn update(&self, id: i64, changes: &UserChanges) -> RepositoryResult<User>;

    /// Delete a user by ID
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
