use async_trait::async_trait;

use super::{Page, PageRequest, RepositoryResult};
use crate::domain::user::{Group, GroupName, NewGroup};

/// Repository trait for groups
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Create a new group; a taken name is a `Conflict`
    async fn create(&self, group: &NewGroup) -> RepositoryResult<Group>;

    /// Find a group by ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Group>>;

    /// One page of groups ordered by ID
    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Group>>;

    /// Rename a group
    async fn rename(&self, id: i64, name: &GroupName) -> RepositoryResult<Group>;

    /// Delete a group by ID
    async fn delete(&self, id: i64) -> RepositoryResult<()>;

    /// The subset of `ids` that do not name an existing group
    async fn missing_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<i64>>;
}
