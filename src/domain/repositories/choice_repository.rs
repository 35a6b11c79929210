use async_trait::async_trait;

use super::{Page, PageRequest, RepositoryResult};
use crate::domain::poll::{Choice, ChoiceChanges, NewChoice};

/// Repository trait for choices addressed on their own
#[async_trait]
pub trait ChoiceRepository: Send + Sync {
    /// Insert a new choice
    async fn create(&self, choice: &NewChoice) -> RepositoryResult<Choice>;

    /// Find a choice by its ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Choice>>;

    /// One page of choices ordered by ID
    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Choice>>;

    /// Apply changes to a choice
    async fn update(&self, id: i64, changes: &ChoiceChanges) -> RepositoryResult<Choice>;

    /// Delete a choice by ID
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
