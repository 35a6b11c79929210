use async_trait::async_trait;

use super::{Page, PageRequest, RepositoryResult};
use crate::domain::poll::{NewQuestion, Question, QuestionChanges, QuestionPatch};

/// Repository trait for the Question aggregate
///
/// Every method that returns a [`Question`] returns it with its choices
/// loaded. Implementations must load choices for a whole set of questions in
/// one query rather than one query per question.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a new question
    async fn create(&self, question: &NewQuestion) -> RepositoryResult<Question>;

    /// Find a question by its ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Question>>;

    /// Whether a question with this ID exists
    async fn exists(&self, id: i64) -> RepositoryResult<bool>;

    /// One page of questions ordered by ID
    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Question>>;

    /// Apply changes to a single question
    async fn update(&self, id: i64, changes: &QuestionChanges) -> RepositoryResult<Question>;

    /// Apply every patch in order as one all-or-nothing unit
    ///
    /// Returns one question per patch, in patch order. Fails with
    /// `NotFound` for the first patch whose target does not exist, in which
    /// case nothing is changed.
    async fn bulk_update(&self, patches: &[QuestionPatch]) -> RepositoryResult<Vec<Question>>;

    /// Delete a question and its choices
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}
