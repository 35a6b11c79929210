// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod sqlite_choice_repository;
pub mod sqlite_group_repository;
pub mod sqlite_question_repository;
pub mod sqlite_user_repository;

pub use sqlite_choice_repository::SqliteChoiceRepository;
pub use sqlite_group_repository::SqliteGroupRepository;
pub use sqlite_question_repository::SqliteQuestionRepository;
pub use sqlite_user_repository::SqliteUserRepository;

use crate::domain::repositories::RepositoryError;

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(db_err.message().to_string())
            }
            _ => RepositoryError::Database(err.to_string()),
        }
    }
}

/// Maps a value object rejecting stored data to a repository error
fn corrupt(column: &'static str) -> impl Fn(String) -> RepositoryError {
    move |reason| RepositoryError::Database(format!("invalid {} in database: {}", column, reason))
}
