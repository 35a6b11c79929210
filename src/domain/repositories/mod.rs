// Repository ports
// Implemented by the infrastructure layer; handlers only see these traits

pub mod choice_repository;
pub mod group_repository;
pub mod question_repository;
pub mod user_repository;

pub use choice_repository::ChoiceRepository;
pub use group_repository::GroupRepository;
pub use question_repository::QuestionRepository;
pub use user_repository::UserRepository;

use thiserror::Error;

/// Errors returned by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A 1-based page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

/// One page of records plus the total number of records
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub request: PageRequest,
}

impl<T> Page<T> {
    /// Number of pages; an empty collection still has one (empty) page
    pub fn num_pages(&self) -> u32 {
        let size = i64::from(self.request.size);
        let pages = (self.total + size - 1) / size;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    pub fn is_out_of_range(&self) -> bool {
        self.request.number > self.num_pages()
    }

    pub fn has_next(&self) -> bool {
        self.request.number < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.request.number > 1
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            request: self.request,
        }
    }
}
