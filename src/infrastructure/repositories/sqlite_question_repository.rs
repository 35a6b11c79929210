use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{QueryBuilder, Sqlite};

use super::corrupt;
use super::sqlite_choice_repository::choices_for_questions;
use crate::domain::poll::{NewQuestion, Question, QuestionChanges, QuestionPatch, QuestionText};
use crate::domain::repositories::{
    Page, PageRequest, QuestionRepository, RepositoryError, RepositoryResult,
};
use crate::infrastructure::Database;

#[derive(Debug, sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    question_text: String,
    pub_date: DateTime<Utc>,
    date_created: DateTime<Utc>,
}

/// `date_created` is absent on purpose: it is written once by `create`.
const UPDATE_QUESTION: &str = r#"
    UPDATE questions
    SET question_text = COALESCE(?, question_text),
        pub_date = COALESCE(?, pub_date)
    WHERE id = ?
"#;

fn update_statement<'q>(
    id: i64,
    changes: &'q QuestionChanges,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    sqlx::query(UPDATE_QUESTION)
        .bind(changes.question_text.as_ref().map(QuestionText::as_str))
        .bind(changes.pub_date)
        .bind(id)
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound {
        entity: "question",
        id,
    }
}

/// SQLite implementation of QuestionRepository
///
/// Choices are always prefetched: one query for the questions, one for the
/// choices of all of them.
pub struct SqliteQuestionRepository {
    db: Database,
}

impl SqliteQuestionRepository {
    /// Creates a new SqliteQuestionRepository
    ///
    /// # Arguments
    /// * `db` - Shared database handle
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Joins question rows with their prefetched choices, keeping row order
    async fn with_choices(&self, rows: Vec<QuestionRow>) -> RepositoryResult<Vec<Question>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut choices = choices_for_questions(&self.db, &ids).await?;

        rows.into_iter()
            .map(|r| {
                let text = QuestionText::new(&r.question_text).map_err(corrupt("question_text"))?;
                Ok(Question::from_persistence(
                    r.id,
                    text,
                    r.pub_date,
                    r.date_created,
                    choices.remove(&r.id).unwrap_or_default(),
                ))
            })
            .collect()
    }

    /// Loads the given questions with their choices in two queries
    async fn find_many(&self, ids: &[i64]) -> RepositoryResult<HashMap<i64, Question>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, question_text, pub_date, date_created FROM questions WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in &unique {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY id");

        let rows: Vec<QuestionRow> = builder
            .build_query_as::<QuestionRow>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(self
            .with_choices(rows)
            .await?
            .into_iter()
            .map(|q| (q.id(), q))
            .collect())
    }
}

#[async_trait]
impl QuestionRepository for SqliteQuestionRepository {
    async fn create(&self, question: &NewQuestion) -> RepositoryResult<Question> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (question_text, pub_date, date_created)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(question.question_text().as_str())
        .bind(question.pub_date())
        .bind(question.date_created())
        .execute(self.db.pool())
        .await?;

        Ok(Question::from_persistence(
            result.last_insert_rowid(),
            question.question_text().clone(),
            question.pub_date(),
            question.date_created(),
            Vec::new(),
        ))
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Question>> {
        let row: Option<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, question_text, pub_date, date_created
            FROM questions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        match row {
            Some(row) => Ok(self.with_choices(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: i64) -> RepositoryResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;

        Ok(count > 0)
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Question>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(self.db.pool())
            .await?;

        let mut result = Page {
            items: Vec::new(),
            total,
            request: page,
        };
        if total == 0 || result.is_out_of_range() {
            return Ok(result);
        }

        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, question_text, pub_date, date_created
            FROM questions
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        result.items = self.with_choices(rows).await?;
        Ok(result)
    }

    async fn update(&self, id: i64, changes: &QuestionChanges) -> RepositoryResult<Question> {
        if changes.is_empty() {
            return self.find_by_id(id).await?.ok_or_else(|| not_found(id));
        }

        let result = update_statement(id, changes)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        self.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    async fn bulk_update(&self, patches: &[QuestionPatch]) -> RepositoryResult<Vec<Question>> {
        if patches.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.db.pool().begin().await?;
        for patch in patches {
            let result = update_statement(patch.id, &patch.changes)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                tx.rollback().await?;
                tracing::debug!(id = patch.id, "bulk update rolled back, question missing");
                return Err(not_found(patch.id));
            }
        }
        tx.commit().await?;

        let ids: Vec<i64> = patches.iter().map(|p| p.id).collect();
        let found = self.find_many(&ids).await?;

        patches
            .iter()
            .map(|p| found.get(&p.id).cloned().ok_or_else(|| not_found(p.id)))
            .collect()
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }
}
