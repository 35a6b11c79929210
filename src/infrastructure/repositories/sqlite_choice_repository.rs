use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::corrupt;
use crate::domain::poll::{Choice, ChoiceChanges, ChoiceText, NewChoice};
use crate::domain::repositories::{
    ChoiceRepository, Page, PageRequest, RepositoryError, RepositoryResult,
};
use crate::infrastructure::Database;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ChoiceRow {
    id: i64,
    question_id: i64,
    choice_text: String,
    votes: i32,
}

impl ChoiceRow {
    pub(crate) fn into_choice(self) -> RepositoryResult<Choice> {
        Ok(Choice {
            id: self.id,
            question_id: self.question_id,
            choice_text: ChoiceText::new(&self.choice_text).map_err(corrupt("choice_text"))?,
            votes: self.votes,
        })
    }
}

/// Loads the choices of every listed question with a single query
///
/// Questions without choices are absent from the returned map. No query runs
/// when `question_ids` is empty.
pub(crate) async fn choices_for_questions(
    db: &Database,
    question_ids: &[i64],
) -> RepositoryResult<HashMap<i64, Vec<Choice>>> {
    let mut grouped: HashMap<i64, Vec<Choice>> = HashMap::new();
    if question_ids.is_empty() {
        return Ok(grouped);
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, question_id, choice_text, votes FROM choices WHERE question_id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in question_ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY id");

    let rows: Vec<ChoiceRow> = builder.build_query_as().fetch_all(db.pool()).await?;

    for row in rows {
        let choice = row.into_choice()?;
        grouped.entry(choice.question_id).or_default().push(choice);
    }

    Ok(grouped)
}

/// SQLite implementation of ChoiceRepository
pub struct SqliteChoiceRepository {
    db: Database,
}

impl SqliteChoiceRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChoiceRepository for SqliteChoiceRepository {
    async fn create(&self, choice: &NewChoice) -> RepositoryResult<Choice> {
        let result = sqlx::query(
            r#"
            INSERT INTO choices (question_id, choice_text, votes)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(choice.question_id)
        .bind(choice.choice_text.as_str())
        .bind(choice.votes)
        .execute(self.db.pool())
        .await?;

        Ok(Choice {
            id: result.last_insert_rowid(),
            question_id: choice.question_id,
            choice_text: choice.choice_text.clone(),
            votes: choice.votes,
        })
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Choice>> {
        let row: Option<ChoiceRow> = sqlx::query_as(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM choices
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(ChoiceRow::into_choice).transpose()
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Choice>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM choices")
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

        let rows: Vec<ChoiceRow> = sqlx::query_as(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM choices
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        result.items = rows
            .into_iter()
            .map(ChoiceRow::into_choice)
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(result)
    }

    async fn update(&self, id: i64, changes: &ChoiceChanges) -> RepositoryResult<Choice> {
        let result = sqlx::query(
            r#"
            UPDATE choices
            SET question_id = COALESCE(?, question_id),
                choice_text = COALESCE(?, choice_text),
                votes = COALESCE(?, votes)
            WHERE id = ?
            "#,
        )
        .bind(changes.question_id)
        .bind(changes.choice_text.as_ref().map(ChoiceText::as_str))
        .bind(changes.votes)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "choice", id });
        }

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound { entity: "choice", id })
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM choices WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { entity: "choice", id });
        }

        Ok(())
    }
}
