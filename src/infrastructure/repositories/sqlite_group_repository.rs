use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::corrupt;
use crate::domain::repositories::{
    GroupRepository, Page, PageRequest, RepositoryError, RepositoryResult,
};
use crate::domain::user::{Group, GroupName, NewGroup};
use crate::infrastructure::Database;

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
}

impl GroupRow {
    fn into_group(self) -> RepositoryResult<Group> {
        Ok(Group {
            id: self.id,
            name: GroupName::new(&self.name).map_err(corrupt("group name"))?,
        })
    }
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound { entity: "group", id }
}

/// SQLite implementation of GroupRepository
pub struct SqliteGroupRepository {
    db: Database,
}

impl SqliteGroupRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupRepository for SqliteGroupRepository {
    async fn create(&self, group: &NewGroup) -> RepositoryResult<Group> {
        let result = sqlx::query("INSERT INTO auth_groups (name) VALUES (?)")
            .bind(group.name.as_str())
            .execute(self.db.pool())
            .await?;

        Ok(Group {
            id: result.last_insert_rowid(),
            name: group.name.clone(),
        })
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Group>> {
        let row: Option<GroupRow> = sqlx::query_as("SELECT id, name FROM auth_groups WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(GroupRow::into_group).transpose()
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<Group>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auth_groups")
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

        let rows: Vec<GroupRow> =
            sqlx::query_as("SELECT id, name FROM auth_groups ORDER BY id LIMIT ? OFFSET ?")
                .bind(page.limit())
                .bind(page.offset())
                .fetch_all(self.db.pool())
                .await?;

        result.items = rows
            .into_iter()
            .map(GroupRow::into_group)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(result)
    }

    async fn rename(&self, id: i64, name: &GroupName) -> RepositoryResult<Group> {
        let result = sqlx::query("UPDATE auth_groups SET name = ? WHERE id = ?")
            .bind(name.as_str())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(Group {
            id,
            name: name.clone(),
        })
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM auth_groups WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn missing_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM auth_groups WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let existing: Vec<(i64,)> = builder
            .build_query_as::<(i64,)>()
            .fetch_all(self.db.pool())
            .await?;

        Ok(ids
            .iter()
            .copied()
            .filter(|id| !existing.iter().any(|(found,)| found == id))
            .collect())
    }
}
