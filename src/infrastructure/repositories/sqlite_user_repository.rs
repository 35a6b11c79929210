use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use super::corrupt;
use crate::domain::repositories::{
    Page, PageRequest, RepositoryError, RepositoryResult, UserRepository,
};
use crate::domain::user::{Email, NewUser, User, UserChanges, Username};
use crate::infrastructure::Database;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    is_active: bool,
    date_joined: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, groups: Vec<i64>) -> RepositoryResult<User> {
        let email = if self.email.is_empty() {
            None
        } else {
            Some(Email::new(&self.email).map_err(corrupt("email"))?)
        };

        Ok(User {
            id: self.id,
            username: Username::new(&self.username).map_err(corrupt("username"))?,
            email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            date_joined: self.date_joined,
            groups,
        })
    }
}

fn not_found(id: i64) -> RepositoryError {
    RepositoryError::NotFound { entity: "user", id }
}

/// Replaces every group membership of `user_id` with `groups`
async fn replace_memberships(
    conn: &mut SqliteConnection,
    user_id: i64,
    groups: &[i64],
) -> RepositoryResult<()> {
    sqlx::query("DELETE FROM auth_user_groups WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    if groups.is_empty() {
        return Ok(());
    }

    let mut builder =
        QueryBuilder::<Sqlite>::new("INSERT OR IGNORE INTO auth_user_groups (user_id, group_id) ");
    builder.push_values(groups, |mut row, group_id| {
        row.push_bind(user_id).push_bind(*group_id);
    });

    builder.build().execute(&mut *conn).await?;
    Ok(())
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    db: Database,
}

impl SqliteUserRepository {
    /// Creates a new SqliteUserRepository
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Group IDs per user, prefetched with one query
    async fn groups_for_users(&self, user_ids: &[i64]) -> RepositoryResult<HashMap<i64, Vec<i64>>> {
        let mut grouped: HashMap<i64, Vec<i64>> = HashMap::new();
        if user_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT user_id, group_id FROM auth_user_groups WHERE user_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in user_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY group_id");

        let rows: Vec<(i64, i64)> = builder
            .build_query_as::<(i64, i64)>()
            .fetch_all(self.db.pool())
            .await?;

        for (user_id, group_id) in rows {
            grouped.entry(user_id).or_default().push(group_id);
        }
        Ok(grouped)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> RepositoryResult<User> {
        let date_joined = Utc::now().trunc_subsecs(6);
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO auth_users (username, email, password_hash, is_active, date_joined)
            VALUES (?, ?, ?, 1, ?)
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_ref().map(Email::as_str).unwrap_or(""))
        .bind(&user.password_hash)
        .bind(date_joined)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        replace_memberships(&mut tx, id, &user.groups).await?;
        tx.commit().await?;

        let mut groups = user.groups.clone();
        groups.sort_unstable();
        groups.dedup();

        Ok(User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            date_joined,
            groups,
        })
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, password_hash, is_active, date_joined
            FROM auth_users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| r.into_user(Vec::new())).transpose()
    }

    async fn find_with_groups(&self, id: i64) -> RepositoryResult<Option<User>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let groups = self
            .groups_for_users(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(Some(User { groups, ..user }))
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, password_hash, is_active, date_joined
            FROM auth_users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|r| r.into_user(Vec::new())).transpose()
    }

    async fn list(&self, page: PageRequest) -> RepositoryResult<Page<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM auth_users")
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

        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, email, password_hash, is_active, date_joined
            FROM auth_users
            ORDER BY date_joined DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.db.pool())
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut groups = self.groups_for_users(&ids).await?;

        result.items = rows
            .into_iter()
            .map(|r| {
                let memberships = groups.remove(&r.id).unwrap_or_default();
                r.into_user(memberships)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(result)
    }

    async fn update(&self, id: i64, changes: &UserChanges) -> RepositoryResult<User> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE auth_users
            SET username = COALESCE(?, username),
                email = COALESCE(?, email),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
        )
        .bind(changes.username.as_ref().map(Username::as_str))
        .bind(
            changes
                .email
                .as_ref()
                .map(|email| email.as_ref().map(Email::as_str).unwrap_or("")),
        )
        .bind(changes.password_hash.as_deref())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(not_found(id));
        }

        if let Some(groups) = &changes.groups {
            replace_memberships(&mut tx, id, groups).await?;
        }
        tx.commit().await?;

        self.find_with_groups(id).await?.ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM auth_users WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }
}
