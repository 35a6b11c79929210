// Start-up tasks that seed required data

use thiserror::Error;

use crate::auth::password::hash_password;
use crate::auth::AuthError;
use crate::config::AdminCredentials;
use crate::domain::repositories::{RepositoryError, UserRepository};
use crate::domain::user::{NewUser, Username};
use crate::infrastructure::repositories::SqliteUserRepository;
use crate::infrastructure::Database;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid admin username: {0}")]
    InvalidUsername(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Creates the configured admin user unless a user with that name exists
///
/// Returns whether a user was created. An existing user keeps its password.
pub async fn ensure_admin(
    db: &Database,
    credentials: &AdminCredentials,
) -> Result<bool, BootstrapError> {
    let username =
        Username::new(&credentials.username).map_err(BootstrapError::InvalidUsername)?;

    let repo = SqliteUserRepository::new(db.clone());
    if repo.find_by_username(username.as_str()).await?.is_some() {
        tracing::debug!(username = %username, "admin user already present");
        return Ok(false);
    }

    let user = repo
        .create(&NewUser {
            username,
            email: None,
            password_hash: hash_password(&credentials.password)?,
            groups: Vec::new(),
        })
        .await?;
    tracing::info!(user_id = user.id, "created admin user");

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn database() -> Database {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn credentials(username: &str) -> AdminCredentials {
        AdminCredentials {
            username: username.to_string(),
            password: "s3cret".to_string(),
        }
    }

    #[tokio::test]
    async fn creates_admin_once() {
        let db = database().await;

        assert!(ensure_admin(&db, &credentials("admin")).await.unwrap());
        assert!(!ensure_admin(&db, &credentials("admin")).await.unwrap());

        let admin = SqliteUserRepository::new(db.clone())
            .find_by_username("admin")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.has_usable_password());
    }

    #[tokio::test]
    async fn rejects_invalid_username() {
        let db = database().await;
        let err = ensure_admin(&db, &credentials("not valid")).await.unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidUsername(_)));
    }
}
