use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::parse_link;
use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::links::{LinkError, Links, Resource};
use crate::api::middleware::CurrentUser;
use crate::api::pagination::{PageParams, Paginated};
use crate::api::state::AppState;
use crate::auth::password::{hash_password, unusable_password};
use crate::domain::repositories::{GroupRepository, RepositoryError, UserRepository};
use crate::domain::user::{Email, NewUser, User, UserChanges, Username};
use crate::domain::validation::ValidationErrors;
use crate::infrastructure::repositories::{SqliteGroupRepository, SqliteUserRepository};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// User representation; the password hash never leaves the server
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub url: String,
    pub username: String,
    pub email: String,
    pub groups: Vec<String>,
}

impl UserResponse {
    pub fn new(user: &User, links: &Links) -> Self {
        Self {
            url: links.detail(Resource::Users, user.id),
            username: user.username.to_string(),
            email: user
                .email
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            groups: user
                .groups
                .iter()
                .map(|id| links.detail(Resource::Groups, *id))
                .collect(),
        }
    }
}

/// Writable user fields; `password` is write-only
#[derive(Debug, Default, Deserialize)]
pub struct UserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub groups: Option<Vec<String>>,
}

impl UserPayload {
    /// Validates the payload into a change set, hashing any new password
    ///
    /// Only `username` is required when `partial` is unset. An empty
    /// `email` clears the address.
    async fn validate(self, state: &AppState, partial: bool) -> Result<UserChanges, ApiError> {
        let mut errors = ValidationErrors::new();

        let username = match self.username {
            Some(name) => errors.check("username", Username::new(name)),
            None if !partial => errors.require::<Username>("username", None),
            None => None,
        };

        let email = match self.email.as_deref().map(str::trim) {
            Some("") => Some(None),
            Some(address) => errors.check("email", Email::new(address)).map(Some),
            None => None,
        };

        let groups = match self.groups {
            Some(urls) => {
                let mut ids = Vec::with_capacity(urls.len());
                for url in &urls {
                    if let Some(id) = errors.check("groups", parse_link(url, Resource::Groups)) {
                        ids.push(id);
                    }
                }
                let missing = SqliteGroupRepository::new(state.db.clone())
                    .missing_ids(&ids)
                    .await?;
                if !missing.is_empty() {
                    errors.add("groups", LinkError::DoesNotExist.to_string());
                }
                Some(ids)
            }
            None => None,
        };

        errors.into_result()?;

        let password_hash = match self.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(&password)?),
            None => None,
        };

        Ok(UserChanges {
            username,
            email,
            password_hash,
            groups,
        })
    }
}

fn conflict_to_validation(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Conflict(_) => ValidationErrors::single("username", USERNAME_TAKEN).into(),
        other => other.into(),
    }
}

/// List users, most recently joined first
///
/// GET /api/users/
pub async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    let request = params.request(state.config.page_size)?;
    let page = SqliteUserRepository::new(state.db.clone())
        .list(request)
        .await?
        .map(|u| UserResponse::new(&u, &state.links));

    Ok(Json(Paginated::from_page(page, &state.links, Resource::Users)?))
}

/// Create a user
///
/// POST /api/users/
pub async fn create_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let changes = payload.validate(&state, false).await?;
    let Some(username) = changes.username else {
        return Err(ApiError::bad_request("Invalid input"));
    };

    let new_user = NewUser {
        username,
        email: changes.email.flatten(),
        password_hash: changes.password_hash.unwrap_or_else(unusable_password),
        groups: changes.groups.unwrap_or_default(),
    };
    let user = SqliteUserRepository::new(state.db.clone())
        .create(&new_user)
        .await
        .map_err(conflict_to_validation)?;
    tracing::info!(user_id = user.id, "created user");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse::new(&user, &state.links)),
    ))
}

/// Get a user by ID
///
/// GET /api/users/:id/
pub async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = SqliteUserRepository::new(state.db.clone())
        .find_with_groups(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("user {} not found", id)))?;

    Ok(Json(UserResponse::new(&user, &state.links)))
}

async fn apply_update(
    state: &AppState,
    id: i64,
    payload: UserPayload,
    partial: bool,
) -> Result<Json<UserResponse>, ApiError> {
    let repo = SqliteUserRepository::new(state.db.clone());
    if repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found(format!("user {} not found", id)));
    }

    let changes = payload.validate(state, partial).await?;
    let user = repo
        .update(id, &changes)
        .await
        .map_err(conflict_to_validation)?;

    Ok(Json(UserResponse::new(&user, &state.links)))
}

/// Replace a user's writable fields
///
/// PUT /api/users/:id/
pub async fn update_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    apply_update(&state, id, payload, false).await
}

/// Update some of a user's fields
///
/// PATCH /api/users/:id/
pub async fn partial_update_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Json<UserResponse>, ApiError> {
    apply_update(&state, id, payload, true).await
}

/// Delete a user
///
/// DELETE /api/users/:id/
pub async fn delete_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    SqliteUserRepository::new(state.db.clone())
        .delete(id)
        .await?;
    tracing::info!(user_id = id, "deleted user");

    Ok(StatusCode::NO_CONTENT)
}
