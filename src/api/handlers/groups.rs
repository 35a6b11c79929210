use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::links::{Links, Resource};
use crate::api::middleware::CurrentUser;
use crate::api::pagination::{PageParams, Paginated};
use crate::api::state::AppState;
use crate::domain::repositories::{GroupRepository, RepositoryError};
use crate::domain::user::{Group, GroupName, NewGroup};
use crate::domain::validation::ValidationErrors;
use crate::infrastructure::repositories::SqliteGroupRepository;

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub url: String,
    pub name: String,
}

impl GroupResponse {
    pub fn new(group: &Group, links: &Links) -> Self {
        Self {
            url: links.detail(Resource::Groups, group.id),
            name: group.name.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GroupPayload {
    pub name: Option<String>,
}

impl GroupPayload {
    fn validate(self, partial: bool) -> Result<Option<GroupName>, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = match self.name {
            Some(name) => errors.check("name", GroupName::new(name)),
            None if !partial => errors.require::<GroupName>("name", None),
            None => None,
        };

        errors.into_result()?;
        Ok(name)
    }
}

fn conflict_to_validation(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Conflict(_) => {
            ValidationErrors::single("name", "group with this name already exists.").into()
        }
        other => other.into(),
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("group {} not found", id))
}

/// GET /api/groups/
pub async fn list_groups(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<GroupResponse>>, ApiError> {
    let request = params.request(state.config.page_size)?;
    let page = SqliteGroupRepository::new(state.db.clone())
        .list(request)
        .await?
        .map(|g| GroupResponse::new(&g, &state.links));

    Ok(Json(Paginated::from_page(page, &state.links, Resource::Groups)?))
}

/// POST /api/groups/
pub async fn create_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<GroupPayload>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let Some(name) = payload.validate(false)? else {
        return Err(ApiError::bad_request("Invalid input"));
    };

    let group = SqliteGroupRepository::new(state.db.clone())
        .create(&NewGroup { name })
        .await
        .map_err(conflict_to_validation)?;
    tracing::info!(group_id = group.id, "created group");

    Ok((
        StatusCode::CREATED,
        Json(GroupResponse::new(&group, &state.links)),
    ))
}

/// GET /api/groups/:id/
pub async fn get_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<GroupResponse>, ApiError> {
    let group = SqliteGroupRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(Json(GroupResponse::new(&group, &state.links)))
}

async fn apply_update(
    state: &AppState,
    id: i64,
    payload: GroupPayload,
    partial: bool,
) -> Result<Json<GroupResponse>, ApiError> {
    let repo = SqliteGroupRepository::new(state.db.clone());
    let group = match payload.validate(partial)? {
        Some(name) => repo
            .rename(id, &name)
            .await
            .map_err(conflict_to_validation)?,
        None => repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?,
    };

    Ok(Json(GroupResponse::new(&group, &state.links)))
}

/// PUT /api/groups/:id/
pub async fn update_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<GroupPayload>,
) -> Result<Json<GroupResponse>, ApiError> {
    apply_update(&state, id, payload, false).await
}

/// PATCH /api/groups/:id/
pub async fn partial_update_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<GroupPayload>,
) -> Result<Json<GroupResponse>, ApiError> {
    apply_update(&state, id, payload, true).await
}

/// DELETE /api/groups/:id/
pub async fn delete_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    SqliteGroupRepository::new(state.db.clone())
        .delete(id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
