use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::parse_link;
use super::questions::ChoiceResponse;
use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::links::{LinkError, Resource};
use crate::api::middleware::CurrentUser;
use crate::api::pagination::{PageParams, Paginated};
use crate::api::state::AppState;
use crate::domain::poll::{ChoiceChanges, ChoiceText, NewChoice};
use crate::domain::repositories::{ChoiceRepository, QuestionRepository};
use crate::domain::validation::ValidationErrors;
use crate::infrastructure::repositories::{SqliteChoiceRepository, SqliteQuestionRepository};

/// Writable choice fields
///
/// `question` is a hyperlink to the owning question. It is accepted on
/// write but not part of the representation.
#[derive(Debug, Default, Deserialize)]
pub struct ChoicePayload {
    pub question: Option<String>,
    pub choice_text: Option<String>,
    pub votes: Option<i32>,
}

impl ChoicePayload {
    /// Validates the payload, checking that a referenced question exists
    async fn validate(
        self,
        state: &AppState,
        partial: bool,
    ) -> Result<ChoiceChanges, ApiError> {
        let mut errors = ValidationErrors::new();

        let question_id = match self.question.as_deref() {
            Some(url) => errors.check("question", parse_link(url, Resource::Questions)),
            None if !partial => errors.require::<i64>("question", None),
            None => None,
        };
        let choice_text = match self.choice_text {
            Some(text) => errors.check("choice_text", ChoiceText::new(text)),
            None if !partial => errors.require::<ChoiceText>("choice_text", None),
            None => None,
        };

        if let Some(id) = question_id {
            let exists = SqliteQuestionRepository::new(state.db.clone())
                .exists(id)
                .await?;
            if !exists {
                errors.add("question", LinkError::DoesNotExist.to_string());
            }
        }

        errors.into_result()?;
        Ok(ChoiceChanges {
            question_id,
            choice_text,
            votes: self.votes,
        })
    }
}

/// List choices
///
/// GET /api/choices/
pub async fn list_choices(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<ChoiceResponse>>, ApiError> {
    let request = params.request(state.config.page_size)?;
    let page = SqliteChoiceRepository::new(state.db.clone())
        .list(request)
        .await?
        .map(|c| ChoiceResponse::new(&c, &state.links));

    Ok(Json(Paginated::from_page(page, &state.links, Resource::Choices)?))
}

/// Create a choice
///
/// POST /api/choices/
pub async fn create_choice(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<ChoicePayload>,
) -> Result<(StatusCode, Json<ChoiceResponse>), ApiError> {
    let changes = payload.validate(&state, false).await?;
    let (Some(question_id), Some(choice_text)) = (changes.question_id, changes.choice_text) else {
        return Err(ApiError::bad_request("Invalid input"));
    };

    let choice = SqliteChoiceRepository::new(state.db.clone())
        .create(&NewChoice {
            question_id,
            choice_text,
            votes: changes.votes.unwrap_or(0),
        })
        .await?;
    tracing::info!(choice_id = choice.id, question_id, "created choice");

    Ok((
        StatusCode::CREATED,
        Json(ChoiceResponse::new(&choice, &state.links)),
    ))
}

/// Get a choice by ID
///
/// GET /api/choices/:id/
pub async fn get_choice(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ChoiceResponse>, ApiError> {
    let choice = SqliteChoiceRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("choice {} not found", id)))?;

    Ok(Json(ChoiceResponse::new(&choice, &state.links)))
}

async fn apply_update(
    state: &AppState,
    id: i64,
    payload: ChoicePayload,
    partial: bool,
) -> Result<Json<ChoiceResponse>, ApiError> {
    let repo = SqliteChoiceRepository::new(state.db.clone());
    if repo.find_by_id(id).await?.is_none() {
        return Err(ApiError::not_found(format!("choice {} not found", id)));
    }

    let changes = payload.validate(state, partial).await?;
    let choice = repo.update(id, &changes).await?;

    Ok(Json(ChoiceResponse::new(&choice, &state.links)))
}

/// Replace a choice's writable fields
///
/// PUT /api/choices/:id/
pub async fn update_choice(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ChoicePayload>,
) -> Result<Json<ChoiceResponse>, ApiError> {
    apply_update(&state, id, payload, false).await
}

/// Update some of a choice's fields
///
/// PATCH /api/choices/:id/
pub async fn partial_update_choice(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ChoicePayload>,
) -> Result<Json<ChoiceResponse>, ApiError> {
    apply_update(&state, id, payload, true).await
}

/// Delete a choice
///
/// DELETE /api/choices/:id/
pub async fn delete_choice(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    SqliteChoiceRepository::new(state.db.clone())
        .delete(id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
