use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_datetime, parse_link};
use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::links::{Links, Resource};
use crate::api::middleware::CurrentUser;
use crate::api::pagination::{PageParams, Paginated};
use crate::api::state::AppState;
use crate::domain::poll::{
    Choice, NewQuestion, Question, QuestionChanges, QuestionPatch, QuestionText,
};
use crate::domain::repositories::{QuestionRepository, RepositoryError};
use crate::domain::validation::{self, ValidationErrors};
use crate::infrastructure::repositories::SqliteQuestionRepository;

/// Choice as nested inside a question
#[derive(Debug, Serialize)]
pub struct ChoiceResponse {
    pub url: String,
    pub votes: i32,
    pub choice_text: String,
}

impl ChoiceResponse {
    pub fn new(choice: &Choice, links: &Links) -> Self {
        Self {
            url: links.detail(Resource::Choices, choice.id),
            votes: choice.votes,
            choice_text: choice.choice_text.to_string(),
        }
    }
}

/// Question representation with its choices
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub url: String,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    pub date_created: DateTime<Utc>,
    pub choices: Vec<ChoiceResponse>,
}

impl QuestionResponse {
    pub fn new(question: &Question, links: &Links) -> Self {
        Self {
            url: links.detail(Resource::Questions, question.id()),
            question_text: question.question_text().to_string(),
            pub_date: question.pub_date(),
            date_created: question.date_created(),
            choices: question
                .choices()
                .iter()
                .map(|c| ChoiceResponse::new(c, links))
                .collect(),
        }
    }
}

/// Response body of a bulk update
#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    pub results: Vec<QuestionResponse>,
}

/// Writable question fields; read-only fields in the body are ignored
#[derive(Debug, Default, Deserialize)]
pub struct QuestionPayload {
    pub question_text: Option<String>,
    pub pub_date: Option<String>,
}

impl QuestionPayload {
    /// Validates the payload into a change set
    ///
    /// With `partial` unset every field is required, as for create and PUT.
    fn validate(self, partial: bool) -> Result<QuestionChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let question_text = match self.question_text {
            Some(text) => errors.check("question_text", QuestionText::new(text)),
            None if !partial => errors.require::<QuestionText>("question_text", None),
            None => None,
        };
        let pub_date = match self.pub_date {
            Some(raw) => errors.check("pub_date", parse_datetime(&raw)),
            None if !partial => errors.require::<DateTime<Utc>>("pub_date", None),
            None => None,
        };

        errors.into_result()?;
        Ok(QuestionChanges {
            question_text,
            pub_date,
        })
    }
}

/// Python-style type name used in list validation messages
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Validates one bulk entry into a patch, or the entry's field errors
fn validate_entry(entry: Value) -> Result<QuestionPatch, ValidationErrors> {
    let entry = match entry {
        Value::Object(entry) => entry,
        other => {
            return Err(ValidationErrors::single(
                "non_field_errors",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(&other)
                ),
            ))
        }
    };

    let mut errors = ValidationErrors::new();
    let id = match entry.get("url") {
        Some(Value::String(url)) => errors.check("url", parse_link(url, Resource::Questions)),
        None => errors.require::<i64>("url", None),
        Some(Value::Null) => {
            errors.add("url", validation::NULL);
            None
        }
        Some(other) => {
            errors.add(
                "url",
                format!(
                    "Incorrect type. Expected URL string, received {}.",
                    json_type_name(other)
                ),
            );
            None
        }
    };

    let mut fields = QuestionPayload::default();
    for (name, slot) in [
        ("question_text", &mut fields.question_text),
        ("pub_date", &mut fields.pub_date),
    ] {
        match entry.get(name) {
            None => {}
            Some(Value::String(value)) => *slot = Some(value.clone()),
            Some(Value::Null) => errors.add(name, validation::NULL),
            Some(_) => errors.add(name, validation::NOT_A_STRING),
        }
    }

    let no_fields = !entry.contains_key("question_text") && !entry.contains_key("pub_date");
    let changes = match fields.validate(true) {
        Ok(changes) => Some(changes),
        Err(field_errors) => {
            errors.merge(field_errors);
            None
        }
    };
    if no_fields {
        errors.add(
            "non_field_errors",
            "At least one of question_text, pub_date must be provided.",
        );
    }

    errors.into_result()?;
    match (id, changes) {
        (Some(id), Some(changes)) => Ok(QuestionPatch { id, changes }),
        _ => Err(ValidationErrors::single("non_field_errors", "Invalid entry.")),
    }
}

/// List questions with their choices
///
/// GET /api/questions/
pub async fn list_questions(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Paginated<QuestionResponse>>, ApiError> {
    let request = params.request(state.config.page_size)?;
    let page = SqliteQuestionRepository::new(state.db.clone())
        .list(request)
        .await?
        .map(|q| QuestionResponse::new(&q, &state.links));

    Ok(Json(Paginated::from_page(
        page,
        &state.links,
        Resource::Questions,
    )?))
}

/// Create a question
///
/// POST /api/questions/
pub async fn create_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(payload): ApiJson<QuestionPayload>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let changes = payload.validate(false)?;
    let (Some(question_text), Some(pub_date)) = (changes.question_text, changes.pub_date) else {
        return Err(ApiError::bad_request("Invalid input"));
    };

    let question = SqliteQuestionRepository::new(state.db.clone())
        .create(&NewQuestion::new(question_text, pub_date))
        .await?;
    tracing::info!(question_id = question.id(), "created question");

    Ok((
        StatusCode::CREATED,
        Json(QuestionResponse::new(&question, &state.links)),
    ))
}

/// Get a question by ID
///
/// GET /api/questions/:id/
pub async fn get_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let question = SqliteQuestionRepository::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("question {} not found", id)))?;

    Ok(Json(QuestionResponse::new(&question, &state.links)))
}

async fn apply_update(
    state: &AppState,
    id: i64,
    payload: QuestionPayload,
    partial: bool,
) -> Result<Json<QuestionResponse>, ApiError> {
    let changes = payload.validate(partial)?;
    let question = SqliteQuestionRepository::new(state.db.clone())
        .update(id, &changes)
        .await?;

    Ok(Json(QuestionResponse::new(&question, &state.links)))
}

/// Replace a question's writable fields
///
/// PUT /api/questions/:id/
pub async fn update_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<QuestionPayload>,
) -> Result<Json<QuestionResponse>, ApiError> {
    apply_update(&state, id, payload, false).await
}

/// Update some of a question's fields
///
/// PATCH /api/questions/:id/
pub async fn partial_update_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<QuestionPayload>,
) -> Result<Json<QuestionResponse>, ApiError> {
    apply_update(&state, id, payload, true).await
}

/// Delete a question and its choices
///
/// DELETE /api/questions/:id/
pub async fn delete_question(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError> {
    SqliteQuestionRepository::new(state.db.clone())
        .delete(id)
        .await?;
    tracing::info!(question_id = id, "deleted question");

    Ok(StatusCode::NO_CONTENT)
}

/// Partially update many questions in one request
///
/// PATCH /api/questions/
///
/// The body is a list of `{"url": ..., <fields>}` objects. Every entry is
/// validated before anything is written; the updates then run in one
/// transaction, so a single unknown question leaves every record untouched.
pub async fn bulk_partial_update(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let entries = match body {
        Value::Array(entries) => entries,
        other => {
            return Err(ApiError::bad_request(format!(
                "Expected a list of items but got type \"{}\".",
                json_type_name(&other)
            )))
        }
    };

    let urls: Vec<Option<String>> = entries
        .iter()
        .map(|e| e.get("url").and_then(Value::as_str).map(str::to_string))
        .collect();

    let mut patches = Vec::with_capacity(entries.len());
    let mut details = Vec::with_capacity(entries.len());
    let mut invalid = false;
    for entry in entries {
        match validate_entry(entry) {
            Ok(patch) => {
                patches.push(patch);
                details.push(ValidationErrors::new());
            }
            Err(errors) => {
                invalid = true;
                details.push(errors);
            }
        }
    }
    if invalid {
        return Err(ApiError::bad_request("Invalid input").with_details(json!(details)));
    }

    let updated = match SqliteQuestionRepository::new(state.db.clone())
        .bulk_update(&patches)
        .await
    {
        Ok(updated) => updated,
        Err(RepositoryError::NotFound { id, .. }) => {
            let index = patches.iter().position(|p| p.id == id).unwrap_or_default();
            tracing::info!(index, question_id = id, "bulk update rejected, question missing");
            return Err(
                ApiError::not_found(format!("question {} not found", id)).with_details(json!({
                    "index": index,
                    "url": urls.get(index).cloned().flatten(),
                })),
            );
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(count = updated.len(), "bulk updated questions");
    Ok(Json(BulkUpdateResponse {
        results: updated
            .iter()
            .map(|q| QuestionResponse::new(q, &state.links))
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_payload_requires_every_field() {
        let errors = QuestionPayload::default().validate(false).unwrap_err();
        assert_eq!(errors.get("question_text"), Some(&["This field is required.".to_string()][..]));
        assert!(errors.get("pub_date").is_some());
    }

    #[test]
    fn partial_payload_accepts_subset() {
        let changes = QuestionPayload {
            question_text: Some("  Renamed ".into()),
            pub_date: None,
        }
        .validate(true)
        .unwrap();

        assert_eq!(changes.question_text.unwrap().as_str(), "Renamed");
        assert!(changes.pub_date.is_none());
    }

    #[test]
    fn bulk_entry_needs_url_and_field() {
        let errors = validate_entry(json!({})).unwrap_err();
        assert!(errors.get("url").is_some());
        assert!(errors.get("non_field_errors").is_some());

        let errors = validate_entry(json!({"url": "/api/choices/1/", "question_text": "x"}))
            .unwrap_err();
        assert_eq!(
            errors.get("url"),
            Some(&["Invalid hyperlink - Incorrect URL match.".to_string()][..])
        );
    }

    #[test]
    fn bulk_entry_becomes_patch() {
        let patch = validate_entry(json!({
            "url": "http://testserver/api/questions/5/",
            "question_text": "Five",
            "date_created": "ignored",
        }))
        .unwrap();

        assert_eq!(patch.id, 5);
        assert_eq!(patch.changes.question_text.unwrap().as_str(), "Five");
    }

    #[test]
    fn bulk_entry_type_errors_reported_per_field() {
        let errors = validate_entry(json!({
            "url": 5,
            "question_text": 7,
            "pub_date": null,
        }))
        .unwrap_err();

        assert_eq!(
            errors.get("url"),
            Some(&["Incorrect type. Expected URL string, received int.".to_string()][..])
        );
        assert_eq!(
            errors.get("question_text"),
            Some(&["Not a valid string.".to_string()][..])
        );
        assert_eq!(
            errors.get("pub_date"),
            Some(&["This field may not be null.".to_string()][..])
        );
        assert!(errors.get("non_field_errors").is_none());
    }

    #[test]
    fn non_object_entry_rejected() {
        let errors = validate_entry(json!(3)).unwrap_err();
        assert_eq!(
            errors.get("non_field_errors"),
            Some(&["Invalid data. Expected a dictionary, but got int.".to_string()][..])
        );
    }
}
