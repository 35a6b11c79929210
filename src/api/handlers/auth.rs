use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::links::Resource;
use crate::api::middleware::CurrentUser;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::verify_password;
use crate::domain::repositories::UserRepository;
use crate::infrastructure::repositories::SqliteUserRepository;

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
}

/// Hyperlinks to every collection
#[derive(Debug, Serialize)]
pub struct ApiRootResponse {
    pub users: String,
    pub groups: String,
    pub choices: String,
    pub questions: String,
}

/// Login with username and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user_repo = SqliteUserRepository::new(state.db.clone());
    let user = user_repo
        .find_by_username(req.username.trim())
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    if !user.has_usable_password() {
        tracing::info!(user_id = user.id, "login to account without a password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "rejected login");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = create_token(user.id, &state.config.jwt_secret)?;
    tracing::info!(user_id = user.id, "issued token");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}

/// API root
///
/// GET /api/
pub async fn api_root(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<ApiRootResponse> {
    let links = &state.links;
    Json(ApiRootResponse {
        users: links.collection(Resource::Users),
        groups: links.collection(Resource::Groups),
        choices: links.collection(Resource::Choices),
        questions: links.collection(Resource::Questions),
    })
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
