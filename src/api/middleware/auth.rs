use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::verify_token;
use crate::domain::repositories::UserRepository;
use crate::domain::user::User;
use crate::infrastructure::repositories::SqliteUserRepository;

/// Authenticated user extractor for protected routes
///
/// Resolves the bearer token to an active user with a single lookup.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello {}", user.username))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided."))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>")
        })?;

        let claims = verify_token(token.trim(), &state.config.jwt_secret)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| ApiError::unauthorized("Invalid token: malformed subject"))?;

        let user = SqliteUserRepository::new(state.db.clone())
            .find_by_id(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| ApiError::unauthorized("User not found or inactive"))?;

        Ok(CurrentUser(user))
    }
}
