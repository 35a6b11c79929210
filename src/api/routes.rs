use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{auth, choices, groups, questions, users};
use crate::api::state::AppState;

/// Builds the application router
///
/// Methods not listed for a path answer 405.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/api/auth/login", post(auth::login))
        .route("/api/", get(auth::api_root))
        // Question routes; PATCH on the collection is the bulk update
        .route(
            "/api/questions/",
            get(questions::list_questions)
                .post(questions::create_question)
                .patch(questions::bulk_partial_update),
        )
        .route(
            "/api/questions/:id/",
            get(questions::get_question)
                .put(questions::update_question)
                .patch(questions::partial_update_question)
                .delete(questions::delete_question),
        )
        // Choice routes
        .route(
            "/api/choices/",
            get(choices::list_choices).post(choices::create_choice),
        )
        .route(
            "/api/choices/:id/",
            get(choices::get_choice)
                .put(choices::update_choice)
                .patch(choices::partial_update_choice)
                .delete(choices::delete_choice),
        )
        // User routes
        .route("/api/users/", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id/",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::partial_update_user)
                .delete(users::delete_user),
        )
        // Group routes
        .route(
            "/api/groups/",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/api/groups/:id/",
            get(groups::get_group)
                .put(groups::update_group)
                .patch(groups::partial_update_group)
                .delete(groups::delete_group),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
