//! Route definitions for the survey resources.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{survey_catalogs, survey_questions, surveys};
use crate::state::AppState;

/// Routes mounted at `/survey-questions`.
pub fn survey_questions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(survey_questions::list).post(survey_questions::create))
        .route(
            "/{id}",
            get(survey_questions::get)
                .put(survey_questions::update)
                .delete(survey_questions::delete),
        )
}

/// Routes mounted at `/survey-catalogs`.
pub fn survey_catalogs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(survey_catalogs::list).post(survey_catalogs::create))
        .route(
            "/{id}",
            get(survey_catalogs::get)
                .put(survey_catalogs::update)
                .delete(survey_catalogs::delete),
        )
}

/// Routes mounted at `/surveys`.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// GET    /{id}                            -> get
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete
/// PUT    /{id}/status                     -> set_status
/// GET    /{id}/analytics                  -> analytics
/// GET    /{id}/responses                  -> list_responses
/// GET    /{id}/responses/{response_id}    -> get_response
/// DELETE /{id}/responses/{response_id}    -> delete_response
/// ```
pub fn surveys_router() -> Router<AppState> {
    Router::new()
        .route("/", get(surveys::list).post(surveys::create))
        .route(
            "/{id}",
            get(surveys::get).put(surveys::update).delete(surveys::delete),
        )
        .route("/{id}/status", put(surveys::set_status))
        .route("/{id}/analytics", get(surveys::analytics))
        .route("/{id}/responses", get(surveys::list_responses))
        .route(
            "/{id}/responses/{response_id}",
            get(surveys::get_response).delete(surveys::delete_response),
        )
}
