//! Route definitions for `/courses`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{course_quizzes, courses};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                       -> list
/// POST   /                       -> create
/// GET    /by-share-code/{code}   -> get_by_share_code (public)
/// GET    /{id}                   -> get
/// PUT    /{id}                   -> update
/// DELETE /{id}                   -> delete
/// PUT    /{id}/status            -> set_status
/// POST   /{id}/calendar          -> add_to_calendar
/// GET    /{id}/quiz-comparison   -> course_quizzes::course_comparison
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list).post(courses::create))
        .route("/by-share-code/{code}", get(courses::get_by_share_code))
        .route(
            "/{id}",
            get(courses::get).put(courses::update).delete(courses::delete),
        )
        .route("/{id}/status", put(courses::set_status))
        .route("/{id}/calendar", post(courses::add_to_calendar))
        .route("/{id}/quiz-comparison", get(course_quizzes::course_comparison))
}
