pub mod admin;
pub mod auth;
pub mod calendar;
pub mod catalogs;
pub mod courses;
pub mod dashboard;
pub mod health;
pub mod people;
pub mod quizzes;
pub mod surveys;
pub mod take;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/...                 login, refresh, logout, sessions, me
/// /admin/users/...          user management (admin)
/// /customers/...            customers
/// /instructors/...          instructors
/// /catalogs/...             catalog entries, modules, labs, materials
/// /courses/...              scheduled courses, status, calendar hand-off
/// /question-bank/...        quiz question items
/// /quiz-catalogs/...        quiz templates and AI drafting
/// /course-quizzes/...       per-course quizzes, attempts, results
/// /survey-questions/...     survey question items
/// /survey-catalogs/...      survey templates
/// /surveys/...              deployed surveys, responses, analytics
/// /calendar/...             events, recurring series, registrations
/// /dashboard/...            stored metrics and live summary
/// /take/{share_code}/...    public learner endpoints
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/customers", people::customers_router())
        .nest("/instructors", people::instructors_router())
        .nest("/catalogs", catalogs::router())
        .nest("/courses", courses::router())
        .nest("/question-bank", quizzes::question_bank_router())
        .nest("/quiz-catalogs", quizzes::quiz_catalogs_router())
        .nest("/course-quizzes", quizzes::course_quizzes_router())
        .nest("/survey-questions", surveys::survey_questions_router())
        .nest("/survey-catalogs", surveys::survey_catalogs_router())
        .nest("/surveys", surveys::surveys_router())
        .nest("/calendar", calendar::router())
        .nest("/dashboard", dashboard::router())
        .nest("/take", take::router())
}
