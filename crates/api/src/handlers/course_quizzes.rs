//! Handlers for `/course-quizzes` (quiz templates deployed to a course) and
//! the instructor views of their attempts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::quiz::{
    compare_phases, summarize_results, validate_passing_score, QuizComparison, QuizResults, QuizType,
};
use tnc_core::survey::{satisfaction, SatisfactionSummary};
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::validate;
use tnc_db::models::course_quiz::{CourseQuiz, CourseQuizFilter, CreateCourseQuiz, UpdateCourseQuiz};
use tnc_db::models::quiz_attempt::{QuizAttempt, QuizResponse};
use tnc_db::repositories::{CourseQuizRepo, QuizAttemptRepo, SurveyRepo, SurveyResponseRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::courses::ensure_course_exists;
use crate::handlers::quiz_catalogs::ensure_quiz_catalog_exists;
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_course_quiz_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<CourseQuiz> {
    CourseQuizRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "CourseQuiz",
            id,
        })
    })
}

fn validate_availability(start_at: Option<Timestamp>, end_at: Option<Timestamp>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start_at, end_at) {
        if start >= end {
            return Err(AppError::Core(CoreError::Validation(
                "start_at must be before end_at".into(),
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/course-quizzes
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<CourseQuizFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(t) = filter.quiz_type.as_deref() {
        QuizType::parse(t)?;
    }
    let limit = page.limit();
    let rows = CourseQuizRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |q| q.id),
    }))
}

/// POST /api/v1/course-quizzes
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(input): Json<CreateCourseQuiz>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    QuizType::parse(&input.quiz_type)?;
    validate_passing_score(input.passing_score)?;
    validate_availability(input.start_at, input.end_at)?;
    ensure_course_exists(&state.pool, input.course_id).await?;
    let template = ensure_quiz_catalog_exists(&state.pool, input.quiz_catalog_id).await?;
    if template.question_items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Quiz template {} has no questions",
            template.id
        ))));
    }

    let quiz = CourseQuizRepo::create(&state.pool, &input).await?;
    tracing::info!(
        id = quiz.id,
        course_id = quiz.course_id,
        quiz_type = %quiz.quiz_type,
        "Course quiz created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: quiz })))
}

/// GET /api/v1/course-quizzes/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let quiz = ensure_course_quiz_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: quiz }))
}

/// PUT /api/v1/course-quizzes/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourseQuiz>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_passing_score(input.passing_score)?;
    let existing = ensure_course_quiz_exists(&state.pool, id).await?;
    validate_availability(
        input.start_at.or(existing.start_at),
        input.end_at.or(existing.end_at),
    )?;

    let quiz = CourseQuizRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseQuiz",
            id,
        }))?;
    Ok(Json(DataResponse { data: quiz }))
}

/// DELETE /api/v1/course-quizzes/{id}
///
/// Attempts are removed with the quiz.
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CourseQuizRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "CourseQuiz",
            id,
        }));
    }
    tracing::info!(id, "Course quiz deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attempts & results
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AttemptFilter {
    pub user_id: Option<String>,
}

/// GET /api/v1/course-quizzes/{id}/attempts
pub async fn list_attempts(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Query(filter): Query<AttemptFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    ensure_course_quiz_exists(&state.pool, id).await?;
    let limit = page.limit();
    let rows = QuizAttemptRepo::list_for_quiz(
        &state.pool,
        id,
        filter.user_id.as_deref(),
        page.cursor()?,
        limit,
    )
    .await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |a| a.id),
    }))
}

#[derive(Debug, Serialize)]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub attempt: QuizAttempt,
    pub responses: Vec<QuizResponse>,
}

/// GET /api/v1/course-quizzes/{id}/attempts/{attempt_id}
pub async fn get_attempt(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((id, attempt_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    ensure_course_quiz_exists(&state.pool, id).await?;
    let attempt = QuizAttemptRepo::find_for_quiz(&state.pool, id, attempt_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuizAttempt",
            id: attempt_id,
        }))?;
    let responses = QuizAttemptRepo::list_responses(&state.pool, attempt.id).await?;
    Ok(Json(DataResponse {
        data: AttemptDetail { attempt, responses },
    }))
}

/// GET /api/v1/course-quizzes/{id}/results
pub async fn results(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_quiz_exists(&state.pool, id).await?;
    let scores = QuizAttemptRepo::scores_for_quiz(&state.pool, id).await?;
    let correctness = QuizAttemptRepo::correctness_for_quiz(&state.pool, id).await?;
    let results: QuizResults = summarize_results(&scores, &correctness);
    Ok(Json(DataResponse { data: results }))
}

/// Pre-test against post-test outcomes of a course, with its survey ratings.
#[derive(Debug, Serialize)]
pub struct CourseQuizComparison {
    pub course_id: DbId,
    #[serde(flatten)]
    pub comparison: QuizComparison,
    pub satisfaction: SatisfactionSummary,
}

/// GET /api/v1/courses/{id}/quiz-comparison
pub async fn course_comparison(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(course_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_course_exists(&state.pool, course_id).await?;
    let pool = &state.pool;
    let (pre, post) = (QuizType::Pre.as_str(), QuizType::Post.as_str());

    let pre_scores = QuizAttemptRepo::scores_for_course(pool, course_id, pre).await?;
    let post_scores = QuizAttemptRepo::scores_for_course(pool, course_id, post).await?;
    let pre_outcomes = QuizAttemptRepo::paired_outcomes_for_course(pool, course_id, pre).await?;
    let post_outcomes = QuizAttemptRepo::paired_outcomes_for_course(pool, course_id, post).await?;
    let comparison = compare_phases(&pre_scores, &post_scores, &pre_outcomes, &post_outcomes);

    let surveys = SurveyRepo::list_for_course(pool, course_id).await?;
    let mut answers = Vec::with_capacity(surveys.len());
    for survey in &surveys {
        answers.push(SurveyResponseRepo::all_answers(pool, survey.id).await?);
    }
    let satisfaction = satisfaction(
        surveys
            .iter()
            .zip(&answers)
            .map(|(survey, answers)| (survey.question_items.0.as_slice(), answers.as_slice())),
    );

    tracing::debug!(
        course_id,
        pre_attempts = comparison.pre.attempt_count,
        post_attempts = comparison.post.attempt_count,
        "Built quiz comparison"
    );
    Ok(Json(DataResponse {
        data: CourseQuizComparison {
            course_id,
            comparison,
            satisfaction,
        },
    }))
}
