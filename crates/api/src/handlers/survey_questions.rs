//! Handlers for `/survey-questions` (survey question bank).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::survey::{validate_survey_question, SurveyQuestionType};
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::survey_question::{
    CreateSurveyQuestion, SurveyQuestion, SurveyQuestionFilter, UpdateSurveyQuestion,
};
use tnc_db::repositories::SurveyQuestionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_question_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<SurveyQuestion> {
    SurveyQuestionRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "SurveyQuestion",
            id,
        })
    })
}

/// GET /api/v1/survey-questions
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<SurveyQuestionFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(t) = filter.question_type.as_deref() {
        SurveyQuestionType::parse(t)?;
    }
    let limit = page.limit();
    let rows = SurveyQuestionRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |q| q.id),
    }))
}

/// POST /api/v1/survey-questions
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(mut input): Json<CreateSurveyQuestion>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let question_type = SurveyQuestionType::parse(&input.question_type)?;
    validate_survey_question(question_type, &input.options)?;
    input.tags = normalize_tags(&input.tags);

    let question = SurveyQuestionRepo::create(&state.pool, &input).await?;
    tracing::info!(id = question.id, question_type = %question.question_type, "Survey question created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: question })))
}

/// GET /api/v1/survey-questions/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let question = ensure_question_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: question }))
}

/// PUT /api/v1/survey-questions/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSurveyQuestion>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let existing = ensure_question_exists(&state.pool, id).await?;
    let question_type = SurveyQuestionType::parse(
        input
            .question_type
            .as_deref()
            .unwrap_or(&existing.question_type),
    )?;
    validate_survey_question(
        question_type,
        input.options.as_deref().unwrap_or(&existing.options.0),
    )?;
    if let Some(tags) = input.tags.as_mut() {
        *tags = normalize_tags(tags);
    }

    let question = SurveyQuestionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SurveyQuestion",
            id,
        }))?;
    Ok(Json(DataResponse { data: question }))
}

/// DELETE /api/v1/survey-questions/{id}
///
/// Deployed surveys keep their snapshot copy of the question.
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SurveyQuestionRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SurveyQuestion",
            id,
        }));
    }
    tracing::info!(id, "Survey question deleted");
    Ok(StatusCode::NO_CONTENT)
}
