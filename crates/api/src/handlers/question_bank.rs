//! Handlers for `/question-bank` (quiz question items).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::question_bank::{validate_difficulty, validate_question, QuestionType};
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::question_bank::{
    CreateQuestionBankItem, QuestionBankFilter, QuestionBankItem, UpdateQuestionBankItem,
};
use tnc_db::repositories::QuestionBankRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_item_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<QuestionBankItem> {
    QuestionBankRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "QuestionBankItem",
            id,
        })
    })
}

/// GET /api/v1/question-bank
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<QuestionBankFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(t) = filter.question_type.as_deref() {
        QuestionType::parse(t)?;
    }
    validate_difficulty(filter.difficulty.as_deref())?;
    let limit = page.limit();
    let rows = QuestionBankRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |q| q.id),
    }))
}

/// POST /api/v1/question-bank
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(mut input): Json<CreateQuestionBankItem>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let question_type = QuestionType::parse(&input.question_type)?;
    validate_question(question_type, &input.options, &input.correct_answer)?;
    validate_difficulty(input.difficulty.as_deref())?;
    input.tags = normalize_tags(&input.tags);

    let item = QuestionBankRepo::create(&state.pool, &input).await?;
    tracing::info!(id = item.id, question_type = %item.question_type, "Question bank item created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/question-bank/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = ensure_item_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: item }))
}

/// PUT /api/v1/question-bank/{id}
///
/// Type, options and answer are re-checked together after merging.
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateQuestionBankItem>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_difficulty(input.difficulty.as_deref())?;
    let existing = ensure_item_exists(&state.pool, id).await?;

    let question_type =
        QuestionType::parse(input.question_type.as_deref().unwrap_or(&existing.question_type))?;
    let options = input.options.as_ref().unwrap_or(&existing.options.0);
    let correct_answer = input
        .correct_answer
        .as_ref()
        .unwrap_or(&existing.correct_answer.0);
    validate_question(question_type, options, correct_answer)?;
    if let Some(tags) = input.tags.as_mut() {
        *tags = normalize_tags(tags);
    }

    let item = QuestionBankRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuestionBankItem",
            id,
        }))?;
    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/question-bank/{id}
///
/// Refused while a quiz template still references the item.
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_item_exists(&state.pool, id).await?;
    if QuestionBankRepo::is_referenced(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Question {id} is used by a quiz template"
        ))));
    }
    QuestionBankRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Question bank item deleted");
    Ok(StatusCode::NO_CONTENT)
}
