//! Handlers for `/quiz-catalogs` (reusable quiz templates) and AI drafting.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::question_bank::{validate_difficulty, QuestionType};
use tnc_core::quiz::{
    total_points, validate_question_items, validate_template_difficulty, QuizQuestionItem,
    QuizType,
};
use tnc_core::quiz_generation::{question_count, to_bank_options, GeneratedQuestion};
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::question_bank::CreateQuestionBankItem;
use tnc_db::models::quiz_catalog::{
    CreateQuizCatalog, QuizCatalog, QuizCatalogFilter, UpdateQuizCatalog,
};
use tnc_db::repositories::{
    CatalogLabRepo, CatalogModuleRepo, QuestionBankRepo, QuizCatalogRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::catalogs::ensure_catalog_exists;
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::services::quiz_generator::GenerationRequest;
use crate::state::AppState;

pub(crate) async fn ensure_quiz_catalog_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<QuizCatalog> {
    QuizCatalogRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "QuizCatalog",
            id,
        })
    })
}

/// Check the items and compute the template's total from the bank.
///
/// Every referenced question must exist.
async fn resolve_total_points(pool: &sqlx::PgPool, items: &[QuizQuestionItem]) -> AppResult<i32> {
    validate_question_items(items)?;
    let ids: Vec<DbId> = items.iter().map(|i| i.question_id).collect();
    let bank: HashMap<DbId, i32> = QuestionBankRepo::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q.points))
        .collect();
    if let Some(missing) = ids.iter().find(|id| !bank.contains_key(id)) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Question {missing} does not exist"
        ))));
    }
    Ok(total_points(items, &bank))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/quiz-catalogs
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<QuizCatalogFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    validate_template_difficulty(filter.difficulty.as_deref())?;
    let limit = page.limit();
    let rows = QuizCatalogRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |q| q.id),
    }))
}

/// POST /api/v1/quiz-catalogs
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(mut input): Json<CreateQuizCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_template_difficulty(input.difficulty.as_deref())?;
    let points = resolve_total_points(&state.pool, &input.question_items).await?;
    input.tags = normalize_tags(&input.tags);

    let quiz = QuizCatalogRepo::create(&state.pool, &input, points, Some(user.user_id)).await?;
    tracing::info!(
        id = quiz.id,
        questions = quiz.question_items.len(),
        total_points = quiz.total_points,
        "Quiz template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: quiz })))
}

/// GET /api/v1/quiz-catalogs/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let quiz = ensure_quiz_catalog_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: quiz }))
}

/// PUT /api/v1/quiz-catalogs/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateQuizCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_template_difficulty(input.difficulty.as_deref())?;
    ensure_quiz_catalog_exists(&state.pool, id).await?;

    let points = match input.question_items.as_deref() {
        Some(items) => Some(resolve_total_points(&state.pool, items).await?),
        None => None,
    };
    if let Some(tags) = input.tags.as_mut() {
        *tags = normalize_tags(tags);
    }

    let quiz = QuizCatalogRepo::update(&state.pool, id, &input, points)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuizCatalog",
            id,
        }))?;
    Ok(Json(DataResponse { data: quiz }))
}

/// DELETE /api/v1/quiz-catalogs/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_quiz_catalog_exists(&state.pool, id).await?;
    let in_use = QuizCatalogRepo::count_course_quizzes(&state.pool, id).await?;
    if in_use > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Quiz template {id} is used by {in_use} course quiz(zes)"
        ))));
    }
    QuizCatalogRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Quiz template deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// AI drafting
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub catalog_id: DbId,
    pub quiz_type: QuizType,
    pub count: Option<usize>,
    /// Free-form instructions appended to the prompt.
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuizResponse {
    pub catalog_id: DbId,
    pub quiz_type: QuizType,
    pub questions: Vec<GeneratedQuestion>,
}

/// POST /api/v1/quiz-catalogs/generate
///
/// Drafts questions from a catalog entry's modules and labs. Nothing is
/// persisted.
pub async fn generate(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(input): Json<GenerateQuizRequest>,
) -> AppResult<impl IntoResponse> {
    let catalog = ensure_catalog_exists(&state.pool, input.catalog_id).await?;
    let modules = CatalogModuleRepo::list_for_catalog(&state.pool, catalog.id).await?;
    let labs = CatalogLabRepo::list_for_catalog(&state.pool, catalog.id).await?;

    let topics: Vec<String> = modules.iter().map(|m| m.title.clone()).collect();
    let mut content: Vec<String> = Vec::new();
    content.extend(catalog.description.iter().cloned());
    for module in &modules {
        content.push(module.title.clone());
        content.extend(module.description.iter().cloned());
    }
    for lab in &labs {
        content.push(lab.title.clone());
        content.extend(lab.description.iter().cloned());
        content.extend(lab.content.iter().cloned());
    }

    let request = GenerationRequest {
        catalog_title: catalog.title.clone(),
        topics,
        content,
        quiz_type: input.quiz_type,
        count: question_count(input.count),
        context: input.context,
    };
    let questions = state.quiz_generator.generate(&request).await?;
    tracing::info!(
        catalog_id = catalog.id,
        quiz_type = input.quiz_type.as_str(),
        drafted = questions.len(),
        "Quiz questions drafted"
    );
    Ok(Json(DataResponse {
        data: GenerateQuizResponse {
            catalog_id: catalog.id,
            quiz_type: input.quiz_type,
            questions,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct SaveGeneratedRequest {
    pub questions: Vec<GeneratedQuestion>,
    /// Points per saved question; bank default when absent.
    pub points: Option<i32>,
}

/// POST /api/v1/quiz-catalogs/{id}/generated-questions
///
/// Saves accepted drafts to the bank and appends them to the template in
/// one transaction.
pub async fn save_generated(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<SaveGeneratedRequest>,
) -> AppResult<impl IntoResponse> {
    if input.questions.is_empty() {
        return Err(AppError::BadRequest("No questions to save".into()));
    }
    if input.points.is_some_and(|p| p < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "points must be at least 1".into(),
        )));
    }
    let quiz = ensure_quiz_catalog_exists(&state.pool, id).await?;

    let mut drafts = Vec::with_capacity(input.questions.len());
    for question in &input.questions {
        let (options, correct_answer) = to_bank_options(question)?;
        let difficulty = question
            .difficulty
            .clone()
            .filter(|d| validate_difficulty(Some(d)).is_ok());
        drafts.push(CreateQuestionBankItem {
            content: question.question.trim().to_string(),
            question_type: QuestionType::MultipleChoice.as_str().to_string(),
            options,
            correct_answer,
            explanation: question.explanation.clone(),
            difficulty,
            tags: normalize_tags(&question.tags),
            points: input.points,
            catalog_id: quiz.catalog_id,
            metadata: Some(serde_json::json!({ "source": "generated" })),
        });
    }

    let mut items = quiz.question_items.0.clone();
    let mut next_order = items.iter().map(|i| i.order).max().unwrap_or(0);

    let mut tx = state.pool.begin().await?;
    for draft in &drafts {
        let saved = QuestionBankRepo::create(&mut *tx, draft).await?;
        next_order += 1;
        items.push(QuizQuestionItem {
            question_id: saved.id,
            order: next_order,
            points: None,
        });
    }
    // New rows are only visible inside the transaction.
    let ids: Vec<DbId> = items.iter().map(|i| i.question_id).collect();
    let bank: HashMap<DbId, i32> = QuestionBankRepo::find_by_ids(&mut *tx, &ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q.points))
        .collect();
    let points = total_points(&items, &bank);
    let updated = QuizCatalogRepo::set_questions(&mut *tx, id, &items, points)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuizCatalog",
            id,
        }))?;
    tx.commit().await?;

    tracing::info!(id, saved = drafts.len(), total_points = points, "Generated questions saved");
    Ok((StatusCode::CREATED, Json(DataResponse { data: updated })))
}
