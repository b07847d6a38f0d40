//! Handlers for `/survey-catalogs` (reusable survey templates).

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::survey::{validate_survey_items, SurveyQuestionItem};
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::survey_catalog::{
    CreateSurveyCatalog, SurveyCatalog, SurveyCatalogFilter, UpdateSurveyCatalog,
};
use tnc_db::repositories::{SurveyCatalogRepo, SurveyQuestionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn ensure_survey_catalog_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<SurveyCatalog> {
    SurveyCatalogRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "SurveyCatalog",
            id,
        })
    })
}

/// Every item must point at an existing survey question.
async fn check_items(pool: &sqlx::PgPool, items: &[SurveyQuestionItem]) -> AppResult<()> {
    validate_survey_items(items)?;
    let ids: Vec<DbId> = items.iter().map(|i| i.question_id).collect();
    let found: HashSet<DbId> = SurveyQuestionRepo::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|q| q.id)
        .collect();
    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Survey question {missing} does not exist"
        ))));
    }
    Ok(())
}

/// GET /api/v1/survey-catalogs
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<SurveyCatalogFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let limit = page.limit();
    let rows = SurveyCatalogRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |s| s.id),
    }))
}

/// POST /api/v1/survey-catalogs
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(mut input): Json<CreateSurveyCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    check_items(&state.pool, &input.question_items).await?;
    input.tags = normalize_tags(&input.tags);

    let catalog = SurveyCatalogRepo::create(&state.pool, &input, Some(user.user_id)).await?;
    tracing::info!(
        id = catalog.id,
        questions = catalog.question_items.len(),
        "Survey template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: catalog })))
}

/// GET /api/v1/survey-catalogs/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let catalog = ensure_survey_catalog_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: catalog }))
}

/// PUT /api/v1/survey-catalogs/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateSurveyCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    ensure_survey_catalog_exists(&state.pool, id).await?;
    if let Some(items) = input.question_items.as_deref() {
        check_items(&state.pool, items).await?;
    }
    if let Some(tags) = input.tags.as_mut() {
        *tags = normalize_tags(tags);
    }

    let catalog = SurveyCatalogRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SurveyCatalog",
            id,
        }))?;
    Ok(Json(DataResponse { data: catalog }))
}

/// DELETE /api/v1/survey-catalogs/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_survey_catalog_exists(&state.pool, id).await?;
    let deployed = SurveyCatalogRepo::count_surveys(&state.pool, id).await?;
    if deployed > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Survey template {id} has {deployed} deployed survey(s)"
        ))));
    }
    SurveyCatalogRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Survey template deleted");
    Ok(StatusCode::NO_CONTENT)
}
