//! Handlers for `/catalogs` (course catalog entries).
//!
//! Nested modules, labs and materials live in [`super::catalog_content`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::catalog::{normalize_tags, validate_status};
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::catalog::{
    CatalogFilter, CourseCatalog, CreateCourseCatalog, UpdateCourseCatalog,
};
use tnc_db::repositories::CatalogRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

pub(crate) async fn ensure_catalog_exists(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<CourseCatalog> {
    CatalogRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "CourseCatalog",
            id,
        })
    })
}

/// GET /api/v1/catalogs
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<CatalogFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    validate_status(filter.status.as_deref())?;
    let limit = page.limit();
    let rows = CatalogRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |c| c.id),
    }))
}

/// POST /api/v1/catalogs
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateCourseCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_status(input.status.as_deref())?;

    let tags = normalize_tags(&input.tags);
    let catalog = CatalogRepo::create(&state.pool, &input, &tags, Some(user.user_id)).await?;
    tracing::info!(id = catalog.id, title = %catalog.title, "Catalog entry created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: catalog })))
}

/// GET /api/v1/catalogs/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let catalog = ensure_catalog_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: catalog }))
}

/// PUT /api/v1/catalogs/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourseCatalog>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_status(input.status.as_deref())?;

    let tags = input.tags.as_deref().map(normalize_tags);
    let catalog = CatalogRepo::update(&state.pool, id, &input, tags.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseCatalog",
            id,
        }))?;
    Ok(Json(DataResponse { data: catalog }))
}

/// DELETE /api/v1/catalogs/{id}
///
/// Refused while courses are scheduled from this entry. Modules, labs and
/// material rows go with it.
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_catalog_exists(&state.pool, id).await?;

    let courses = CatalogRepo::count_courses(&state.pool, id).await?;
    if courses > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Catalog entry {id} is used by {courses} course(s)"
        ))));
    }

    CatalogRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Catalog entry deleted");
    Ok(StatusCode::NO_CONTENT)
}
