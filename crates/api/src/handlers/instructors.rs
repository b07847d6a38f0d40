//! Handlers for `/instructors`. Writes are admin only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::instructor::{
    CreateInstructor, InstructorFilter, SetInstructorStatus, UpdateInstructor, INSTRUCTOR_ACTIVE,
    INSTRUCTOR_INACTIVE,
};
use tnc_db::repositories::InstructorRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Instructor",
        id,
    })
}

fn validate_status(status: &str) -> AppResult<()> {
    if status != INSTRUCTOR_ACTIVE && status != INSTRUCTOR_INACTIVE {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid instructor status '{status}'. Must be one of: \
             {INSTRUCTOR_ACTIVE}, {INSTRUCTOR_INACTIVE}"
        ))));
    }
    Ok(())
}

/// GET /api/v1/instructors
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<InstructorFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = filter.status.as_deref() {
        validate_status(status)?;
    }
    let limit = page.limit();
    let rows = InstructorRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |i| i.id),
    }))
}

/// POST /api/v1/instructors
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(mut input): Json<CreateInstructor>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    input.specialties = normalize_tags(&input.specialties);

    let instructor = InstructorRepo::create(&state.pool, &input).await?;
    tracing::info!(id = instructor.id, "Instructor created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: instructor })))
}

/// GET /api/v1/instructors/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let instructor = InstructorRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: instructor }))
}

/// PUT /api/v1/instructors/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateInstructor>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    if let Some(status) = input.status.as_deref() {
        validate_status(status)?;
    }
    input.specialties = input.specialties.as_deref().map(normalize_tags);

    let instructor = InstructorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: instructor }))
}

/// PUT /api/v1/instructors/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetInstructorStatus>,
) -> AppResult<impl IntoResponse> {
    validate_status(&input.status)?;
    let instructor = InstructorRepo::set_status(&state.pool, id, &input.status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(id, status = %instructor.status, "Instructor status changed");
    Ok(Json(DataResponse { data: instructor }))
}

/// DELETE /api/v1/instructors/{id}
///
/// Courses and events keep their rows; their instructor link is cleared.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !InstructorRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
