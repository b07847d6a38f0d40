//! Handlers for `/customers`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::customer::{CreateCustomer, Customer, CustomerFilter, UpdateCustomer};
use tnc_db::repositories::CustomerRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_customer_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Customer> {
    CustomerRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        })
    })
}

/// GET /api/v1/customers
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<CustomerFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let limit = page.limit();
    let rows = CustomerRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |c| c.id),
    }))
}

/// POST /api/v1/customers
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateCustomer>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let customer = CustomerRepo::create(&state.pool, &input).await?;
    tracing::info!(id = customer.id, by = user.user_id, "Customer created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: customer })))
}

/// GET /api/v1/customers/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let customer = ensure_customer_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: customer }))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))?;
    Ok(Json(DataResponse { data: customer }))
}

/// DELETE /api/v1/customers/{id}
///
/// Refused while any course still books this customer.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_customer_exists(&state.pool, id).await?;

    let courses = CustomerRepo::count_courses(&state.pool, id).await?;
    if courses > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Customer {id} is referenced by {courses} course(s)"
        ))));
    }

    CustomerRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Customer deleted");
    Ok(StatusCode::NO_CONTENT)
}
