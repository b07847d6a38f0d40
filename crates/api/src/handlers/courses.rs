//! Handlers for `/courses` (scheduled course instances).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tnc_core::calendar::{validate_time_range, EventType};
use tnc_core::catalog::ensure_schedulable;
use tnc_core::course::{
    generate_share_code, normalize_share_code, validate_date_range, validate_seats,
    validate_transition, CourseStatus,
};
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::calendar::CreateCalendarEvent;
use tnc_db::models::course::{Course, CourseFilter, CreateCourse, UpdateCourse};
use tnc_db::repositories::{CalendarRepo, CatalogRepo, CourseRepo, InstructorRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Attempts at drawing an unused share code before giving up.
const SHARE_CODE_ATTEMPTS: usize = 8;

const SHARE_CODE_CONSTRAINT: &str = "uq_courses_share_code";

const DEFAULT_CLASS_START: &str = "09:00";
const DEFAULT_CLASS_END: &str = "18:00";

pub(crate) async fn ensure_course_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        })
    })
}

/// Resolve a student-facing share code to its course.
pub(crate) async fn course_by_share_code(pool: &sqlx::PgPool, code: &str) -> AppResult<Course> {
    let code = normalize_share_code(code)?;
    CourseRepo::find_by_share_code(pool, &code)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundByKey {
            entity: "Course",
            key: code,
        }))
}

/// Insert a course under a freshly drawn share code. A draw that collides
/// with an existing code fails on `uq_courses_share_code` and is redrawn.
async fn create_with_share_code(
    pool: &sqlx::PgPool,
    input: &CreateCourse,
    mut next_code: impl FnMut() -> String,
) -> AppResult<Course> {
    for attempt in 1..=SHARE_CODE_ATTEMPTS {
        let code = next_code();
        match CourseRepo::create(pool, input, &code).await {
            Ok(course) => return Ok(course),
            Err(err) if is_share_code_collision(&err) => {
                tracing::warn!(attempt, "Share code already taken, drawing another");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(AppError::InternalError(
        "Could not allocate an unused share code".into(),
    ))
}

fn is_share_code_collision(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(SHARE_CODE_CONSTRAINT)
    )
}

async fn ensure_catalog_schedulable(pool: &sqlx::PgPool, catalog_id: DbId) -> AppResult<()> {
    let catalog = CatalogRepo::find_by_id(pool, catalog_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Catalog entry {catalog_id} does not exist"
        )))
    })?;
    ensure_schedulable(&catalog.status)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/courses
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<CourseFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = filter.status.as_deref() {
        CourseStatus::parse(status)?;
    }
    let limit = page.limit();
    let rows = CourseRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |c| c.id),
    }))
}

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateCourse>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_date_range(input.start_date, input.end_date)?;
    validate_seats(input.max_seats, input.current_seats)?;
    if let Some(status) = input.status.as_deref() {
        CourseStatus::parse(status)?;
    }
    ensure_catalog_schedulable(&state.pool, input.catalog_id).await?;

    let course = create_with_share_code(&state.pool, &input, generate_share_code).await?;
    tracing::info!(
        id = course.id,
        share_code = %course.share_code,
        by = user.user_id,
        "Course created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let course = ensure_course_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: course }))
}

/// GET /api/v1/courses/by-share-code/{code}
///
/// Public: students reach their course by the code the instructor hands out.
pub async fn get_by_share_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let course = course_by_share_code(&state.pool, &code).await?;
    Ok(Json(DataResponse { data: course }))
}

/// PUT /api/v1/courses/{id}
///
/// Date and seat rules are checked against the merged result; a status
/// change must follow the lifecycle.
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let existing = ensure_course_exists(&state.pool, id).await?;

    validate_date_range(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.or(existing.end_date),
    )?;
    validate_seats(
        input.max_seats.or(existing.max_seats),
        Some(input.current_seats.unwrap_or(existing.current_seats)),
    )?;
    if let Some(status) = input.status.as_deref() {
        validate_transition(&existing.status, status)?;
    }
    if let Some(catalog_id) = input.catalog_id.filter(|c| *c != existing.catalog_id) {
        ensure_catalog_schedulable(&state.pool, catalog_id).await?;
    }

    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: course }))
}

/// DELETE /api/v1/courses/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CourseRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }));
    }
    tracing::info!(id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SetCourseStatus {
    pub status: String,
}

/// PUT /api/v1/courses/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<SetCourseStatus>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_course_exists(&state.pool, id).await?;
    let next = validate_transition(&existing.status, &input.status)?;

    let update = UpdateCourse {
        status: Some(next.as_str().to_string()),
        ..Default::default()
    };
    let course = CourseRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    tracing::info!(id, from = %existing.status, to = %course.status, "Course status changed");
    Ok(Json(DataResponse { data: course }))
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Optional body of `POST /courses/{id}/calendar`.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCalendarRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_registration_open: Option<bool>,
}

/// POST /api/v1/courses/{id}/calendar
///
/// Creates a CLASS event on the course's start date and flags the course.
pub async fn add_to_calendar(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    body: Option<Json<AddToCalendarRequest>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    let course = ensure_course_exists(&state.pool, id).await?;
    if course.is_added_to_calendar {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Course {id} is already on the calendar"
        ))));
    }

    let start_time = input
        .start_time
        .unwrap_or_else(|| DEFAULT_CLASS_START.to_string());
    let end_time = input
        .end_time
        .unwrap_or_else(|| DEFAULT_CLASS_END.to_string());
    validate_time_range(&start_time, &end_time)?;

    let instructor_name = match course.instructor_id {
        Some(instructor_id) => InstructorRepo::find_by_id(&state.pool, instructor_id)
            .await?
            .map(|i| i.name),
        None => None,
    };

    let event = CreateCalendarEvent {
        date: course.start_date,
        title: course.title.clone(),
        title_ko: None,
        title_en: None,
        start_time,
        end_time,
        location: course.location.clone(),
        location_ko: None,
        location_en: None,
        description: course.description.clone(),
        description_ko: None,
        description_en: None,
        instructor_name,
        instructor_id: course.instructor_id,
        max_attendees: course.max_seats,
        current_attendees: Some(course.current_seats),
        event_type: Some(EventType::Class.as_str().to_string()),
        tags: Vec::new(),
        is_registration_open: input.is_registration_open,
        course_id: Some(course.id),
    };

    let created = CalendarRepo::create_for_course(&state.pool, course.id, &event).await?;
    tracing::info!(course_id = course.id, event_id = created.id, "Course added to calendar");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    async fn course_input(pool: &sqlx::PgPool) -> CreateCourse {
        let customer_id: DbId =
            sqlx::query_scalar("INSERT INTO customers (customer_name) VALUES ('Acme') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();
        let catalog_id: DbId = sqlx::query_scalar(
            "INSERT INTO course_catalogs (title) VALUES ('Cloud Essentials') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        CreateCourse {
            catalog_id,
            customer_id,
            instructor_id: None,
            title: "Cloud Essentials for Acme".into(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end_date: None,
            location: None,
            status: None,
            max_seats: None,
            current_seats: None,
        }
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn taken_share_code_is_redrawn(pool: sqlx::PgPool) {
        let input = course_input(&pool).await;
        CourseRepo::create(&pool, &input, "QWE234").await.unwrap();

        let mut draws = ["QWE234", "QWE234", "ZXC567"].into_iter();
        let course = create_with_share_code(&pool, &input, || {
            draws.next().unwrap().to_string()
        })
        .await
        .unwrap();
        assert_eq!(course.share_code, "ZXC567");
        assert_eq!(draws.next(), None);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn gives_up_after_repeated_collisions(pool: sqlx::PgPool) {
        let input = course_input(&pool).await;
        CourseRepo::create(&pool, &input, "QWE234").await.unwrap();

        let mut draws = 0;
        let result = create_with_share_code(&pool, &input, || {
            draws += 1;
            "QWE234".to_string()
        })
        .await;
        assert_matches!(result, Err(AppError::InternalError(_)));
        assert_eq!(draws, SHARE_CODE_ATTEMPTS);
    }

    #[sqlx::test(migrations = "../db/migrations")]
    async fn other_insert_failures_are_not_retried(pool: sqlx::PgPool) {
        let mut input = course_input(&pool).await;
        input.customer_id = 999_999;

        let mut draws = 0;
        let result = create_with_share_code(&pool, &input, || {
            draws += 1;
            "QWE234".to_string()
        })
        .await;
        assert_matches!(result, Err(AppError::Database(_)));
        assert_eq!(draws, 1);
    }
}
