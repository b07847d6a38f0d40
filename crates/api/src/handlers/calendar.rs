//! Handlers for `/calendar` (events, recurring series and registrations).
//!
//! Read endpoints accept `?locale=ko|en` and return localized titles,
//! locations and descriptions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tnc_core::calendar::{
    expand_recurrence, upcoming_range, validate_attendees, validate_time_range, EventType,
};
use tnc_core::catalog::normalize_tags;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::calendar::{
    CalendarEvent, CalendarFilter, CreateCalendarEvent, CreateRecurringEvents,
    SetRegistrationStatus, UpdateCalendarEvent,
};
use tnc_db::repositories::CalendarRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::{LocaleParams, PageParams};
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_event_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<CalendarEvent> {
    CalendarRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        })
    })
}

/// Shared checks for a new event; normalizes tags in place.
fn check_new_event(input: &mut CreateCalendarEvent) -> AppResult<()> {
    validate(&*input)?;
    validate_time_range(&input.start_time, &input.end_time)?;
    validate_attendees(input.max_attendees, input.current_attendees)?;
    if let Some(event_type) = input.event_type.as_deref() {
        EventType::parse(event_type)?;
    }
    input.tags = normalize_tags(&input.tags);
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/calendar
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<CalendarFilter>,
    Query(page): Query<PageParams>,
    Query(locale): Query<LocaleParams>,
) -> AppResult<impl IntoResponse> {
    let locale = locale.locale()?;
    if let Some(event_type) = filter.event_type.as_deref() {
        EventType::parse(event_type)?;
    }
    let limit = page.limit();
    let rows = CalendarRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |e| e.id).map(|e| e.localized(locale)),
    }))
}

/// POST /api/v1/calendar
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(mut input): Json<CreateCalendarEvent>,
) -> AppResult<impl IntoResponse> {
    check_new_event(&mut input)?;
    let event = CalendarRepo::create(&state.pool, &input).await?;
    tracing::info!(id = event.id, date = %event.date, "Calendar event created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/calendar/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
    Query(locale): Query<LocaleParams>,
) -> AppResult<impl IntoResponse> {
    let locale = locale.locale()?;
    let event = ensure_event_exists(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: event.localized(locale),
    }))
}

/// PUT /api/v1/calendar/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateCalendarEvent>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let existing = ensure_event_exists(&state.pool, id).await?;
    validate_time_range(
        input.start_time.as_deref().unwrap_or(&existing.start_time),
        input.end_time.as_deref().unwrap_or(&existing.end_time),
    )?;
    validate_attendees(
        input.max_attendees.or(existing.max_attendees),
        Some(existing.current_attendees),
    )?;
    if let Some(event_type) = input.event_type.as_deref() {
        EventType::parse(event_type)?;
    }
    if let Some(tags) = input.tags.as_mut() {
        *tags = normalize_tags(tags);
    }

    let event = CalendarRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        }))?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/calendar/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CalendarRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        }));
    }
    tracing::info!(id, "Calendar event deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingParams {
    pub days: Option<i64>,
}

/// GET /api/v1/calendar/upcoming
pub async fn upcoming(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(params): Query<UpcomingParams>,
    Query(locale): Query<LocaleParams>,
) -> AppResult<impl IntoResponse> {
    let locale = locale.locale()?;
    let (from, to) = upcoming_range(Utc::now().date_naive(), params.days);
    let events: Vec<CalendarEvent> = CalendarRepo::list_between(&state.pool, from, to)
        .await?
        .into_iter()
        .map(|e| e.localized(locale))
        .collect();
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/v1/calendar/recurring
///
/// All occurrences are created in one transaction and share a recurrence
/// group id.
pub async fn create_recurring(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(mut input): Json<CreateRecurringEvents>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    check_new_event(&mut input.event)?;
    let dates = expand_recurrence(
        input.start_date,
        input.end_date,
        input.pattern,
        &input.days_of_week,
    )?;

    let group = uuid::Uuid::new_v4().to_string();
    let events = CalendarRepo::create_series(&state.pool, &dates, &input.event, &group).await?;
    tracing::info!(
        recurrence_group = %group,
        occurrences = events.len(),
        "Recurring calendar events created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: events })))
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

/// POST /api/v1/calendar/{id}/registrations
///
/// Registers the calling user. Closed or full events and repeat
/// registrations are conflicts.
pub async fn register(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = ensure_event_exists(&state.pool, id).await?;
    let registration = CalendarRepo::register(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| {
            let reason = if event.is_registration_open {
                "Event is full"
            } else {
                "Registration for this event is closed"
            };
            AppError::Core(CoreError::Conflict(reason.into()))
        })?;
    tracing::info!(event_id = id, user_id = user.user_id, "Event registration created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: registration })))
}

/// DELETE /api/v1/calendar/{id}/registrations
pub async fn unregister(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CalendarRepo::unregister(&state.pool, id, user.user_id).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "EventRegistration",
            key: format!("{id}/{}", user.user_id),
        }));
    }
    tracing::info!(event_id = id, user_id = user.user_id, "Event registration cancelled");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/calendar/my-registrations
pub async fn my_registrations(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(locale): Query<LocaleParams>,
) -> AppResult<impl IntoResponse> {
    let locale = locale.locale()?;
    let events: Vec<CalendarEvent> = CalendarRepo::list_registered_events(&state.pool, user.user_id)
        .await?
        .into_iter()
        .map(|e| e.localized(locale))
        .collect();
    Ok(Json(DataResponse { data: events }))
}

#[derive(Debug, Serialize)]
pub struct RegistrationStatus {
    pub event_id: DbId,
    pub is_registration_open: bool,
    pub is_registered: bool,
    pub current_attendees: i32,
    pub max_attendees: Option<i32>,
}

/// GET /api/v1/calendar/{id}/registration-status
pub async fn registration_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = ensure_event_exists(&state.pool, id).await?;
    let is_registered = CalendarRepo::is_registered(&state.pool, id, user.user_id).await?;
    Ok(Json(DataResponse {
        data: RegistrationStatus {
            event_id: event.id,
            is_registration_open: event.is_registration_open,
            is_registered,
            current_attendees: event.current_attendees,
            max_attendees: event.max_attendees,
        },
    }))
}

/// PUT /api/v1/calendar/{id}/registration-status
pub async fn set_registration_status(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<SetRegistrationStatus>,
) -> AppResult<impl IntoResponse> {
    let event = CalendarRepo::set_registration_open(&state.pool, id, input.is_registration_open)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CalendarEvent",
            id,
        }))?;
    tracing::info!(id, open = event.is_registration_open, "Event registration status changed");
    Ok(Json(DataResponse { data: event }))
}
