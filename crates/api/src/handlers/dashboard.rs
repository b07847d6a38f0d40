//! Handlers for `/dashboard`.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use tnc_core::calendar::upcoming_range;
use tnc_core::dashboard::rate;
use tnc_core::keys::metric_key;
use tnc_core::pagination::Page;
use tnc_core::validation::validate;
use tnc_db::models::dashboard::{DashboardSummary, MetricFilter, MetricWithTrend, UpsertMetric};
use tnc_db::repositories::{CalendarRepo, DashboardRepo, QuizAttemptRepo, SurveyResponseRepo};

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Window for the quiz figures of the summary.
const QUIZ_WINDOW_DAYS: i64 = 30;

/// PUT /api/v1/dashboard/metrics
///
/// Upserts by `(metric_type, time_frame#entity_id)`; the replaced value
/// becomes `previous_value`.
pub async fn upsert_metric(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(input): Json<UpsertMetric>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let key = metric_key(input.time_frame.trim(), input.entity_id.trim())?;
    let metric = DashboardRepo::upsert(&state.pool, &input, &key).await?;
    tracing::debug!(metric_type = %metric.metric_type, key = %metric.metric_key, "Metric stored");
    Ok(Json(DataResponse {
        data: MetricWithTrend::from(metric),
    }))
}

/// GET /api/v1/dashboard/metrics
pub async fn list_metrics(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<MetricFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let limit = page.limit();
    let rows = DashboardRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |m| m.id).map(MetricWithTrend::from),
    }))
}

/// GET /api/v1/dashboard/summary
///
/// Computed live on every request.
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<impl IntoResponse> {
    let courses_by_status = DashboardRepo::courses_by_status(&state.pool).await?;
    let (active_catalogs, customers, instructors) =
        DashboardRepo::entity_counts(&state.pool).await?;

    let now = Utc::now();
    let (from, to) = upcoming_range(now.date_naive(), None);
    let upcoming_events = CalendarRepo::count_between(&state.pool, from, to).await?;

    let (attempts, passed) =
        QuizAttemptRepo::totals_since(&state.pool, now - Duration::days(QUIZ_WINDOW_DAYS)).await?;
    let survey_responses = SurveyResponseRepo::count_all(&state.pool).await?;

    Ok(Json(DataResponse {
        data: DashboardSummary {
            courses_by_status,
            active_catalogs,
            customers,
            instructors,
            upcoming_events,
            quiz_attempts_30d: attempts,
            quiz_pass_rate_30d: rate(passed, attempts),
            survey_responses,
        },
    }))
}
