//! Handlers for `/surveys` (deployed survey instances) and their responses.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tnc_core::error::CoreError;
use tnc_core::pagination::Page;
use tnc_core::survey::{
    analyze, build_snapshot, validate_status_transition, validate_window, BankQuestion,
    DeployOption, SurveyQuestionType, SurveyStatus,
};
use tnc_core::types::DbId;
use tnc_core::validation::validate;
use tnc_db::models::survey::{
    CreateSurvey, NewSurvey, SetSurveyStatus, Survey, SurveyFilter, UpdateSurvey,
};
use tnc_db::repositories::{SurveyQuestionRepo, SurveyRepo, SurveyResponseRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::courses::ensure_course_exists;
use crate::handlers::survey_catalogs::ensure_survey_catalog_exists;
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_survey_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Survey> {
    SurveyRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        })
    })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/surveys
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(filter): Query<SurveyFilter>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = filter.status.as_deref() {
        SurveyStatus::parse(status)?;
    }
    let limit = page.limit();
    let rows = SurveyRepo::list(&state.pool, &filter, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |s| s.id),
    }))
}

/// POST /api/v1/surveys
///
/// Copies the template's questions into the survey so later bank edits do
/// not change what respondents see.
pub async fn create(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Json(input): Json<CreateSurvey>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_window(input.start_date, input.end_date)?;
    if let Some(course_id) = input.course_id {
        ensure_course_exists(&state.pool, course_id).await?;
    }
    let template = ensure_survey_catalog_exists(&state.pool, input.survey_catalog_id).await?;
    if !template.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Survey template {} is not active",
            template.id
        ))));
    }

    let ids: Vec<DbId> = template.question_items.iter().map(|i| i.question_id).collect();
    let bank = SurveyQuestionRepo::find_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|q| {
            Ok(BankQuestion {
                id: q.id,
                content: q.content,
                question_type: SurveyQuestionType::parse(&q.question_type)?,
                options: q.options.0,
                required: q.required,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;
    let snapshot = build_snapshot(&template.question_items, &bank)?;
    if snapshot.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Survey template {} has no questions",
            template.id
        ))));
    }

    let deploy_option = input.deploy_option.unwrap_or(DeployOption::Manual);
    let new = NewSurvey {
        survey_catalog_id: template.id,
        course_id: input.course_id,
        title: input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| template.title.clone()),
        description: input.description.or_else(|| template.description.clone()),
        status: deploy_option.initial_status().as_str(),
        deploy_option: deploy_option.as_str(),
        deploy_when: input.deploy_when.map(|w| w.as_str()),
        start_date: input.start_date,
        end_date: input.end_date,
        send_reminders: input.send_reminders.unwrap_or(false),
        send_notifications: input.send_notifications.unwrap_or(false),
        total_participants: input.total_participants.unwrap_or(0),
        question_items: snapshot,
    };
    let survey = SurveyRepo::create(&state.pool, &new).await?;
    tracing::info!(
        id = survey.id,
        survey_catalog_id = survey.survey_catalog_id,
        status = %survey.status,
        "Survey created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: survey })))
}

/// GET /api/v1/surveys/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let survey = ensure_survey_exists(&state.pool, id).await?;
    Ok(Json(DataResponse { data: survey }))
}

/// PUT /api/v1/surveys/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSurvey>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let existing = ensure_survey_exists(&state.pool, id).await?;
    validate_window(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
    )?;

    let survey = SurveyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;
    Ok(Json(DataResponse { data: survey }))
}

/// DELETE /api/v1/surveys/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SurveyRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }));
    }
    tracing::info!(id, "Survey deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/surveys/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<SetSurveyStatus>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_survey_exists(&state.pool, id).await?;
    let next = validate_status_transition(&existing.status, &input.status)?;
    let survey = SurveyRepo::set_status(&state.pool, id, next.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id,
        }))?;
    tracing::info!(id, from = %existing.status, to = %survey.status, "Survey status changed");
    Ok(Json(DataResponse { data: survey }))
}

// ---------------------------------------------------------------------------
// Responses & analytics
// ---------------------------------------------------------------------------

/// GET /api/v1/surveys/{id}/responses
pub async fn list_responses(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
    Query(page): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    ensure_survey_exists(&state.pool, id).await?;
    let limit = page.limit();
    let rows = SurveyResponseRepo::list_for_survey(&state.pool, id, page.cursor()?, limit).await?;
    Ok(Json(DataResponse {
        data: Page::from_rows(rows, limit, |r| r.id),
    }))
}

/// GET /api/v1/surveys/{id}/responses/{response_id}
pub async fn get_response(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((id, response_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let response = SurveyResponseRepo::find(&state.pool, id, response_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SurveyResponse",
            id: response_id,
        }))?;
    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/surveys/{id}/responses/{response_id}
///
/// The survey's counters drop with the response.
pub async fn delete_response(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((id, response_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !SurveyResponseRepo::delete(&state.pool, id, response_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "SurveyResponse",
            id: response_id,
        }));
    }
    tracing::info!(survey_id = id, response_id, "Survey response deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/surveys/{id}/analytics
pub async fn analytics(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let survey = ensure_survey_exists(&state.pool, id).await?;
    let answers = SurveyResponseRepo::all_answers(&state.pool, id).await?;
    let report = analyze(&survey.question_items, &answers);
    Ok(Json(DataResponse { data: report }))
}
