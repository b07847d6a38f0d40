//! Public learner endpoints under `/take/{share_code}`.
//!
//! Learners are not staff users: the course share code is the only
//! credential, and the learner identifies themselves with a client-chosen id.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tnc_core::error::CoreError;
use tnc_core::keys::{attempt_key, course_quiz_key, response_key, survey_response_key};
use tnc_core::question_bank::{AnswerValue, QuestionType};
use tnc_core::quiz::{
    check_window, grade_attempt, is_passed, next_attempt_number, ordered_items, shuffle,
    GradableQuestion, QuestionGrade,
};
use tnc_core::survey::{check_answers, ensure_accepting, SnapshotQuestion};
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::validate;
use tnc_db::models::course::Course;
use tnc_db::models::course_quiz::CourseQuiz;
use tnc_db::models::quiz_attempt::{
    CreateQuizAttempt, CreateQuizResponse, ATTEMPT_FAILED, ATTEMPT_PASSED,
};
use tnc_db::models::survey::Survey;
use tnc_db::models::survey_response::{CreateSurveyResponse, SubmitSurveyResponse};
use tnc_db::repositories::{
    CourseQuizRepo, QuestionBankRepo, QuizAttemptRepo, QuizCatalogRepo, SurveyRepo,
    SurveyResponseRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::courses::course_by_share_code;
use crate::response::DataResponse;
use crate::state::AppState;

/// An active quiz of the course, or 404.
async fn active_quiz(pool: &sqlx::PgPool, course: &Course, quiz_id: DbId) -> AppResult<CourseQuiz> {
    CourseQuizRepo::find_for_course(pool, course.id, quiz_id)
        .await?
        .filter(|q| q.is_active)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "CourseQuiz",
            id: quiz_id,
        }))
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: DbId,
    pub quiz_type: String,
    pub title: String,
    pub description: Option<String>,
    /// Minutes.
    pub time_limit: Option<i32>,
    pub question_count: usize,
    pub total_points: i32,
    pub max_attempts: Option<i32>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
}

/// GET /api/v1/take/{share_code}/quizzes
pub async fn list_quizzes(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let course = course_by_share_code(&state.pool, &code).await?;
    let quizzes = CourseQuizRepo::list_active_for_course(&state.pool, course.id).await?;

    let mut summaries = Vec::with_capacity(quizzes.len());
    for quiz in quizzes {
        let Some(template) = QuizCatalogRepo::find_by_id(&state.pool, quiz.quiz_catalog_id).await?
        else {
            continue;
        };
        summaries.push(QuizSummary {
            id: quiz.id,
            quiz_type: quiz.quiz_type,
            title: quiz.title.unwrap_or(template.title),
            description: template.description,
            time_limit: quiz.time_limit.or(template.default_time_limit),
            question_count: template.question_items.len(),
            total_points: template.total_points,
            max_attempts: quiz.max_attempts,
            start_at: quiz.start_at,
            end_at: quiz.end_at,
        });
    }
    Ok(Json(DataResponse { data: summaries }))
}

/// An option as shown to learners, without the correctness flag.
#[derive(Debug, Serialize)]
pub struct LearnerOption {
    pub option_id: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct LearnerQuestion {
    pub question_id: DbId,
    pub question_number: usize,
    pub content: String,
    pub question_type: String,
    pub options: Vec<LearnerOption>,
    pub points: i32,
}

#[derive(Debug, Serialize)]
pub struct LearnerQuiz {
    #[serde(flatten)]
    pub summary: QuizSummary,
    pub questions: Vec<LearnerQuestion>,
}

/// GET /api/v1/take/{share_code}/quizzes/{quiz_id}
///
/// Questions without answers; shuffled when the quiz asks for it.
pub async fn get_quiz(
    State(state): State<AppState>,
    Path((code, quiz_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = course_by_share_code(&state.pool, &code).await?;
    let quiz = active_quiz(&state.pool, &course, quiz_id).await?;
    let template = QuizCatalogRepo::find_by_id(&state.pool, quiz.quiz_catalog_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuizCatalog",
            id: quiz.quiz_catalog_id,
        }))?;

    let items = ordered_items(&template.question_items);
    let ids: Vec<DbId> = items.iter().map(|i| i.question_id).collect();
    let bank: HashMap<DbId, _> = QuestionBankRepo::find_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let mut questions: Vec<LearnerQuestion> = items
        .iter()
        .filter_map(|item| bank.get(&item.question_id).map(|q| (item, q)))
        .enumerate()
        .map(|(i, (item, q))| LearnerQuestion {
            question_id: q.id,
            question_number: i + 1,
            content: q.content.clone(),
            question_type: q.question_type.clone(),
            options: q
                .options
                .iter()
                .map(|o| LearnerOption {
                    option_id: o.option_id.clone(),
                    content: o.content.clone(),
                })
                .collect(),
            points: item.points.unwrap_or(q.points),
        })
        .collect();
    if quiz.randomize_questions {
        shuffle(&mut questions);
    }

    Ok(Json(DataResponse {
        data: LearnerQuiz {
            summary: QuizSummary {
                id: quiz.id,
                quiz_type: quiz.quiz_type,
                title: quiz.title.unwrap_or(template.title),
                description: template.description,
                time_limit: quiz.time_limit.or(template.default_time_limit),
                question_count: questions.len(),
                total_points: template.total_points,
                max_attempts: quiz.max_attempts,
                start_at: quiz.start_at,
                end_at: quiz.end_at,
            },
            questions,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: DbId,
    pub selected_answer: Option<AnswerValue>,
    /// Seconds.
    pub time_spent: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub user_id: String,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    /// Seconds for the whole attempt.
    pub time_spent: Option<i32>,
    pub started_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct SubmitQuizResponse {
    pub attempt_id: DbId,
    pub attempt_number: i32,
    pub score: i32,
    pub earned_points: i32,
    pub total_points: i32,
    pub passed: bool,
    pub status: String,
    /// Present only when the quiz shows answers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionGrade>>,
}

/// POST /api/v1/take/{share_code}/quizzes/{quiz_id}/submit
pub async fn submit_quiz(
    State(state): State<AppState>,
    Path((code, quiz_id)): Path<(String, DbId)>,
    Json(input): Json<SubmitQuizRequest>,
) -> AppResult<impl IntoResponse> {
    let user_id = input.user_id.trim();
    let course = course_by_share_code(&state.pool, &code).await?;
    let quiz = active_quiz(&state.pool, &course, quiz_id).await?;
    check_window(Utc::now(), quiz.start_at, quiz.end_at)?;

    let course_id = course.id.to_string();
    let quiz_key = quiz.id.to_string();
    let key = attempt_key(user_id, &course_id, &quiz_key)?;
    let used = QuizAttemptRepo::count_attempts(&state.pool, &key).await?;
    let attempt_number = next_attempt_number(used, quiz.max_attempts)?;

    let template = QuizCatalogRepo::find_by_id(&state.pool, quiz.quiz_catalog_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "QuizCatalog",
            id: quiz.quiz_catalog_id,
        }))?;
    let items = ordered_items(&template.question_items);
    let ids: Vec<DbId> = items.iter().map(|i| i.question_id).collect();
    let bank: HashMap<DbId, _> = QuestionBankRepo::find_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let mut gradable = Vec::with_capacity(items.len());
    for item in &items {
        let Some(q) = bank.get(&item.question_id) else {
            continue;
        };
        gradable.push(GradableQuestion {
            question_id: q.id,
            question_type: QuestionType::parse(&q.question_type)?,
            correct_answer: q.correct_answer.0.clone(),
            points: item.points.unwrap_or(q.points),
        });
    }
    if gradable.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Quiz has no questions".into(),
        )));
    }

    let mut answers: HashMap<DbId, AnswerValue> = HashMap::new();
    let mut time_spent: HashMap<DbId, i32> = HashMap::new();
    for answer in input.answers {
        if let Some(t) = answer.time_spent {
            time_spent.insert(answer.question_id, t);
        }
        if let Some(selected) = answer.selected_answer {
            answers.insert(answer.question_id, selected);
        }
    }

    let grade = grade_attempt(&gradable, &answers);
    let passed = is_passed(grade.score, quiz.passing_score);

    let mut responses = Vec::with_capacity(grade.questions.len());
    for (i, g) in grade.questions.iter().enumerate() {
        let question_number = (i + 1).to_string();
        responses.push(CreateQuizResponse {
            response_key: response_key(&question_number, attempt_number)?,
            question_id: g.question_id,
            question_number,
            selected_answer: answers.get(&g.question_id).cloned(),
            is_correct: g.is_correct,
            needs_review: g.needs_review,
            points_awarded: g.points_awarded,
            time_spent: time_spent.get(&g.question_id).copied(),
        });
    }

    let attempt = CreateQuizAttempt {
        course_quiz_id: quiz.id,
        course_id: course.id,
        user_id: user_id.to_string(),
        attempt_key: key,
        course_quiz_key: course_quiz_key(&course_id, &quiz.quiz_type, &quiz_key)?,
        attempt_number,
        score: grade.score,
        earned_points: grade.earned_points,
        total_points: grade.total_points,
        status: if passed { ATTEMPT_PASSED } else { ATTEMPT_FAILED },
        time_spent: input.time_spent,
        started_at: input.started_at,
    };
    let (stored, _) = QuizAttemptRepo::record(&state.pool, &attempt, &responses).await?;

    tracing::info!(
        course_quiz_id = quiz.id,
        attempt_id = stored.id,
        attempt_number,
        score = stored.score,
        passed,
        "Quiz attempt recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitQuizResponse {
                attempt_id: stored.id,
                attempt_number: stored.attempt_number,
                score: stored.score,
                earned_points: stored.earned_points,
                total_points: stored.total_points,
                passed,
                status: stored.status,
                questions: quiz.show_answers.then_some(grade.questions),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Surveys
// ---------------------------------------------------------------------------

/// A survey of the course, or 404.
async fn course_survey(pool: &sqlx::PgPool, course: &Course, survey_id: DbId) -> AppResult<Survey> {
    SurveyRepo::find_by_id(pool, survey_id)
        .await?
        .filter(|s| s.course_id == Some(course.id))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Survey",
            id: survey_id,
        }))
}

#[derive(Debug, Serialize)]
pub struct LearnerSurvey {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub questions: Vec<SnapshotQuestion>,
}

/// GET /api/v1/take/{share_code}/surveys/{survey_id}
pub async fn get_survey(
    State(state): State<AppState>,
    Path((code, survey_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let course = course_by_share_code(&state.pool, &code).await?;
    let survey = course_survey(&state.pool, &course, survey_id).await?;
    ensure_accepting(&survey.status, survey.start_date, survey.end_date, Utc::now())?;
    Ok(Json(DataResponse {
        data: LearnerSurvey {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            start_date: survey.start_date,
            end_date: survey.end_date,
            questions: survey.question_items.0,
        },
    }))
}

/// POST /api/v1/take/{share_code}/surveys/{survey_id}/responses
///
/// One response per respondent; a repeat submission is a 409.
pub async fn submit_survey_response(
    State(state): State<AppState>,
    Path((code, survey_id)): Path<(String, DbId)>,
    Json(input): Json<SubmitSurveyResponse>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let course = course_by_share_code(&state.pool, &code).await?;
    let survey = course_survey(&state.pool, &course, survey_id).await?;
    ensure_accepting(&survey.status, survey.start_date, survey.end_date, Utc::now())?;
    check_answers(&survey.question_items, &input.answers)?;

    let respondent_id = input.respondent_id.trim().to_string();
    let key = survey_response_key(
        &respondent_id,
        &course.id.to_string(),
        &survey.id.to_string(),
    )?;
    let response = SurveyResponseRepo::create(
        &state.pool,
        &CreateSurveyResponse {
            survey_id: survey.id,
            course_id: survey.course_id,
            respondent_id,
            response_key: key,
            answers: input.answers,
            feedback_text: input.feedback_text,
        },
    )
    .await?;

    tracing::info!(survey_id = survey.id, response_id = response.id, "Survey response accepted");
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}
