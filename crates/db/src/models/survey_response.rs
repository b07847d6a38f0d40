//! Submitted survey responses.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::survey::SurveyAnswer;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyResponse {
    pub id: DbId,
    pub survey_id: DbId,
    pub course_id: Option<DbId>,
    pub respondent_id: String,
    /// `respondentId#courseId#surveyId`.
    pub response_key: String,
    pub answers: Json<Vec<SurveyAnswer>>,
    pub feedback_text: Option<String>,
    pub submitted_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of the public response submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitSurveyResponse {
    #[validate(custom(function = "not_blank"))]
    pub respondent_id: String,
    #[serde(default)]
    pub answers: Vec<SurveyAnswer>,
    pub feedback_text: Option<String>,
}

pub struct CreateSurveyResponse {
    pub survey_id: DbId,
    pub course_id: Option<DbId>,
    pub respondent_id: String,
    pub response_key: String,
    pub answers: Vec<SurveyAnswer>,
    pub feedback_text: Option<String>,
}
