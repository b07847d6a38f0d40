//! Survey question bank items.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::survey::SurveyOption;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyQuestion {
    pub id: DbId,
    pub content: String,
    pub question_type: String,
    pub options: Json<Vec<SurveyOption>>,
    pub required: bool,
    pub tags: Vec<String>,
    pub course_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurveyQuestion {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<SurveyOption>,
    pub required: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub course_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurveyQuestion {
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub question_type: Option<String>,
    pub options: Option<Vec<SurveyOption>>,
    pub required: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub course_id: Option<DbId>,
    pub module_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyQuestionFilter {
    pub text: Option<String>,
    pub tag: Option<String>,
    pub question_type: Option<String>,
}
