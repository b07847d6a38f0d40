//! Quiz question bank items.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::question_bank::{AnswerValue, QuestionOption};
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuestionBankItem {
    pub id: DbId,
    pub content: String,
    pub question_type: String,
    pub options: Json<Vec<QuestionOption>>,
    pub correct_answer: Json<AnswerValue>,
    pub explanation: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub points: i32,
    pub catalog_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionBankItem {
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    pub question_type: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    pub correct_answer: AnswerValue,
    pub explanation: Option<String>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(range(min = 1))]
    pub points: Option<i32>,
    pub catalog_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuestionBankItem {
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub question_type: Option<String>,
    pub options: Option<Vec<QuestionOption>>,
    pub correct_answer: Option<AnswerValue>,
    pub explanation: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 1))]
    pub points: Option<i32>,
    pub catalog_id: Option<DbId>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionBankFilter {
    pub text: Option<String>,
    pub tag: Option<String>,
    pub difficulty: Option<String>,
    pub question_type: Option<String>,
    pub catalog_id: Option<DbId>,
}
