//! Reusable survey templates.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::survey::SurveyQuestionItem;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyCatalog {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub question_items: Json<Vec<SurveyQuestionItem>>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub metadata: Option<serde_json::Value>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurveyCatalog {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub question_items: Vec<SurveyQuestionItem>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurveyCatalog {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub question_items: Option<Vec<SurveyQuestionItem>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyCatalogFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub is_active: Option<bool>,
}
