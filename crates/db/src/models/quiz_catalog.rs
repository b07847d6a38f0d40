//! Reusable quiz templates.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::quiz::QuizQuestionItem;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizCatalog {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub question_items: Json<Vec<QuizQuestionItem>>,
    pub total_points: i32,
    /// Minutes.
    pub default_time_limit: Option<i32>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub metadata: Option<serde_json::Value>,
    pub catalog_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuizCatalog {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub question_items: Vec<QuizQuestionItem>,
    #[validate(range(min = 1))]
    pub default_time_limit: Option<i32>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
    pub catalog_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuizCatalog {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub question_items: Option<Vec<QuizQuestionItem>>,
    #[validate(range(min = 1))]
    pub default_time_limit: Option<i32>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
    pub catalog_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizCatalogFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub tag: Option<String>,
    pub is_active: Option<bool>,
    pub catalog_id: Option<DbId>,
}
