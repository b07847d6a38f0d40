//! Course catalog templates and their nested modules, labs and materials.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseCatalog {
    pub id: DbId,
    pub title: String,
    pub aws_code: Option<String>,
    pub version: String,
    /// Length in hours.
    pub durations: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub prerequisites: Vec<String>,
    pub objectives: Vec<String>,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseCatalog {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub aws_code: Option<String>,
    pub version: Option<String>,
    #[validate(range(min = 0))]
    pub durations: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseCatalog {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub aws_code: Option<String>,
    #[validate(length(min = 1))]
    pub version: Option<String>,
    #[validate(range(min = 0))]
    pub durations: Option<i32>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub prerequisites: Option<Vec<String>>,
    pub objectives: Option<Vec<String>>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub text: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogModule {
    pub id: DbId,
    pub catalog_id: DbId,
    pub module_number: i32,
    pub title: String,
    pub description: Option<String>,
    /// Minutes.
    pub duration: Option<i32>,
    pub sort_order: i32,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCatalogModule {
    #[validate(range(min = 1))]
    pub module_number: i32,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCatalogModule {
    #[validate(range(min = 1))]
    pub module_number: Option<i32>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_published: Option<bool>,
}

// ---------------------------------------------------------------------------
// Labs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogLab {
    pub id: DbId,
    pub catalog_id: DbId,
    pub module_id: Option<DbId>,
    pub lab_number: i32,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub duration: Option<i32>,
    pub sort_order: i32,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCatalogLab {
    pub module_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub lab_number: i32,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCatalogLab {
    pub module_id: Option<DbId>,
    #[validate(range(min = 1))]
    pub lab_number: Option<i32>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    #[validate(range(min = 0))]
    pub duration: Option<i32>,
    pub sort_order: Option<i32>,
    pub is_published: Option<bool>,
}

// ---------------------------------------------------------------------------
// Materials
// ---------------------------------------------------------------------------

/// Downloadable material: either an uploaded object (`storage_key`) or an
/// external link (`url`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogMaterial {
    pub id: DbId,
    pub catalog_id: DbId,
    pub module_id: Option<DbId>,
    pub material_type: String,
    pub title: String,
    pub description: Option<String>,
    pub storage_key: Option<String>,
    pub url: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCatalogMaterial {
    pub module_id: Option<DbId>,
    #[validate(custom(function = "not_blank"))]
    pub material_type: String,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub storage_key: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    #[validate(range(min = 0))]
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCatalogMaterial {
    pub module_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub material_type: Option<String>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
    pub file_type: Option<String>,
}
