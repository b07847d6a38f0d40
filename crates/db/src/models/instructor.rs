//! Instructors who teach scheduled courses.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::types::{DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

pub const INSTRUCTOR_ACTIVE: &str = "ACTIVE";
pub const INSTRUCTOR_INACTIVE: &str = "INACTIVE";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Instructor {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile: Option<String>,
    pub specialties: Vec<String>,
    pub status: String,
    pub user_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInstructor {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub profile: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub status: Option<String>,
    pub user_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInstructor {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile: Option<String>,
    pub specialties: Option<Vec<String>>,
    pub status: Option<String>,
    pub user_id: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstructorFilter {
    pub status: Option<String>,
    pub specialty: Option<String>,
    pub text: Option<String>,
}

/// Body of `PUT /instructors/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetInstructorStatus {
    pub status: String,
}
