//! Scheduled course instances.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::types::{Date, DbId, Timestamp};
use tnc_core::validation::not_blank;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub catalog_id: DbId,
    pub customer_id: DbId,
    pub instructor_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub location: Option<String>,
    pub status: String,
    pub share_code: String,
    pub max_seats: Option<i32>,
    pub current_seats: i32,
    pub is_added_to_calendar: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Create DTO. `share_code` is generated server-side.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    pub catalog_id: DbId,
    pub customer_id: DbId,
    pub instructor_id: Option<DbId>,
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub location: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub max_seats: Option<i32>,
    #[validate(range(min = 0))]
    pub current_seats: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourse {
    pub catalog_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub location: Option<String>,
    pub status: Option<String>,
    #[validate(range(min = 1))]
    pub max_seats: Option<i32>,
    #[validate(range(min = 0))]
    pub current_seats: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseFilter {
    pub status: Option<String>,
    pub catalog_id: Option<DbId>,
    pub customer_id: Option<DbId>,
    pub instructor_id: Option<DbId>,
    /// Earliest start date, inclusive.
    pub from: Option<Date>,
    /// Latest start date, inclusive.
    pub to: Option<Date>,
    pub text: Option<String>,
}
