//! Quiz instances attached to a course.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tnc_core::types::{DbId, Timestamp};
use validator::Validate;

/// A quiz template deployed to one course as its pre- or post-test.
///
/// `title`, `time_limit` and the rest override the template when set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseQuiz {
    pub id: DbId,
    pub course_id: DbId,
    pub quiz_catalog_id: DbId,
    pub quiz_type: String,
    pub title: Option<String>,
    pub time_limit: Option<i32>,
    pub passing_score: Option<i32>,
    pub max_attempts: Option<i32>,
    pub show_answers: bool,
    pub randomize_questions: bool,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseQuiz {
    pub course_id: DbId,
    pub quiz_catalog_id: DbId,
    pub quiz_type: String,
    pub title: Option<String>,
    #[validate(range(min = 1))]
    pub time_limit: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i32>,
    pub show_answers: Option<bool>,
    pub randomize_questions: Option<bool>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseQuiz {
    pub title: Option<String>,
    #[validate(range(min = 1))]
    pub time_limit: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
    #[validate(range(min = 1))]
    pub max_attempts: Option<i32>,
    pub show_answers: Option<bool>,
    pub randomize_questions: Option<bool>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseQuizFilter {
    pub course_id: Option<DbId>,
    pub quiz_catalog_id: Option<DbId>,
    pub quiz_type: Option<String>,
    pub is_active: Option<bool>,
}
