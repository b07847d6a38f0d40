//! Submitted quiz attempts and their per-question responses.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use tnc_core::question_bank::AnswerValue;
use tnc_core::types::{DbId, Timestamp};

pub const ATTEMPT_PASSED: &str = "passed";
pub const ATTEMPT_FAILED: &str = "failed";

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: DbId,
    pub course_quiz_id: DbId,
    pub course_id: DbId,
    /// Learner id chosen by the client; learners are not staff users.
    pub user_id: String,
    /// `userId#courseId#quizId`.
    pub attempt_key: String,
    /// `courseId#quizType#quizId`.
    pub course_quiz_key: String,
    pub attempt_number: i32,
    pub score: i32,
    pub earned_points: i32,
    pub total_points: i32,
    pub status: String,
    pub time_spent: Option<i32>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateQuizAttempt {
    pub course_quiz_id: DbId,
    pub course_id: DbId,
    pub user_id: String,
    pub attempt_key: String,
    pub course_quiz_key: String,
    pub attempt_number: i32,
    pub score: i32,
    pub earned_points: i32,
    pub total_points: i32,
    pub status: &'static str,
    pub time_spent: Option<i32>,
    pub started_at: Option<Timestamp>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizResponse {
    pub id: DbId,
    pub attempt_id: DbId,
    pub attempt_key: String,
    /// `questionNumber#attemptNumber`.
    pub response_key: String,
    pub question_id: Option<DbId>,
    pub question_number: String,
    pub selected_answer: Option<Json<AnswerValue>>,
    pub is_correct: bool,
    pub needs_review: bool,
    pub points_awarded: i32,
    pub time_spent: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub struct CreateQuizResponse {
    pub response_key: String,
    pub question_id: DbId,
    pub question_number: String,
    pub selected_answer: Option<AnswerValue>,
    pub is_correct: bool,
    pub needs_review: bool,
    pub points_awarded: i32,
    pub time_spent: Option<i32>,
}
