//! Repository for `quiz_attempts` and `quiz_responses`.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tnc_core::quiz::ResponseOutcome;
use tnc_core::types::{DbId, Timestamp};

use crate::filter::Filter;
use crate::models::quiz_attempt::{
    CreateQuizAttempt, CreateQuizResponse, QuizAttempt, QuizResponse, ATTEMPT_PASSED,
};

const ATTEMPT_COLUMNS: &str = "id, course_quiz_id, course_id, user_id, attempt_key, \
                               course_quiz_key, attempt_number, score, earned_points, total_points, \
                               status, time_spent, started_at, completed_at, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, attempt_id, attempt_key, response_key, question_id, \
                                question_number, selected_answer, is_correct, needs_review, \
                                points_awarded, time_spent, created_at, updated_at";

pub struct QuizAttemptRepo;

impl QuizAttemptRepo {
    /// Attempts already recorded under an attempt key.
    pub async fn count_attempts(pool: &PgPool, attempt_key: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE attempt_key = $1")
            .bind(attempt_key)
            .fetch_one(pool)
            .await
    }

    /// Store an attempt and its responses in one transaction.
    ///
    /// Two concurrent submissions computing the same attempt number collide
    /// on `uq_quiz_attempts_key_number`; the loser gets a unique violation.
    pub async fn record(
        pool: &PgPool,
        attempt: &CreateQuizAttempt,
        responses: &[CreateQuizResponse],
    ) -> Result<(QuizAttempt, Vec<QuizResponse>), sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let query = format!(
            "INSERT INTO quiz_attempts (course_quiz_id, course_id, user_id, attempt_key,
                                        course_quiz_key, attempt_number, score, earned_points,
                                        total_points, status, time_spent, started_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {ATTEMPT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, QuizAttempt>(&query)
            .bind(attempt.course_quiz_id)
            .bind(attempt.course_id)
            .bind(&attempt.user_id)
            .bind(&attempt.attempt_key)
            .bind(&attempt.course_quiz_key)
            .bind(attempt.attempt_number)
            .bind(attempt.score)
            .bind(attempt.earned_points)
            .bind(attempt.total_points)
            .bind(attempt.status)
            .bind(attempt.time_spent)
            .bind(attempt.started_at)
            .fetch_one(&mut *tx)
            .await?;

        let response_query = format!(
            "INSERT INTO quiz_responses (attempt_id, attempt_key, response_key, question_id,
                                         question_number, selected_answer, is_correct,
                                         needs_review, points_awarded, time_spent)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {RESPONSE_COLUMNS}"
        );
        let mut stored = Vec::with_capacity(responses.len());
        for r in responses {
            let saved = sqlx::query_as::<_, QuizResponse>(&response_query)
                .bind(row.id)
                .bind(&row.attempt_key)
                .bind(&r.response_key)
                .bind(r.question_id)
                .bind(&r.question_number)
                .bind(r.selected_answer.as_ref().map(Json))
                .bind(r.is_correct)
                .bind(r.needs_review)
                .bind(r.points_awarded)
                .bind(r.time_spent)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(saved);
        }

        tx.commit().await?;
        Ok((row, stored))
    }

    /// One page of attempts for a course quiz, newest first.
    pub async fn list_for_quiz(
        pool: &PgPool,
        course_quiz_id: DbId,
        user_id: Option<&str>,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<QuizAttempt>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("course_quiz_id", Some(course_quiz_id))
            .eq("user_id", user_id)
            .before_id(cursor);
        let query = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, QuizAttempt>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    /// An attempt of the given course quiz, or `None` if it belongs elsewhere.
    pub async fn find_for_quiz(
        pool: &PgPool,
        course_quiz_id: DbId,
        id: DbId,
    ) -> Result<Option<QuizAttempt>, sqlx::Error> {
        let query = format!(
            "SELECT {ATTEMPT_COLUMNS} FROM quiz_attempts WHERE id = $1 AND course_quiz_id = $2"
        );
        sqlx::query_as::<_, QuizAttempt>(&query)
            .bind(id)
            .bind(course_quiz_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_responses(
        pool: &PgPool,
        attempt_id: DbId,
    ) -> Result<Vec<QuizResponse>, sqlx::Error> {
        let query = format!(
            "SELECT {RESPONSE_COLUMNS} FROM quiz_responses WHERE attempt_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, QuizResponse>(&query)
            .bind(attempt_id)
            .fetch_all(pool)
            .await
    }

    /// `(score, passed)` for every attempt of a course quiz.
    pub async fn scores_for_quiz(
        pool: &PgPool,
        course_quiz_id: DbId,
    ) -> Result<Vec<(i32, bool)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, bool)>(
            "SELECT score, status = $2 FROM quiz_attempts WHERE course_quiz_id = $1",
        )
        .bind(course_quiz_id)
        .bind(ATTEMPT_PASSED)
        .fetch_all(pool)
        .await
    }

    /// Graded outcome of every response to a course quiz.
    pub async fn correctness_for_quiz(
        pool: &PgPool,
        course_quiz_id: DbId,
    ) -> Result<Vec<ResponseOutcome>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (Option<DbId>, String, bool)>(
            "SELECT r.question_id, r.question_number, r.is_correct
             FROM quiz_responses r
             JOIN quiz_attempts a ON a.id = r.attempt_id
             WHERE a.course_quiz_id = $1
             ORDER BY r.id",
        )
        .bind(course_quiz_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(into_outcome).collect())
    }

    /// `(score, passed)` of every attempt at a course's quizzes of one type.
    pub async fn scores_for_course(
        pool: &PgPool,
        course_id: DbId,
        quiz_type: &str,
    ) -> Result<Vec<(i32, bool)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, bool)>(
            "SELECT a.score, a.status = $3
             FROM quiz_attempts a
             JOIN course_quizzes q ON q.id = a.course_quiz_id
             WHERE a.course_id = $1 AND q.quiz_type = $2",
        )
        .bind(course_id)
        .bind(quiz_type)
        .bind(ATTEMPT_PASSED)
        .fetch_all(pool)
        .await
    }

    /// Response outcomes of a course's quizzes of one type, limited to quiz
    /// templates the course uses as both a pre-test and a post-test.
    pub async fn paired_outcomes_for_course(
        pool: &PgPool,
        course_id: DbId,
        quiz_type: &str,
    ) -> Result<Vec<ResponseOutcome>, sqlx::Error> {
        let rows = sqlx::query_as::<_, (Option<DbId>, String, bool)>(
            "SELECT r.question_id, r.question_number, r.is_correct
             FROM quiz_responses r
             JOIN quiz_attempts a ON a.id = r.attempt_id
             JOIN course_quizzes q ON q.id = a.course_quiz_id
             WHERE a.course_id = $1 AND q.quiz_type = $2
               AND q.quiz_catalog_id IN (
                   SELECT quiz_catalog_id FROM course_quizzes
                   WHERE course_id = $1
                   GROUP BY quiz_catalog_id
                   HAVING COUNT(DISTINCT quiz_type) = 2
               )
             ORDER BY r.id",
        )
        .bind(course_id)
        .bind(quiz_type)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(into_outcome).collect())
    }

    /// `(attempts, passed)` completed since `since`, for the dashboard.
    pub async fn totals_since(pool: &PgPool, since: Timestamp) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE status = $2)
             FROM quiz_attempts WHERE completed_at >= $1",
        )
        .bind(since)
        .bind(ATTEMPT_PASSED)
        .fetch_one(pool)
        .await
    }
}

fn into_outcome(
    (question_id, question_number, is_correct): (Option<DbId>, String, bool),
) -> ResponseOutcome {
    ResponseOutcome {
        question_id,
        question_number,
        is_correct,
    }
}
