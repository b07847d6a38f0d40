//! Repository for `course_quizzes`.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::course_quiz::{CourseQuiz, CourseQuizFilter, CreateCourseQuiz, UpdateCourseQuiz};

const COLUMNS: &str = "id, course_id, quiz_catalog_id, quiz_type, title, time_limit, \
                       passing_score, max_attempts, show_answers, randomize_questions, start_at, \
                       end_at, is_active, created_at, updated_at";

pub struct CourseQuizRepo;

impl CourseQuizRepo {
    pub async fn create(pool: &PgPool, input: &CreateCourseQuiz) -> Result<CourseQuiz, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_quizzes (course_id, quiz_catalog_id, quiz_type, title, time_limit,
                                         passing_score, max_attempts, show_answers,
                                         randomize_questions, start_at, end_at, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, false), COALESCE($9, false),
                     $10, $11, COALESCE($12, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseQuiz>(&query)
            .bind(input.course_id)
            .bind(input.quiz_catalog_id)
            .bind(&input.quiz_type)
            .bind(&input.title)
            .bind(input.time_limit)
            .bind(input.passing_score)
            .bind(input.max_attempts)
            .bind(input.show_answers)
            .bind(input.randomize_questions)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CourseQuiz>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_quizzes WHERE id = $1");
        sqlx::query_as::<_, CourseQuiz>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A quiz of the given course, or `None` if it belongs elsewhere.
    pub async fn find_for_course(
        pool: &PgPool,
        course_id: DbId,
        id: DbId,
    ) -> Result<Option<CourseQuiz>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_quizzes WHERE id = $1 AND course_id = $2");
        sqlx::query_as::<_, CourseQuiz>(&query)
            .bind(id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Active quizzes of a course, pre-tests first.
    pub async fn list_active_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<CourseQuiz>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM course_quizzes
             WHERE course_id = $1 AND is_active = true
             ORDER BY quiz_type DESC, id ASC"
        );
        sqlx::query_as::<_, CourseQuiz>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &CourseQuizFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<CourseQuiz>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("course_id", params.course_id)
            .eq("quiz_catalog_id", params.quiz_catalog_id)
            .eq("quiz_type", params.quiz_type.as_deref())
            .eq("is_active", params.is_active)
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM course_quizzes {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, CourseQuiz>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourseQuiz,
    ) -> Result<Option<CourseQuiz>, sqlx::Error> {
        let query = format!(
            "UPDATE course_quizzes SET
                title = COALESCE($2, title),
                time_limit = COALESCE($3, time_limit),
                passing_score = COALESCE($4, passing_score),
                max_attempts = COALESCE($5, max_attempts),
                show_answers = COALESCE($6, show_answers),
                randomize_questions = COALESCE($7, randomize_questions),
                start_at = COALESCE($8, start_at),
                end_at = COALESCE($9, end_at),
                is_active = COALESCE($10, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseQuiz>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.time_limit)
            .bind(input.passing_score)
            .bind(input.max_attempts)
            .bind(input.show_answers)
            .bind(input.randomize_questions)
            .bind(input.start_at)
            .bind(input.end_at)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_quizzes WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
