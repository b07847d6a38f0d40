//! Repository for the `courses` table.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::course::{Course, CourseFilter, CreateCourse, UpdateCourse};

const COLUMNS: &str = "id, catalog_id, customer_id, instructor_id, title, description, start_date, \
                       end_date, location, status, share_code, max_seats, current_seats, \
                       is_added_to_calendar, created_at, updated_at";

pub struct CourseRepo;

impl CourseRepo {
    /// Insert a course with a pre-generated share code.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCourse,
        share_code: &str,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (catalog_id, customer_id, instructor_id, title, description,
                                  start_date, end_date, location, status, share_code, max_seats,
                                  current_seats)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, 'scheduled'), $10, $11,
                     COALESCE($12, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(input.catalog_id)
            .bind(input.customer_id)
            .bind(input.instructor_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.status)
            .bind(share_code)
            .bind(input.max_seats)
            .bind(input.current_seats)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up a course by its normalized share code.
    pub async fn find_by_share_code(
        pool: &PgPool,
        share_code: &str,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE share_code = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(share_code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &CourseFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("status", params.status.as_deref())
            .eq("catalog_id", params.catalog_id)
            .eq("customer_id", params.customer_id)
            .eq("instructor_id", params.instructor_id)
            .gte("start_date", params.from)
            .lte("start_date", params.to)
            .text_search(&["title", "location", "share_code"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM courses {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, Course>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                catalog_id = COALESCE($2, catalog_id),
                customer_id = COALESCE($3, customer_id),
                instructor_id = COALESCE($4, instructor_id),
                title = COALESCE($5, title),
                description = COALESCE($6, description),
                start_date = COALESCE($7, start_date),
                end_date = COALESCE($8, end_date),
                location = COALESCE($9, location),
                status = COALESCE($10, status),
                max_seats = COALESCE($11, max_seats),
                current_seats = COALESCE($12, current_seats)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(input.catalog_id)
            .bind(input.customer_id)
            .bind(input.instructor_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.location)
            .bind(&input.status)
            .bind(input.max_seats)
            .bind(input.current_seats)
            .fetch_optional(pool)
            .await
    }

    pub async fn mark_added_to_calendar<'e, E>(executor: E, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query("UPDATE courses SET is_added_to_calendar = true WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes the course. Its quizzes and attempts cascade; surveys and
    /// calendar events keep existing without the link.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
