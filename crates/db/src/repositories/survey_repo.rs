//! Repository for `surveys` (deployed instances).

use sqlx::types::Json;
use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::survey::{NewSurvey, Survey, SurveyFilter, UpdateSurvey};

const COLUMNS: &str = "id, survey_catalog_id, course_id, title, description, status, \
                       deploy_option, deploy_when, start_date, end_date, send_reminders, \
                       send_notifications, total_participants, total_responses, completion_rate, \
                       question_items, created_at, updated_at";

pub struct SurveyRepo;

impl SurveyRepo {
    pub async fn create(pool: &PgPool, input: &NewSurvey) -> Result<Survey, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys (survey_catalog_id, course_id, title, description, status,
                                  deploy_option, deploy_when, start_date, end_date, send_reminders,
                                  send_notifications, total_participants, question_items)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(input.survey_catalog_id)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status)
            .bind(input.deploy_option)
            .bind(input.deploy_when)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.send_reminders)
            .bind(input.send_notifications)
            .bind(input.total_participants)
            .bind(Json(&input.question_items))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &SurveyFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Survey>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("survey_catalog_id", params.survey_catalog_id)
            .eq("course_id", params.course_id)
            .eq("status", params.status.as_deref())
            .gte("start_date", params.from)
            .lte("end_date", params.to)
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM surveys {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, Survey>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    /// Every survey deployed to a course, oldest first.
    pub async fn list_for_course(pool: &PgPool, course_id: DbId) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE course_id = $1 ORDER BY id");
        sqlx::query_as::<_, Survey>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Apply the provided fields. A changed `total_participants` recomputes
    /// `completion_rate` in the same statement.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurvey,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                deploy_when = COALESCE($4, deploy_when),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                send_reminders = COALESCE($7, send_reminders),
                send_notifications = COALESCE($8, send_notifications),
                total_participants = COALESCE($9, total_participants),
                completion_rate = CASE
                    WHEN COALESCE($9, total_participants) <= 0 THEN 0
                    ELSE LEAST(100, ROUND((total_responses * 100.0
                        / COALESCE($9, total_participants))::NUMERIC, 2)::DOUBLE PRECISION)
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.deploy_when.map(|w| w.as_str()))
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.send_reminders)
            .bind(input.send_notifications)
            .bind(input.total_participants)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("UPDATE surveys SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
