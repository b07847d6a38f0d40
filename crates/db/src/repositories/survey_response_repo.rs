//! Repository for `survey_responses`.
//!
//! Writes keep `surveys.total_responses` and `completion_rate` in step with
//! the stored responses inside the same transaction.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use tnc_core::survey::SurveyAnswer;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::survey_response::{CreateSurveyResponse, SurveyResponse};

const COLUMNS: &str = "id, survey_id, course_id, respondent_id, response_key, answers, \
                       feedback_text, submitted_at, created_at, updated_at";

/// Adds `$delta` to `total_responses` and recomputes the completion rate.
const ADJUST_TOTALS: &str = "UPDATE surveys SET
        total_responses = GREATEST(0, total_responses + $2),
        completion_rate = CASE
            WHEN total_participants <= 0 THEN 0
            ELSE LEAST(100, ROUND((GREATEST(0, total_responses + $2) * 100.0
                / total_participants)::NUMERIC, 2)::DOUBLE PRECISION)
        END
     WHERE id = $1";

pub struct SurveyResponseRepo;

impl SurveyResponseRepo {
    /// Store a response and bump the survey's counters.
    ///
    /// A second response with the same key fails with a unique violation on
    /// `uq_survey_responses_response_key`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurveyResponse,
    ) -> Result<SurveyResponse, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let query = format!(
            "INSERT INTO survey_responses (survey_id, course_id, respondent_id, response_key,
                                           answers, feedback_text)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(input.survey_id)
            .bind(input.course_id)
            .bind(&input.respondent_id)
            .bind(&input.response_key)
            .bind(Json(&input.answers))
            .bind(&input.feedback_text)
            .fetch_one(&mut *tx)
            .await?;
        sqlx::query(ADJUST_TOTALS)
            .bind(input.survey_id)
            .bind(1_i32)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        tracing::debug!(survey_id = input.survey_id, response_id = row.id, "Survey response stored");
        Ok(row)
    }

    pub async fn find(
        pool: &PgPool,
        survey_id: DbId,
        id: DbId,
    ) -> Result<Option<SurveyResponse>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_responses WHERE id = $1 AND survey_id = $2");
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(id)
            .bind(survey_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_survey(
        pool: &PgPool,
        survey_id: DbId,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<SurveyResponse>, sqlx::Error> {
        let mut filter = Filter::new();
        filter.eq("survey_id", Some(survey_id)).before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM survey_responses {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, SurveyResponse>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    /// Answers of every response to a survey, for analytics.
    pub async fn all_answers(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<Vec<SurveyAnswer>>, sqlx::Error> {
        let rows = sqlx::query_scalar::<_, Json<Vec<SurveyAnswer>>>(
            "SELECT answers FROM survey_responses WHERE survey_id = $1 ORDER BY id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|Json(answers)| answers).collect())
    }

    /// Delete a response and decrement the survey's counters.
    pub async fn delete(pool: &PgPool, survey_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;
        let result = sqlx::query("DELETE FROM survey_responses WHERE id = $1 AND survey_id = $2")
            .bind(id)
            .bind(survey_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        sqlx::query(ADJUST_TOTALS)
            .bind(survey_id)
            .bind(-1_i32)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(true)
    }

    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM survey_responses")
            .fetch_one(pool)
            .await
    }
}
