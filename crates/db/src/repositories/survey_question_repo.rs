//! Repository for `survey_question_bank_items`.

use sqlx::types::Json;
use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::survey_question::{
    CreateSurveyQuestion, SurveyQuestion, SurveyQuestionFilter, UpdateSurveyQuestion,
};

const COLUMNS: &str = "id, content, question_type, options, required, tags, course_id, module_id, \
                       metadata, created_at, updated_at";

pub struct SurveyQuestionRepo;

impl SurveyQuestionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurveyQuestion,
    ) -> Result<SurveyQuestion, sqlx::Error> {
        let query = format!(
            "INSERT INTO survey_question_bank_items (content, question_type, options, required,
                                                     tags, course_id, module_id, metadata)
             VALUES ($1, $2, $3, COALESCE($4, false), $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyQuestion>(&query)
            .bind(input.content.trim())
            .bind(&input.question_type)
            .bind(Json(&input.options))
            .bind(input.required)
            .bind(&input.tags)
            .bind(input.course_id)
            .bind(input.module_id)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SurveyQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_question_bank_items WHERE id = $1");
        sqlx::query_as::<_, SurveyQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<SurveyQuestion>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_question_bank_items WHERE id = ANY($1)");
        sqlx::query_as::<_, SurveyQuestion>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &SurveyQuestionFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<SurveyQuestion>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("question_type", params.question_type.as_deref())
            .array_contains("tags", params.tag.as_deref())
            .text_search(&["content"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM survey_question_bank_items {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, SurveyQuestion>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurveyQuestion,
    ) -> Result<Option<SurveyQuestion>, sqlx::Error> {
        let query = format!(
            "UPDATE survey_question_bank_items SET
                content = COALESCE($2, content),
                question_type = COALESCE($3, question_type),
                options = COALESCE($4, options),
                required = COALESCE($5, required),
                tags = COALESCE($6, tags),
                course_id = COALESCE($7, course_id),
                module_id = COALESCE($8, module_id),
                metadata = COALESCE($9, metadata)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyQuestion>(&query)
            .bind(id)
            .bind(&input.content)
            .bind(&input.question_type)
            .bind(input.options.as_ref().map(Json))
            .bind(input.required)
            .bind(&input.tags)
            .bind(input.course_id)
            .bind(input.module_id)
            .bind(&input.metadata)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM survey_question_bank_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
