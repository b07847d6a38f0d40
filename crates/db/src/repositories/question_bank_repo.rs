//! Repository for `question_bank_items`.

use sqlx::types::Json;
use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::question_bank::{
    CreateQuestionBankItem, QuestionBankFilter, QuestionBankItem, UpdateQuestionBankItem,
};

const COLUMNS: &str = "id, content, question_type, options, correct_answer, explanation, \
                       difficulty, tags, points, catalog_id, metadata, created_at, updated_at";

pub struct QuestionBankRepo;

impl QuestionBankRepo {
    pub async fn create<'e, E>(
        executor: E,
        input: &CreateQuestionBankItem,
    ) -> Result<QuestionBankItem, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO question_bank_items (content, question_type, options, correct_answer,
                                              explanation, difficulty, tags, points, catalog_id, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, 1), $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestionBankItem>(&query)
            .bind(input.content.trim())
            .bind(&input.question_type)
            .bind(Json(&input.options))
            .bind(Json(&input.correct_answer))
            .bind(&input.explanation)
            .bind(&input.difficulty)
            .bind(&input.tags)
            .bind(input.points)
            .bind(input.catalog_id)
            .bind(&input.metadata)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QuestionBankItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM question_bank_items WHERE id = $1");
        sqlx::query_as::<_, QuestionBankItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several items by id. Missing ids are simply absent from the result.
    pub async fn find_by_ids<'e, E>(
        executor: E,
        ids: &[DbId],
    ) -> Result<Vec<QuestionBankItem>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM question_bank_items WHERE id = ANY($1)");
        sqlx::query_as::<_, QuestionBankItem>(&query)
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &QuestionBankFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<QuestionBankItem>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("difficulty", params.difficulty.as_deref())
            .eq("question_type", params.question_type.as_deref())
            .eq("catalog_id", params.catalog_id)
            .array_contains("tags", params.tag.as_deref())
            .text_search(&["content", "explanation"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM question_bank_items {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, QuestionBankItem>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuestionBankItem,
    ) -> Result<Option<QuestionBankItem>, sqlx::Error> {
        let query = format!(
            "UPDATE question_bank_items SET
                content = COALESCE($2, content),
                question_type = COALESCE($3, question_type),
                options = COALESCE($4, options),
                correct_answer = COALESCE($5, correct_answer),
                explanation = COALESCE($6, explanation),
                difficulty = COALESCE($7, difficulty),
                tags = COALESCE($8, tags),
                points = COALESCE($9, points),
                catalog_id = COALESCE($10, catalog_id),
                metadata = COALESCE($11, metadata)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuestionBankItem>(&query)
            .bind(id)
            .bind(&input.content)
            .bind(&input.question_type)
            .bind(input.options.as_ref().map(Json))
            .bind(input.correct_answer.as_ref().map(Json))
            .bind(&input.explanation)
            .bind(&input.difficulty)
            .bind(&input.tags)
            .bind(input.points)
            .bind(input.catalog_id)
            .bind(&input.metadata)
            .fetch_optional(pool)
            .await
    }

    /// Whether any quiz template still references the item.
    pub async fn is_referenced(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM quiz_catalogs
                WHERE question_items @> jsonb_build_array(jsonb_build_object('question_id', $1::BIGINT))
             )",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM question_bank_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
