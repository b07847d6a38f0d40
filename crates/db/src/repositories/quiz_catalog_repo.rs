//! Repository for `quiz_catalogs` (quiz templates).

use sqlx::types::Json;
use sqlx::PgPool;
use tnc_core::quiz::QuizQuestionItem;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::quiz_catalog::{
    CreateQuizCatalog, QuizCatalog, QuizCatalogFilter, UpdateQuizCatalog,
};

const COLUMNS: &str = "id, title, description, question_items, total_points, default_time_limit, \
                       category, difficulty, tags, is_active, metadata, catalog_id, created_by, \
                       created_at, updated_at";

pub struct QuizCatalogRepo;

impl QuizCatalogRepo {
    /// Insert a template. `total_points` is computed by the caller from the
    /// referenced bank items.
    pub async fn create(
        pool: &PgPool,
        input: &CreateQuizCatalog,
        total_points: i32,
        created_by: Option<DbId>,
    ) -> Result<QuizCatalog, sqlx::Error> {
        let query = format!(
            "INSERT INTO quiz_catalogs (title, description, question_items, total_points,
                                        default_time_limit, category, difficulty, tags, is_active,
                                        metadata, catalog_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, COALESCE($9, true), $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizCatalog>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(Json(&input.question_items))
            .bind(total_points)
            .bind(input.default_time_limit)
            .bind(&input.category)
            .bind(&input.difficulty)
            .bind(&input.tags)
            .bind(input.is_active)
            .bind(&input.metadata)
            .bind(input.catalog_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<QuizCatalog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM quiz_catalogs WHERE id = $1");
        sqlx::query_as::<_, QuizCatalog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &QuizCatalogFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<QuizCatalog>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("category", params.category.as_deref())
            .eq("difficulty", params.difficulty.as_deref())
            .eq("is_active", params.is_active)
            .eq("catalog_id", params.catalog_id)
            .array_contains("tags", params.tag.as_deref())
            .text_search(&["title", "description"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM quiz_catalogs {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, QuizCatalog>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    /// Apply the provided fields. `total_points` is passed whenever
    /// `question_items` changes.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuizCatalog,
        total_points: Option<i32>,
    ) -> Result<Option<QuizCatalog>, sqlx::Error> {
        let query = format!(
            "UPDATE quiz_catalogs SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                question_items = COALESCE($4, question_items),
                total_points = COALESCE($5, total_points),
                default_time_limit = COALESCE($6, default_time_limit),
                category = COALESCE($7, category),
                difficulty = COALESCE($8, difficulty),
                tags = COALESCE($9, tags),
                is_active = COALESCE($10, is_active),
                metadata = COALESCE($11, metadata),
                catalog_id = COALESCE($12, catalog_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizCatalog>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.question_items.as_ref().map(Json))
            .bind(total_points)
            .bind(input.default_time_limit)
            .bind(&input.category)
            .bind(&input.difficulty)
            .bind(&input.tags)
            .bind(input.is_active)
            .bind(&input.metadata)
            .bind(input.catalog_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the question list and total inside an open transaction.
    pub async fn set_questions<'e, E>(
        executor: E,
        id: DbId,
        items: &[QuizQuestionItem],
        total_points: i32,
    ) -> Result<Option<QuizCatalog>, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "UPDATE quiz_catalogs SET question_items = $2, total_points = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QuizCatalog>(&query)
            .bind(id)
            .bind(Json(items))
            .bind(total_points)
            .fetch_optional(executor)
            .await
    }

    pub async fn count_course_quizzes(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM course_quizzes WHERE quiz_catalog_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quiz_catalogs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
