//! Repository for `survey_catalogs` (survey templates).

use sqlx::types::Json;
use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::survey_catalog::{
    CreateSurveyCatalog, SurveyCatalog, SurveyCatalogFilter, UpdateSurveyCatalog,
};

const COLUMNS: &str = "id, title, description, question_items, category, tags, is_active, \
                       metadata, created_by, created_at, updated_at";

pub struct SurveyCatalogRepo;

impl SurveyCatalogRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurveyCatalog,
        created_by: Option<DbId>,
    ) -> Result<SurveyCatalog, sqlx::Error> {
        let query = format!(
            "INSERT INTO survey_catalogs (title, description, question_items, category, tags,
                                          is_active, metadata, created_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true), $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyCatalog>(&query)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(Json(&input.question_items))
            .bind(&input.category)
            .bind(&input.tags)
            .bind(input.is_active)
            .bind(&input.metadata)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<SurveyCatalog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM survey_catalogs WHERE id = $1");
        sqlx::query_as::<_, SurveyCatalog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &SurveyCatalogFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<SurveyCatalog>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("category", params.category.as_deref())
            .eq("is_active", params.is_active)
            .array_contains("tags", params.tag.as_deref())
            .text_search(&["title", "description"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM survey_catalogs {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, SurveyCatalog>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurveyCatalog,
    ) -> Result<Option<SurveyCatalog>, sqlx::Error> {
        let query = format!(
            "UPDATE survey_catalogs SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                question_items = COALESCE($4, question_items),
                category = COALESCE($5, category),
                tags = COALESCE($6, tags),
                is_active = COALESCE($7, is_active),
                metadata = COALESCE($8, metadata)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SurveyCatalog>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.question_items.as_ref().map(Json))
            .bind(&input.category)
            .bind(&input.tags)
            .bind(input.is_active)
            .bind(&input.metadata)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_surveys(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM surveys WHERE survey_catalog_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM survey_catalogs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
