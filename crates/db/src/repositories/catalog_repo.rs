//! Repository for `course_catalogs`.

use sqlx::PgPool;
use tnc_core::catalog::DEFAULT_CATALOG_VERSION;
use tnc_core::types::DbId;

use crate::filter::Filter;
use crate::models::catalog::{CatalogFilter, CourseCatalog, CreateCourseCatalog, UpdateCourseCatalog};

const COLUMNS: &str = "id, title, aws_code, version, durations, level, description, category, \
                       tags, prerequisites, objectives, status, created_by, created_at, updated_at";

pub struct CatalogRepo;

impl CatalogRepo {
    /// Insert a catalog. `tags` are expected already normalized.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCourseCatalog,
        tags: &[String],
        created_by: Option<DbId>,
    ) -> Result<CourseCatalog, sqlx::Error> {
        let query = format!(
            "INSERT INTO course_catalogs (title, aws_code, version, durations, level, description,
                                          category, tags, prerequisites, objectives, status, created_by)
             VALUES ($1, $2, COALESCE($3, '{DEFAULT_CATALOG_VERSION}'), $4, $5, $6, $7, $8, $9, $10,
                     COALESCE($11, 'draft'), $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseCatalog>(&query)
            .bind(input.title.trim())
            .bind(&input.aws_code)
            .bind(&input.version)
            .bind(input.durations)
            .bind(&input.level)
            .bind(&input.description)
            .bind(&input.category)
            .bind(tags)
            .bind(&input.prerequisites)
            .bind(&input.objectives)
            .bind(&input.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<CourseCatalog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM course_catalogs WHERE id = $1");
        sqlx::query_as::<_, CourseCatalog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        params: &CatalogFilter,
        cursor: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<CourseCatalog>, sqlx::Error> {
        let mut filter = Filter::new();
        filter
            .eq("level", params.level.as_deref())
            .eq("category", params.category.as_deref())
            .eq("status", params.status.as_deref())
            .array_contains("tags", params.tag.as_deref())
            .text_search(&["title", "aws_code", "description"], params.text.as_deref())
            .before_id(cursor);
        let query = format!(
            "SELECT {COLUMNS} FROM course_catalogs {} ORDER BY id DESC LIMIT ${}",
            filter.where_clause(),
            filter.next_index()
        );
        filter
            .bind(sqlx::query_as::<_, CourseCatalog>(&query))
            .bind(limit + 1)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourseCatalog,
        tags: Option<&[String]>,
    ) -> Result<Option<CourseCatalog>, sqlx::Error> {
        let query = format!(
            "UPDATE course_catalogs SET
                title = COALESCE($2, title),
                aws_code = COALESCE($3, aws_code),
                version = COALESCE($4, version),
                durations = COALESCE($5, durations),
                level = COALESCE($6, level),
                description = COALESCE($7, description),
                category = COALESCE($8, category),
                tags = COALESCE($9, tags),
                prerequisites = COALESCE($10, prerequisites),
                objectives = COALESCE($11, objectives),
                status = COALESCE($12, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CourseCatalog>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.aws_code)
            .bind(&input.version)
            .bind(input.durations)
            .bind(&input.level)
            .bind(&input.description)
            .bind(&input.category)
            .bind(tags)
            .bind(&input.prerequisites)
            .bind(&input.objectives)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Number of scheduled courses created from the catalog.
    pub async fn count_courses(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE catalog_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Deletes the catalog with its modules, labs and materials.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM course_catalogs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
