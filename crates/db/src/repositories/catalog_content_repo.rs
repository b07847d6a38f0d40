//! Repositories for the content nested under a catalog: `catalog_modules`,
//! `catalog_labs` and `catalog_materials`.
//!
//! Every lookup is scoped by `catalog_id` so a child id from another
//! catalog reads as missing.

use sqlx::PgPool;
use tnc_core::types::DbId;

use crate::models::catalog::{
    CatalogLab, CatalogMaterial, CatalogModule, CreateCatalogLab, CreateCatalogMaterial,
    CreateCatalogModule, UpdateCatalogLab, UpdateCatalogMaterial, UpdateCatalogModule,
};

const MODULE_COLUMNS: &str = "id, catalog_id, module_number, title, description, duration, \
                              sort_order, is_published, created_at, updated_at";

const LAB_COLUMNS: &str = "id, catalog_id, module_id, lab_number, title, description, content, \
                           duration, sort_order, is_published, created_at, updated_at";

const MATERIAL_COLUMNS: &str = "id, catalog_id, module_id, material_type, title, description, \
                                storage_key, url, file_size, file_type, created_at, updated_at";

pub struct CatalogModuleRepo;

impl CatalogModuleRepo {
    pub async fn create(
        pool: &PgPool,
        catalog_id: DbId,
        input: &CreateCatalogModule,
    ) -> Result<CatalogModule, sqlx::Error> {
        let query = format!(
            "INSERT INTO catalog_modules (catalog_id, module_number, title, description, duration,
                                          sort_order, is_published)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, $2), COALESCE($7, false))
             RETURNING {MODULE_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogModule>(&query)
            .bind(catalog_id)
            .bind(input.module_number)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(input.duration)
            .bind(input.sort_order)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
    ) -> Result<Option<CatalogModule>, sqlx::Error> {
        let query =
            format!("SELECT {MODULE_COLUMNS} FROM catalog_modules WHERE id = $1 AND catalog_id = $2");
        sqlx::query_as::<_, CatalogModule>(&query)
            .bind(id)
            .bind(catalog_id)
            .fetch_optional(pool)
            .await
    }

    /// All modules of a catalog in display order.
    pub async fn list_for_catalog(
        pool: &PgPool,
        catalog_id: DbId,
    ) -> Result<Vec<CatalogModule>, sqlx::Error> {
        let query = format!(
            "SELECT {MODULE_COLUMNS} FROM catalog_modules WHERE catalog_id = $1
             ORDER BY sort_order, module_number"
        );
        sqlx::query_as::<_, CatalogModule>(&query)
            .bind(catalog_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
        input: &UpdateCatalogModule,
    ) -> Result<Option<CatalogModule>, sqlx::Error> {
        let query = format!(
            "UPDATE catalog_modules SET
                module_number = COALESCE($3, module_number),
                title = COALESCE($4, title),
                description = COALESCE($5, description),
                duration = COALESCE($6, duration),
                sort_order = COALESCE($7, sort_order),
                is_published = COALESCE($8, is_published)
             WHERE id = $1 AND catalog_id = $2
             RETURNING {MODULE_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogModule>(&query)
            .bind(id)
            .bind(catalog_id)
            .bind(input.module_number)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration)
            .bind(input.sort_order)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, catalog_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM catalog_modules WHERE id = $1 AND catalog_id = $2")
            .bind(id)
            .bind(catalog_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct CatalogLabRepo;

impl CatalogLabRepo {
    pub async fn create(
        pool: &PgPool,
        catalog_id: DbId,
        input: &CreateCatalogLab,
    ) -> Result<CatalogLab, sqlx::Error> {
        let query = format!(
            "INSERT INTO catalog_labs (catalog_id, module_id, lab_number, title, description, content,
                                       duration, sort_order, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, $3), COALESCE($9, false))
             RETURNING {LAB_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogLab>(&query)
            .bind(catalog_id)
            .bind(input.module_id)
            .bind(input.lab_number)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.content)
            .bind(input.duration)
            .bind(input.sort_order)
            .bind(input.is_published)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
    ) -> Result<Option<CatalogLab>, sqlx::Error> {
        let query =
            format!("SELECT {LAB_COLUMNS} FROM catalog_labs WHERE id = $1 AND catalog_id = $2");
        sqlx::query_as::<_, CatalogLab>(&query)
            .bind(id)
            .bind(catalog_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_catalog(
        pool: &PgPool,
        catalog_id: DbId,
    ) -> Result<Vec<CatalogLab>, sqlx::Error> {
        let query = format!(
            "SELECT {LAB_COLUMNS} FROM catalog_labs WHERE catalog_id = $1
             ORDER BY sort_order, lab_number"
        );
        sqlx::query_as::<_, CatalogLab>(&query)
            .bind(catalog_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
        input: &UpdateCatalogLab,
    ) -> Result<Option<CatalogLab>, sqlx::Error> {
        let query = format!(
            "UPDATE catalog_labs SET
                module_id = COALESCE($3, module_id),
                lab_number = COALESCE($4, lab_number),
                title = COALESCE($5, title),
                description = COALESCE($6, description),
                content = COALESCE($7, content),
                duration = COALESCE($8, duration),
                sort_order = COALESCE($9, sort_order),
                is_published = COALESCE($10, is_published)
             WHERE id = $1 AND catalog_id = $2
             RETURNING {LAB_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogLab>(&query)
            .bind(id)
            .bind(catalog_id)
            .bind(input.module_id)
            .bind(input.lab_number)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.content)
            .bind(input.duration)
            .bind(input.sort_order)
            .bind(input.is_published)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, catalog_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM catalog_labs WHERE id = $1 AND catalog_id = $2")
            .bind(id)
            .bind(catalog_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct CatalogMaterialRepo;

impl CatalogMaterialRepo {
    pub async fn create(
        pool: &PgPool,
        catalog_id: DbId,
        input: &CreateCatalogMaterial,
    ) -> Result<CatalogMaterial, sqlx::Error> {
        let query = format!(
            "INSERT INTO catalog_materials (catalog_id, module_id, material_type, title, description,
                                            storage_key, url, file_size, file_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {MATERIAL_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogMaterial>(&query)
            .bind(catalog_id)
            .bind(input.module_id)
            .bind(&input.material_type)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(input.file_size)
            .bind(&input.file_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
    ) -> Result<Option<CatalogMaterial>, sqlx::Error> {
        let query = format!(
            "SELECT {MATERIAL_COLUMNS} FROM catalog_materials WHERE id = $1 AND catalog_id = $2"
        );
        sqlx::query_as::<_, CatalogMaterial>(&query)
            .bind(id)
            .bind(catalog_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_catalog(
        pool: &PgPool,
        catalog_id: DbId,
    ) -> Result<Vec<CatalogMaterial>, sqlx::Error> {
        let query = format!(
            "SELECT {MATERIAL_COLUMNS} FROM catalog_materials WHERE catalog_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, CatalogMaterial>(&query)
            .bind(catalog_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
        input: &UpdateCatalogMaterial,
    ) -> Result<Option<CatalogMaterial>, sqlx::Error> {
        let query = format!(
            "UPDATE catalog_materials SET
                module_id = COALESCE($3, module_id),
                material_type = COALESCE($4, material_type),
                title = COALESCE($5, title),
                description = COALESCE($6, description),
                url = COALESCE($7, url),
                file_type = COALESCE($8, file_type)
             WHERE id = $1 AND catalog_id = $2
             RETURNING {MATERIAL_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogMaterial>(&query)
            .bind(id)
            .bind(catalog_id)
            .bind(input.module_id)
            .bind(&input.material_type)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.url)
            .bind(&input.file_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a material, returning the row so the caller can remove the
    /// stored object.
    pub async fn delete(
        pool: &PgPool,
        catalog_id: DbId,
        id: DbId,
    ) -> Result<Option<CatalogMaterial>, sqlx::Error> {
        let query = format!(
            "DELETE FROM catalog_materials WHERE id = $1 AND catalog_id = $2
             RETURNING {MATERIAL_COLUMNS}"
        );
        sqlx::query_as::<_, CatalogMaterial>(&query)
            .bind(id)
            .bind(catalog_id)
            .fetch_optional(pool)
            .await
    }
}
