//! Handlers for catalog modules, labs and materials, nested under
//! `/catalogs/{catalog_id}`.
//!
//! Material files never pass through the API. Clients ask for an upload URL,
//! PUT the file to the object store, then register the material with the
//! returned `storage_key`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tnc_core::error::CoreError;
use tnc_core::storage::{
    key_belongs_to_catalog, material_key, validate_content_type, validate_size,
};
use tnc_core::types::DbId;
use tnc_core::validation::{require_non_blank, validate};
use tnc_db::models::catalog::{
    CreateCatalogLab, CreateCatalogMaterial, CreateCatalogModule, UpdateCatalogLab,
    UpdateCatalogMaterial, UpdateCatalogModule,
};
use tnc_db::repositories::{CatalogLabRepo, CatalogMaterialRepo, CatalogModuleRepo};

use super::catalogs::ensure_catalog_exists;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireInstructor};
use crate::response::DataResponse;
use crate::services::storage::PresignedUrl;
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// A referenced module must belong to the same catalog entry.
async fn ensure_module_in_catalog(
    pool: &sqlx::PgPool,
    catalog_id: DbId,
    module_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(module_id) = module_id {
        if CatalogModuleRepo::find(pool, catalog_id, module_id)
            .await?
            .is_none()
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Module {module_id} does not belong to catalog entry {catalog_id}"
            ))));
        }
    }
    Ok(())
}

// ===========================================================================
// MODULES
// ===========================================================================

/// GET /api/v1/catalogs/{catalog_id}/modules
pub async fn list_modules(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(catalog_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    let modules = CatalogModuleRepo::list_for_catalog(&state.pool, catalog_id).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// POST /api/v1/catalogs/{catalog_id}/modules
pub async fn create_module(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(catalog_id): Path<DbId>,
    Json(input): Json<CreateCatalogModule>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    let module = CatalogModuleRepo::create(&state.pool, catalog_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// GET /api/v1/catalogs/{catalog_id}/modules/{id}
pub async fn get_module(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let module = CatalogModuleRepo::find(&state.pool, catalog_id, id)
        .await?
        .ok_or_else(|| not_found("CatalogModule", id))?;
    Ok(Json(DataResponse { data: module }))
}

/// PUT /api/v1/catalogs/{catalog_id}/modules/{id}
pub async fn update_module(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCatalogModule>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    let module = CatalogModuleRepo::update(&state.pool, catalog_id, id, &input)
        .await?
        .ok_or_else(|| not_found("CatalogModule", id))?;
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/catalogs/{catalog_id}/modules/{id}
pub async fn delete_module(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !CatalogModuleRepo::delete(&state.pool, catalog_id, id).await? {
        return Err(not_found("CatalogModule", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// LABS
// ===========================================================================

/// GET /api/v1/catalogs/{catalog_id}/labs
pub async fn list_labs(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(catalog_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    let labs = CatalogLabRepo::list_for_catalog(&state.pool, catalog_id).await?;
    Ok(Json(DataResponse { data: labs }))
}

/// POST /api/v1/catalogs/{catalog_id}/labs
pub async fn create_lab(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(catalog_id): Path<DbId>,
    Json(input): Json<CreateCatalogLab>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    ensure_module_in_catalog(&state.pool, catalog_id, input.module_id).await?;
    let lab = CatalogLabRepo::create(&state.pool, catalog_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lab })))
}

/// GET /api/v1/catalogs/{catalog_id}/labs/{id}
pub async fn get_lab(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let lab = CatalogLabRepo::find(&state.pool, catalog_id, id)
        .await?
        .ok_or_else(|| not_found("CatalogLab", id))?;
    Ok(Json(DataResponse { data: lab }))
}

/// PUT /api/v1/catalogs/{catalog_id}/labs/{id}
pub async fn update_lab(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCatalogLab>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    ensure_module_in_catalog(&state.pool, catalog_id, input.module_id).await?;
    let lab = CatalogLabRepo::update(&state.pool, catalog_id, id, &input)
        .await?
        .ok_or_else(|| not_found("CatalogLab", id))?;
    Ok(Json(DataResponse { data: lab }))
}

/// DELETE /api/v1/catalogs/{catalog_id}/labs/{id}
pub async fn delete_lab(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !CatalogLabRepo::delete(&state.pool, catalog_id, id).await? {
        return Err(not_found("CatalogLab", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ===========================================================================
// MATERIALS
// ===========================================================================

/// Body of `POST /catalogs/{catalog_id}/materials/upload-url`.
#[derive(Debug, Deserialize)]
pub struct UploadUrlRequest {
    pub file_name: String,
    pub content_type: String,
    pub file_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    /// Pass this back as `storage_key` when registering the material.
    pub storage_key: String,
    #[serde(flatten)]
    pub upload: PresignedUrl,
}

/// GET /api/v1/catalogs/{catalog_id}/materials
pub async fn list_materials(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(catalog_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    let materials = CatalogMaterialRepo::list_for_catalog(&state.pool, catalog_id).await?;
    Ok(Json(DataResponse { data: materials }))
}

/// POST /api/v1/catalogs/{catalog_id}/materials/upload-url
pub async fn upload_url(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(catalog_id): Path<DbId>,
    Json(input): Json<UploadUrlRequest>,
) -> AppResult<impl IntoResponse> {
    require_non_blank("file_name", &input.file_name)?;
    validate_content_type(&input.content_type)?;
    validate_size(input.file_size)?;
    ensure_catalog_exists(&state.pool, catalog_id).await?;

    let storage_key = material_key(catalog_id, &input.file_name);
    let upload = state
        .storage
        .upload_url(&storage_key, &input.content_type)
        .await?;

    tracing::info!(catalog_id, key = %storage_key, "Material upload URL issued");
    Ok(Json(DataResponse {
        data: UploadUrlResponse {
            storage_key,
            upload,
        },
    }))
}

/// POST /api/v1/catalogs/{catalog_id}/materials
pub async fn create_material(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path(catalog_id): Path<DbId>,
    Json(input): Json<CreateCatalogMaterial>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    validate_size(input.file_size)?;
    match (&input.storage_key, &input.url) {
        (None, None) => {
            return Err(AppError::Core(CoreError::Validation(
                "Either storage_key or url is required".into(),
            )))
        }
        (Some(key), _) if !key_belongs_to_catalog(key, catalog_id) => {
            return Err(AppError::Core(CoreError::Validation(format!(
                "storage_key '{key}' was not issued for catalog entry {catalog_id}"
            ))))
        }
        _ => {}
    }
    ensure_catalog_exists(&state.pool, catalog_id).await?;
    ensure_module_in_catalog(&state.pool, catalog_id, input.module_id).await?;

    let material = CatalogMaterialRepo::create(&state.pool, catalog_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: material })))
}

/// GET /api/v1/catalogs/{catalog_id}/materials/{id}
pub async fn get_material(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let material = CatalogMaterialRepo::find(&state.pool, catalog_id, id)
        .await?
        .ok_or_else(|| not_found("CatalogMaterial", id))?;
    Ok(Json(DataResponse { data: material }))
}

/// GET /api/v1/catalogs/{catalog_id}/materials/{id}/download-url
///
/// Stored files get a presigned URL; link-only materials return their URL.
pub async fn download_url(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let material = CatalogMaterialRepo::find(&state.pool, catalog_id, id)
        .await?
        .ok_or_else(|| not_found("CatalogMaterial", id))?;

    let download = match (&material.storage_key, &material.url) {
        (Some(key), _) => state.storage.download_url(key).await?,
        (None, Some(url)) => PresignedUrl {
            url: url.clone(),
            method: "GET",
            expires_in: 0,
        },
        (None, None) => {
            return Err(AppError::InternalError(format!(
                "Material {id} has neither storage_key nor url"
            )))
        }
    };
    Ok(Json(DataResponse { data: download }))
}

/// PUT /api/v1/catalogs/{catalog_id}/materials/{id}
pub async fn update_material(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCatalogMaterial>,
) -> AppResult<impl IntoResponse> {
    validate(&input)?;
    ensure_module_in_catalog(&state.pool, catalog_id, input.module_id).await?;
    let material = CatalogMaterialRepo::update(&state.pool, catalog_id, id, &input)
        .await?
        .ok_or_else(|| not_found("CatalogMaterial", id))?;
    Ok(Json(DataResponse { data: material }))
}

/// DELETE /api/v1/catalogs/{catalog_id}/materials/{id}
///
/// The stored object is removed after the row; a failed object delete is
/// logged and leaves an orphan rather than failing the request.
pub async fn delete_material(
    State(state): State<AppState>,
    RequireInstructor(_user): RequireInstructor,
    Path((catalog_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let material = CatalogMaterialRepo::delete(&state.pool, catalog_id, id)
        .await?
        .ok_or_else(|| not_found("CatalogMaterial", id))?;

    if let Some(key) = material.storage_key.as_deref() {
        if let Err(e) = state.storage.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to delete stored material object");
        }
    }
    Ok(StatusCode::NO_CONTENT)
}
