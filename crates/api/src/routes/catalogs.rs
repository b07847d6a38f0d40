//! Route definitions for `/catalogs` and their nested content.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{catalog_content, catalogs};
use crate::state::AppState;

/// Routes mounted at `/catalogs`.
///
/// ```text
/// GET    /                                         -> list
/// POST   /                                         -> create
/// GET    /{id}                                     -> get
/// PUT    /{id}                                     -> update
/// DELETE /{id}                                     -> delete
///
/// GET    /{catalog_id}/modules                     -> list_modules
/// POST   /{catalog_id}/modules                     -> create_module
/// GET    /{catalog_id}/modules/{id}                -> get_module
/// PUT    /{catalog_id}/modules/{id}                -> update_module
/// DELETE /{catalog_id}/modules/{id}                -> delete_module
///
/// GET    /{catalog_id}/labs                        -> list_labs
/// POST   /{catalog_id}/labs                        -> create_lab
/// GET    /{catalog_id}/labs/{id}                   -> get_lab
/// PUT    /{catalog_id}/labs/{id}                   -> update_lab
/// DELETE /{catalog_id}/labs/{id}                   -> delete_lab
///
/// GET    /{catalog_id}/materials                   -> list_materials
/// POST   /{catalog_id}/materials                   -> create_material
/// POST   /{catalog_id}/materials/upload-url        -> upload_url
/// GET    /{catalog_id}/materials/{id}              -> get_material
/// PUT    /{catalog_id}/materials/{id}              -> update_material
/// DELETE /{catalog_id}/materials/{id}              -> delete_material
/// GET    /{catalog_id}/materials/{id}/download-url -> download_url
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalogs::list).post(catalogs::create))
        .route(
            "/{id}",
            get(catalogs::get)
                .put(catalogs::update)
                .delete(catalogs::delete),
        )
        // Modules
        .route(
            "/{catalog_id}/modules",
            get(catalog_content::list_modules).post(catalog_content::create_module),
        )
        .route(
            "/{catalog_id}/modules/{id}",
            get(catalog_content::get_module)
                .put(catalog_content::update_module)
                .delete(catalog_content::delete_module),
        )
        // Labs
        .route(
            "/{catalog_id}/labs",
            get(catalog_content::list_labs).post(catalog_content::create_lab),
        )
        .route(
            "/{catalog_id}/labs/{id}",
            get(catalog_content::get_lab)
                .put(catalog_content::update_lab)
                .delete(catalog_content::delete_lab),
        )
        // Materials
        .route(
            "/{catalog_id}/materials",
            get(catalog_content::list_materials).post(catalog_content::create_material),
        )
        .route(
            "/{catalog_id}/materials/upload-url",
            post(catalog_content::upload_url),
        )
        .route(
            "/{catalog_id}/materials/{id}",
            get(catalog_content::get_material)
                .put(catalog_content::update_material)
                .delete(catalog_content::delete_material),
        )
        .route(
            "/{catalog_id}/materials/{id}/download-url",
            get(catalog_content::download_url),
        )
}
