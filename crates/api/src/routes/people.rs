//! Route definitions for `/customers` and `/instructors`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{customers, instructors};
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete (admin)
/// ```
pub fn customers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::list).post(customers::create))
        .route(
            "/{id}",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
}

/// Routes mounted at `/instructors`. Writes are admin-only.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// GET    /{id}         -> get
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// PUT    /{id}/status  -> set_status
/// ```
pub fn instructors_router() -> Router<AppState> {
    Router::new()
        .route("/", get(instructors::list).post(instructors::create))
        .route(
            "/{id}",
            get(instructors::get)
                .put(instructors::update)
                .delete(instructors::delete),
        )
        .route("/{id}/status", put(instructors::set_status))
}
