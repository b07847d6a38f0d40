//! Route definitions for `/calendar`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// GET    /upcoming                    -> upcoming
/// POST   /recurring                   -> create_recurring
/// GET    /my-registrations            -> my_registrations
/// GET    /{id}                        -> get
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
/// POST   /{id}/registrations          -> register
/// DELETE /{id}/registrations          -> unregister
/// GET    /{id}/registration-status    -> registration_status
/// PUT    /{id}/registration-status    -> set_registration_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calendar::list).post(calendar::create))
        .route("/upcoming", get(calendar::upcoming))
        .route("/recurring", post(calendar::create_recurring))
        .route("/my-registrations", get(calendar::my_registrations))
        .route(
            "/{id}",
            get(calendar::get)
                .put(calendar::update)
                .delete(calendar::delete),
        )
        .route(
            "/{id}/registrations",
            post(calendar::register).delete(calendar::unregister),
        )
        .route(
            "/{id}/registration-status",
            get(calendar::registration_status).put(calendar::set_registration_status),
        )
}
