//! Route definitions for `/dashboard`.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET /metrics   -> list_metrics
/// PUT /metrics   -> upsert_metric
/// GET /summary   -> summary
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/metrics",
            get(dashboard::list_metrics).put(dashboard::upsert_metric),
        )
        .route("/summary", get(dashboard::summary))
}
