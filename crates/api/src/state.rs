use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::quiz_generator::QuizGenerator;
use crate::services::storage::StorageProvider;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    pub pool: tnc_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Object store for catalog materials.
    pub storage: Arc<dyn StorageProvider>,
    /// Drafts quiz questions from catalog content.
    pub quiz_generator: Arc<dyn QuizGenerator>,
}
