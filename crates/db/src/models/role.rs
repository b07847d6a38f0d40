//! Role lookup rows.

use serde::Serialize;
use sqlx::FromRow;
use tnc_core::types::{DbId, Timestamp};

/// A row of the seeded `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
