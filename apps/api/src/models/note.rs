use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Read-only context for the core. Notes are created and edited by the
/// content-ingestion service; this API only resolves them for ownership
/// scoping and the stored persona hint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub default_role: Option<String>,
    pub created_at: DateTime<Utc>,
}
