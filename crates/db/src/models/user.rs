//! Account root rows.

use little_things_core::types::Timestamp;
use serde::Serialize;
use sqlx::FromRow;

/// Row from the `users` table. The id is the authentication subject.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
