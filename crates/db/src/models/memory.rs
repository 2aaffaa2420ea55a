//! Memory rows as the remote store keeps them.

use chrono::NaiveDate;
use little_things_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the `memories` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct MemoryRecord {
    pub id: DbId,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    /// One of `low`, `medium`, `high`.
    pub importance: String,
    pub date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a memory row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMemoryRecord {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub importance: String,
    pub date: Option<NaiveDate>,
}

/// DTO for updating a memory row. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMemoryRecord {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    pub importance: Option<String>,
    pub date: Option<NaiveDate>,
}
