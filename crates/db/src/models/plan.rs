//! Plan rows.

use little_things_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row from the `plans` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct PlanRecord {
    pub id: DbId,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub completed: bool,
    pub scheduled_for: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a plan row.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanRecord {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub completed: bool,
    pub scheduled_for: Timestamp,
}

/// DTO for updating a plan row. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlanRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub scheduled_for: Option<Timestamp>,
}
